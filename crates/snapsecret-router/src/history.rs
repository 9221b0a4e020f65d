//! History API integration.
//!
//! The router pushes or replaces entries through a [`History`] backend and
//! listens to it for back/forward moves. [`MemoryHistory`] keeps the stack
//! in process; on `wasm32` targets [`BrowserHistory`] drives `window.history`.

use crate::error::HistoryError;
use crate::params::RouteParams;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// State stored alongside each history entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
	/// App path the entry was created for.
	pub path: String,
	/// Name of the matched route, if it has one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub route_name: Option<String>,
	/// Parameters bound by the match.
	#[serde(default)]
	pub params: RouteParams,
	/// Id of the navigation that created the entry.
	#[serde(default)]
	pub navigation_id: u64,
	/// Position of the entry in the stack.
	#[serde(default)]
	pub position: usize,
}

impl HistoryState {
	/// Creates a state for the given app path.
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			..Default::default()
		}
	}

	/// Sets the bound parameters.
	pub fn with_params(mut self, params: RouteParams) -> Self {
		self.params = params;
		self
	}

	/// Sets the matched route name.
	pub fn with_route_name(mut self, name: Option<&str>) -> Self {
		self.route_name = name.map(str::to_string);
		self
	}

	/// Sets the navigation id.
	pub fn with_navigation_id(mut self, id: u64) -> Self {
		self.navigation_id = id;
		self
	}
}

/// A single history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
	/// Browser href, base included.
	pub url: String,
	/// Associated state.
	pub state: HistoryState,
}

/// Emitted when the user moves through history with back/forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopState {
	/// Browser href of the entry now current.
	pub url: String,
	/// State stored with that entry, if any.
	pub state: Option<HistoryState>,
}

/// Receiving half of a pop-state subscription.
pub type PopStateReceiver = mpsc::UnboundedReceiver<PopState>;

/// A browser-style history stack.
pub trait History: Send + Sync {
	/// Adds a new entry after the current one.
	///
	/// # Errors
	///
	/// Returns an error if the backend rejects the update.
	fn push(&self, entry: HistoryEntry) -> Result<(), HistoryError>;

	/// Overwrites the current entry.
	///
	/// # Errors
	///
	/// Returns an error if the backend rejects the update.
	fn replace(&self, entry: HistoryEntry) -> Result<(), HistoryError>;

	/// Returns the browser href of the current entry.
	fn current(&self) -> Option<String>;

	/// Returns the position of the current entry plus one.
	fn depth(&self) -> usize;

	/// Subscribes to back/forward moves.
	fn subscribe(&self) -> PopStateReceiver;
}

#[derive(Debug)]
struct Stack {
	entries: Vec<HistoryEntry>,
	index: usize,
	subscribers: Vec<mpsc::UnboundedSender<PopState>>,
}

/// In-process history stack.
///
/// Behaves like the browser: pushing discards forward entries, and
/// [`back`](MemoryHistory::back)/[`forward`](MemoryHistory::forward) notify
/// subscribers instead of navigating by themselves.
#[derive(Debug)]
pub struct MemoryHistory {
	stack: Mutex<Stack>,
}

impl MemoryHistory {
	/// Creates a history whose single entry is `/`.
	pub fn new() -> Self {
		Self::with_initial("/")
	}

	/// Creates a history whose single entry is `url`, as on a first page load.
	pub fn with_initial(url: impl Into<String>) -> Self {
		let url = url.into();
		let entry = HistoryEntry {
			state: HistoryState::new(url.clone()),
			url,
		};
		Self {
			stack: Mutex::new(Stack {
				entries: vec![entry],
				index: 0,
				subscribers: Vec::new(),
			}),
		}
	}

	/// Returns the total number of entries, including forward ones.
	pub fn len(&self) -> usize {
		self.stack.lock().entries.len()
	}

	/// Always `false`: a history stack holds at least one entry.
	pub fn is_empty(&self) -> bool {
		false
	}

	/// Returns the current entry.
	pub fn current_entry(&self) -> HistoryEntry {
		let stack = self.stack.lock();
		stack.entries[stack.index].clone()
	}

	/// Moves `delta` entries and notifies subscribers.
	///
	/// # Errors
	///
	/// Returns [`HistoryError::OutOfRange`] if the target is outside the stack.
	pub fn go(&self, delta: isize) -> Result<(), HistoryError> {
		let mut stack = self.stack.lock();
		let target = stack
			.index
			.checked_add_signed(delta)
			.filter(|&i| i < stack.entries.len())
			.ok_or(HistoryError::OutOfRange(delta))?;
		if target == stack.index {
			return Ok(());
		}
		stack.index = target;

		let entry = &stack.entries[target];
		let event = PopState {
			url: entry.url.clone(),
			state: Some(entry.state.clone()),
		};
		tracing::trace!(url = %event.url, position = target, "history pop");
		stack
			.subscribers
			.retain(|subscriber| subscriber.send(event.clone()).is_ok());
		Ok(())
	}

	/// Equivalent to `go(-1)`.
	///
	/// # Errors
	///
	/// Returns [`HistoryError::OutOfRange`] at the first entry.
	pub fn back(&self) -> Result<(), HistoryError> {
		self.go(-1)
	}

	/// Equivalent to `go(1)`.
	///
	/// # Errors
	///
	/// Returns [`HistoryError::OutOfRange`] at the last entry.
	pub fn forward(&self) -> Result<(), HistoryError> {
		self.go(1)
	}
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new()
	}
}

impl History for MemoryHistory {
	fn push(&self, mut entry: HistoryEntry) -> Result<(), HistoryError> {
		let mut stack = self.stack.lock();
		let position = stack.index + 1;
		stack.entries.truncate(position);
		entry.state.position = position;
		stack.entries.push(entry);
		stack.index = position;
		Ok(())
	}

	fn replace(&self, mut entry: HistoryEntry) -> Result<(), HistoryError> {
		let mut stack = self.stack.lock();
		let index = stack.index;
		entry.state.position = index;
		stack.entries[index] = entry;
		Ok(())
	}

	fn current(&self) -> Option<String> {
		let stack = self.stack.lock();
		Some(stack.entries[stack.index].url.clone())
	}

	fn depth(&self) -> usize {
		self.stack.lock().index + 1
	}

	fn subscribe(&self) -> PopStateReceiver {
		let (tx, rx) = mpsc::unbounded_channel();
		self.stack.lock().subscribers.push(tx);
		rx
	}
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserHistory;

#[cfg(target_arch = "wasm32")]
mod browser {
	use super::{History, HistoryEntry, HistoryError, HistoryState, PopState, PopStateReceiver};
	use std::sync::atomic::{AtomicUsize, Ordering};
	use tokio::sync::mpsc;
	use wasm_bindgen::JsCast;
	use wasm_bindgen::prelude::*;

	/// `window.history` backed history.
	///
	/// The position of the current entry is stored in each entry's state so
	/// [`depth`](History::depth) survives back/forward moves.
	#[derive(Debug, Default)]
	pub struct BrowserHistory {
		position: std::sync::Arc<AtomicUsize>,
	}

	impl BrowserHistory {
		/// Creates a history bound to the current window.
		pub fn new() -> Self {
			Self::default()
		}

		fn history() -> Result<web_sys::History, HistoryError> {
			web_sys::window()
				.ok_or_else(|| HistoryError::Unavailable("no window".to_string()))?
				.history()
				.map_err(|e| HistoryError::Unavailable(format!("{:?}", e)))
		}

		fn state_value(state: &HistoryState) -> Result<JsValue, HistoryError> {
			let json = serde_json::to_string(state)
				.map_err(|e| HistoryError::Rejected(e.to_string()))?;
			js_sys::JSON::parse(&json).map_err(|e| HistoryError::Rejected(format!("{:?}", e)))
		}

		fn decode_state(value: &JsValue) -> Option<HistoryState> {
			let json = js_sys::JSON::stringify(value).ok()?.as_string()?;
			serde_json::from_str(&json).ok()
		}
	}

	impl History for BrowserHistory {
		fn push(&self, mut entry: HistoryEntry) -> Result<(), HistoryError> {
			let position = self.position.load(Ordering::SeqCst) + 1;
			entry.state.position = position;
			let state = Self::state_value(&entry.state)?;
			Self::history()?
				.push_state_with_url(&state, "", Some(&entry.url))
				.map_err(|e| HistoryError::Rejected(format!("{:?}", e)))?;
			self.position.store(position, Ordering::SeqCst);
			Ok(())
		}

		fn replace(&self, mut entry: HistoryEntry) -> Result<(), HistoryError> {
			entry.state.position = self.position.load(Ordering::SeqCst);
			let state = Self::state_value(&entry.state)?;
			Self::history()?
				.replace_state_with_url(&state, "", Some(&entry.url))
				.map_err(|e| HistoryError::Rejected(format!("{:?}", e)))
		}

		fn current(&self) -> Option<String> {
			let location = web_sys::window()?.location();
			let path = location.pathname().ok()?;
			let search = location.search().unwrap_or_default();
			let hash = location.hash().unwrap_or_default();
			Some(format!("{}{}{}", path, search, hash))
		}

		fn depth(&self) -> usize {
			self.position.load(Ordering::SeqCst) + 1
		}

		fn subscribe(&self) -> PopStateReceiver {
			let (tx, rx) = mpsc::unbounded_channel();
			let position = std::sync::Arc::clone(&self.position);
			let closure = Closure::<dyn FnMut(web_sys::PopStateEvent)>::new(
				move |event: web_sys::PopStateEvent| {
					let state = Self::decode_state(&event.state());
					if let Some(s) = &state {
						position.store(s.position, Ordering::SeqCst);
					}
					let url = BrowserHistory::new().current().unwrap_or_else(|| "/".to_string());
					let _ = tx.send(PopState { url, state });
				},
			);
			match web_sys::window() {
				Some(window) => {
					if let Err(e) = window.add_event_listener_with_callback(
						"popstate",
						closure.as_ref().unchecked_ref(),
					) {
						tracing::warn!(error = ?e, "failed to register popstate listener");
					}
				}
				None => tracing::warn!("no window; back/forward moves will not be reported"),
			}
			// The listener lives for the lifetime of the page.
			closure.forget();
			rx
		}
	}
}
