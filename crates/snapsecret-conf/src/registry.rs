//! Mapping from view names used in settings to view loaders.

use snapsecret_router::ViewLoader;
use std::collections::BTreeMap;
use std::fmt;

/// Named view loaders that route settings can refer to.
///
/// Deferred loaders are shared between every route naming them, so a view
/// used by both `/404` and the catch-all is fetched once.
#[derive(Clone, Default)]
pub struct ViewRegistry {
	views: BTreeMap<String, ViewLoader>,
}

impl ViewRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `loader` under `name`, replacing any earlier entry.
	pub fn register(&mut self, name: impl Into<String>, loader: ViewLoader) -> &mut Self {
		let name = name.into();
		if self.views.insert(name.clone(), loader).is_some() {
			tracing::debug!(view = %name, "view registration replaced");
		}
		self
	}

	/// Builder-style [`register`](ViewRegistry::register).
	pub fn with(mut self, name: impl Into<String>, loader: ViewLoader) -> Self {
		self.register(name, loader);
		self
	}

	/// Returns the loader registered under `name`.
	pub fn get(&self, name: &str) -> Option<&ViewLoader> {
		self.views.get(name)
	}

	/// Returns whether `name` is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.views.contains_key(name)
	}

	/// Iterates over registered view names in sorted order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.views.keys().map(String::as_str)
	}

	/// Returns the number of registered views.
	pub fn len(&self) -> usize {
		self.views.len()
	}

	/// Returns whether no views are registered.
	pub fn is_empty(&self) -> bool {
		self.views.is_empty()
	}
}

impl fmt::Debug for ViewRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.views.iter()).finish()
	}
}
