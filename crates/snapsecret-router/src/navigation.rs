//! Navigation events and the per-navigation state machine.
//!
//! ```text
//! Pending -> Resolving -> [LoadingView] -> Activating -> Settled
//!    |           |              |
//!    +-----------+--------------+--> Superseded
//! ```
//!
//! `Settled` and `Superseded` are terminal.

use crate::location::Location;
use crate::params::{RouteParams, ViewProps};
use crate::route::RouteDefinition;
use crate::view::View;
use std::fmt;
use std::sync::Arc;

/// What triggered a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationOrigin {
	/// A link or `push` call; adds a history entry.
	ProgrammaticPush,
	/// A `replace` call; overwrites the current history entry.
	ProgrammaticReplace,
	/// The user moved with back/forward; history has already moved.
	BrowserBackForward,
	/// The first resolution after page load; history already holds the entry.
	InitialLoad,
}

impl NavigationOrigin {
	/// Returns whether settling a navigation of this origin writes history.
	pub fn updates_history(self) -> bool {
		matches!(self, Self::ProgrammaticPush | Self::ProgrammaticReplace)
	}
}

impl fmt::Display for NavigationOrigin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::ProgrammaticPush => "push",
			Self::ProgrammaticReplace => "replace",
			Self::BrowserBackForward => "back-forward",
			Self::InitialLoad => "initial-load",
		})
	}
}

/// A request to navigate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
	/// App-relative target, optionally with query and fragment.
	pub target_path: String,
	/// What triggered the navigation.
	pub origin: NavigationOrigin,
}

impl NavigationEvent {
	/// Creates an event.
	pub fn new(target_path: impl Into<String>, origin: NavigationOrigin) -> Self {
		Self {
			target_path: target_path.into(),
			origin,
		}
	}

	/// A programmatic push to `target_path`.
	pub fn push(target_path: impl Into<String>) -> Self {
		Self::new(target_path, NavigationOrigin::ProgrammaticPush)
	}

	/// A programmatic replace with `target_path`.
	pub fn replace(target_path: impl Into<String>) -> Self {
		Self::new(target_path, NavigationOrigin::ProgrammaticReplace)
	}

	/// A back/forward move that landed on `target_path`.
	pub fn back_forward(target_path: impl Into<String>) -> Self {
		Self::new(target_path, NavigationOrigin::BrowserBackForward)
	}

	/// The initial page load at `target_path`.
	pub fn initial_load(target_path: impl Into<String>) -> Self {
		Self::new(target_path, NavigationOrigin::InitialLoad)
	}
}

/// Phase of a single navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationPhase {
	/// Accepted, nothing done yet.
	Pending,
	/// Matching the path against the route table.
	Resolving,
	/// Waiting for a deferred view to load.
	LoadingView,
	/// Writing history and the active view.
	Activating,
	/// The view is active.
	Settled,
	/// A newer navigation took over.
	Superseded,
}

impl NavigationPhase {
	/// Returns whether no transition leaves this phase.
	pub fn is_terminal(self) -> bool {
		matches!(self, Self::Settled | Self::Superseded)
	}

	/// Returns whether the state machine allows moving to `next`.
	pub fn can_transition_to(self, next: NavigationPhase) -> bool {
		use NavigationPhase::*;
		matches!(
			(self, next),
			(Pending, Resolving)
				| (Resolving, LoadingView)
				| (Resolving, Activating)
				| (LoadingView, Activating)
				| (Activating, Settled)
				| (Pending | Resolving | LoadingView, Superseded)
		)
	}
}

impl fmt::Display for NavigationPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self, f)
	}
}

/// Tracks the phase of one navigation.
#[derive(Debug)]
pub(crate) struct Navigation {
	id: u64,
	phase: NavigationPhase,
}

impl Navigation {
	pub(crate) fn new(id: u64) -> Self {
		Self {
			id,
			phase: NavigationPhase::Pending,
		}
	}

	pub(crate) fn phase(&self) -> NavigationPhase {
		self.phase
	}

	/// Moves to `next`. Illegal transitions are a router bug.
	pub(crate) fn advance(&mut self, next: NavigationPhase) {
		debug_assert!(
			self.phase.can_transition_to(next),
			"illegal navigation transition {} -> {}",
			self.phase,
			next
		);
		tracing::debug!(navigation = self.id, from = %self.phase, to = %next, "navigation phase");
		self.phase = next;
	}
}

/// The view currently shown, with everything it was activated with.
#[derive(Clone)]
pub struct ActiveView {
	/// Id of the navigation that activated the view.
	pub navigation_id: u64,
	/// Target the navigation resolved.
	pub location: Location,
	/// Matched route.
	pub route: Arc<RouteDefinition>,
	/// Parameters bound by the match.
	pub params: RouteParams,
	/// Props handed to the view.
	pub props: ViewProps,
	/// The loaded view.
	pub view: Arc<dyn View>,
}

impl ActiveView {
	/// Renders the view with its props.
	pub fn render(&self) -> String {
		self.view.render(&self.props)
	}

	/// Returns the matched route's name.
	pub fn route_name(&self) -> Option<&str> {
		self.route.name()
	}
}

impl fmt::Debug for ActiveView {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ActiveView")
			.field("navigation_id", &self.navigation_id)
			.field("location", &self.location)
			.field("route", &self.route.pattern().as_str())
			.field("params", &self.params)
			.finish()
	}
}

/// How a navigation ended.
#[derive(Debug, Clone)]
pub enum NavigationOutcome {
	/// The target view is now active.
	Settled(ActiveView),
	/// A newer navigation arrived first; this one had no visible effect.
	Superseded,
}

impl NavigationOutcome {
	/// Returns the activated view, if the navigation settled.
	pub fn active(&self) -> Option<&ActiveView> {
		match self {
			Self::Settled(active) => Some(active),
			Self::Superseded => None,
		}
	}

	/// Returns whether the navigation was superseded.
	pub fn is_superseded(&self) -> bool {
		matches!(self, Self::Superseded)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use NavigationPhase::*;

	#[rstest]
	#[case(Pending, Resolving)]
	#[case(Resolving, LoadingView)]
	#[case(Resolving, Activating)]
	#[case(LoadingView, Activating)]
	#[case(Activating, Settled)]
	#[case(Pending, Superseded)]
	#[case(Resolving, Superseded)]
	#[case(LoadingView, Superseded)]
	fn test_allowed_transitions(#[case] from: NavigationPhase, #[case] to: NavigationPhase) {
		assert!(from.can_transition_to(to));
	}

	#[rstest]
	#[case(Settled, Pending)]
	#[case(Settled, Superseded)]
	#[case(Superseded, Activating)]
	#[case(Activating, Superseded)]
	#[case(Pending, Activating)]
	#[case(LoadingView, Resolving)]
	fn test_rejected_transitions(#[case] from: NavigationPhase, #[case] to: NavigationPhase) {
		assert!(!from.can_transition_to(to));
	}

	#[rstest]
	fn test_terminal_phases() {
		let all = [Pending, Resolving, LoadingView, Activating, Settled, Superseded];
		let terminal: Vec<_> = all.into_iter().filter(|p| p.is_terminal()).collect();

		assert_eq!(terminal, [Settled, Superseded]);
		for phase in terminal {
			assert!(all.iter().all(|&next| !phase.can_transition_to(next)));
		}
	}

	#[rstest]
	fn test_navigation_tracks_phase() {
		let mut navigation = Navigation::new(1);
		navigation.advance(Resolving);
		navigation.advance(Activating);
		navigation.advance(Settled);

		assert_eq!(navigation.phase(), Settled);
	}

	#[rstest]
	#[case(NavigationOrigin::ProgrammaticPush, true)]
	#[case(NavigationOrigin::ProgrammaticReplace, true)]
	#[case(NavigationOrigin::BrowserBackForward, false)]
	#[case(NavigationOrigin::InitialLoad, false)]
	fn test_origin_updates_history(#[case] origin: NavigationOrigin, #[case] expected: bool) {
		assert_eq!(origin.updates_history(), expected);
	}
}
