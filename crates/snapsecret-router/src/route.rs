//! Route definitions.

use crate::error::ConfigurationError;
use crate::pattern::{RoutePattern, Tier};
use crate::view::{NotFoundView, ViewLoader};
use std::fmt;

/// Pattern used for the synthesized not-found route.
pub const FALLBACK_PATTERN: &str = "/:pathMatch(.*)*";

/// A single entry of the route table.
///
/// Definitions are immutable once registered.
#[derive(Clone)]
pub struct RouteDefinition {
	pattern: RoutePattern,
	name: Option<String>,
	loader: ViewLoader,
	exposes_params: bool,
}

impl RouteDefinition {
	/// Creates an unnamed route that does not expose its parameters.
	///
	/// # Errors
	///
	/// Returns [`ConfigurationError::InvalidPattern`] if `pattern` does not compile.
	pub fn new(pattern: &str, loader: ViewLoader) -> Result<Self, ConfigurationError> {
		Ok(Self {
			pattern: RoutePattern::parse(pattern)?,
			name: None,
			loader,
			exposes_params: false,
		})
	}

	/// Gives the route a name for reverse lookups.
	pub fn named(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Passes bound parameters to the view as props.
	pub fn with_props(mut self) -> Self {
		self.exposes_params = true;
		self
	}

	/// Sets whether bound parameters are passed to the view as props.
	pub fn exposes_params_if(mut self, enabled: bool) -> Self {
		self.exposes_params = enabled;
		self
	}

	/// The catch-all installed when a table lacks one.
	pub(crate) fn fallback() -> Self {
		Self {
			pattern: RoutePattern::catch_all(FALLBACK_PATTERN, "pathMatch"),
			name: None,
			loader: ViewLoader::eager(NotFoundView),
			exposes_params: false,
		}
	}

	/// Returns the compiled pattern.
	pub fn pattern(&self) -> &RoutePattern {
		&self.pattern
	}

	/// Returns the route name.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Returns the view loader.
	pub fn loader(&self) -> &ViewLoader {
		&self.loader
	}

	/// Returns whether parameters are passed to the view.
	pub fn exposes_params(&self) -> bool {
		self.exposes_params
	}

	/// Returns the precedence tier of the pattern.
	pub fn tier(&self) -> Tier {
		self.pattern.tier()
	}
}

impl fmt::Debug for RouteDefinition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteDefinition")
			.field("pattern", &self.pattern.as_str())
			.field("name", &self.name)
			.field("loader", &self.loader)
			.field("exposes_params", &self.exposes_params)
			.finish()
	}
}
