//! Error types for client-side routing.

/// Boxed error returned by deferred view loaders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error raised while building a route table.
///
/// A table that fails validation must never be used; the application is
/// expected to abort startup when it sees one of these.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
	/// The pattern string could not be compiled.
	#[error("Invalid route pattern '{pattern}': {reason}")]
	InvalidPattern {
		/// The offending pattern.
		pattern: String,
		/// Why it was rejected.
		reason: String,
	},

	/// Two non-wildcard routes would match exactly the same paths.
	#[error("Duplicate route pattern '{pattern}' (conflicts with '{existing}')")]
	DuplicatePattern {
		/// Pattern of the route being registered.
		pattern: String,
		/// Pattern of the route registered earlier.
		existing: String,
	},

	/// Two routes share the same name.
	#[error("Duplicate route name '{0}'")]
	DuplicateName(String),

	/// A route was given an empty name.
	#[error("Route '{0}' has an empty name")]
	EmptyName(String),
}

impl ConfigurationError {
	pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
		Self::InvalidPattern {
			pattern: pattern.to_string(),
			reason: reason.into(),
		}
	}
}

/// A deferred view failed to load.
///
/// The previously active view stays in place; navigating to the same route
/// again retries the load.
#[derive(Debug, thiserror::Error)]
#[error("Failed to load view for route '{pattern}': {source}")]
pub struct ViewLoadError {
	/// Pattern of the route whose view failed to load.
	pub pattern: String,
	/// Name of the route, if it has one.
	pub route_name: Option<String>,
	/// Error reported by the loader.
	#[source]
	pub source: BoxError,
}

/// Error reported by a [`History`](crate::history::History) backend.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
	/// The browser history API is not reachable.
	#[error("History API unavailable: {0}")]
	Unavailable(String),

	/// The history backend rejected the state change.
	#[error("History update rejected: {0}")]
	Rejected(String),

	/// `go(delta)` pointed outside the stack.
	#[error("History offset {0} is out of range")]
	OutOfRange(isize),
}

/// Error type for typed path parameter extraction.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
	/// The requested parameter was not bound by the match.
	#[error("Missing path parameter '{0}'")]
	Missing(String),

	/// Failed to parse a parameter value.
	#[error("Failed to parse parameter '{name}' value '{raw_value}' as {param_type}: {reason}")]
	ParseError {
		/// Name of the parameter.
		name: String,
		/// Expected type name.
		param_type: &'static str,
		/// Raw string value that failed to parse.
		raw_value: String,
		/// Error message from parsing.
		reason: String,
	},

	/// Parameter count mismatch for positional extraction.
	#[error("Parameter count mismatch: expected {expected}, got {actual}")]
	CountMismatch {
		/// Expected number of parameters.
		expected: usize,
		/// Actual number of parameters.
		actual: usize,
	},

	/// Whole-struct deserialization failed.
	#[error("Failed to deserialize props: {0}")]
	Deserialize(String),
}

/// Error type for router operations.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
	/// The matched route's deferred view could not be loaded.
	#[error(transparent)]
	ViewLoad(#[from] ViewLoadError),

	/// The history backend refused the update.
	#[error("Navigation failed: {0}")]
	History(#[from] HistoryError),

	/// No route carries the given name.
	#[error("Invalid route name: {0}")]
	InvalidRouteName(String),

	/// A parameter needed to build a path from a named route is missing.
	#[error("Missing parameter '{param}' for route '{route}'")]
	MissingParameter {
		/// Route name.
		route: String,
		/// Missing parameter name.
		param: String,
	},

	/// A parameter value would build a path that does not lead back to the
	/// named route.
	#[error("Invalid value '{value}' for parameter '{param}' of route '{route}'")]
	InvalidParameter {
		/// Route name.
		route: String,
		/// Parameter name.
		param: String,
		/// Rejected value.
		value: String,
	},
}

impl RouterError {
	/// Returns whether retrying the same navigation may succeed.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::ViewLoad(_) | Self::History(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_configuration_error_display() {
		let err = ConfigurationError::DuplicatePattern {
			pattern: "/secret/:key".to_string(),
			existing: "/secret/:id".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"Duplicate route pattern '/secret/:key' (conflicts with '/secret/:id')"
		);
		assert_eq!(
			ConfigurationError::DuplicateName("home".to_string()).to_string(),
			"Duplicate route name 'home'"
		);
	}

	#[rstest]
	fn test_view_load_error_keeps_source() {
		let err = ViewLoadError {
			pattern: "/new".to_string(),
			route_name: Some("secret.new".to_string()),
			source: "network unreachable".into(),
		};
		assert!(err.to_string().contains("/new"));
		assert!(err.to_string().contains("network unreachable"));
		assert!(std::error::Error::source(&err).is_some());
	}

	#[rstest]
	fn test_path_error_display() {
		let err = PathError::ParseError {
			name: "id".to_string(),
			param_type: "u32",
			raw_value: "abc".to_string(),
			reason: "invalid digit found in string".to_string(),
		};
		assert!(err.to_string().contains("'id'"));
		assert!(err.to_string().contains("abc"));
		assert!(err.to_string().contains("u32"));
	}

	#[rstest]
	#[case(RouterError::InvalidRouteName("x".to_string()), false)]
	#[case(RouterError::History(HistoryError::Rejected("quota".to_string())), true)]
	#[case(
		RouterError::ViewLoad(ViewLoadError {
			pattern: "/".to_string(),
			route_name: None,
			source: "boom".into(),
		}),
		true
	)]
	fn test_router_error_retryable(#[case] err: RouterError, #[case] expected: bool) {
		assert_eq!(err.is_retryable(), expected);
	}
}
