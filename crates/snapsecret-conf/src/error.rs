//! Settings errors.

use snapsecret_router::ConfigurationError;
use std::path::PathBuf;

/// Error raised while loading route table settings or building a router
/// from them.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	/// The settings file could not be read.
	#[error("Failed to read {path}: {source}")]
	Io {
		/// File that was being read.
		path: PathBuf,
		/// Underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// The settings are not valid TOML or do not have the expected shape.
	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A route refers to a view the registry does not know.
	#[error("Route '{path}' refers to unknown view '{view}'")]
	UnknownView {
		/// Pattern of the offending route.
		path: String,
		/// The unresolved view name.
		view: String,
	},

	/// The requested built-in profile does not exist.
	#[error("Unknown route profile '{0}' (expected 'full' or 'reduced')")]
	UnknownProfile(String),

	/// The route table itself is invalid.
	#[error(transparent)]
	Configuration(#[from] ConfigurationError),
}
