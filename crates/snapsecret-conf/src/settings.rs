//! Route table settings.
//!
//! A route table is plain data: a base path and an ordered list of routes,
//! each naming the view it shows. Settings come from a TOML file, from one of
//! the built-in [`RouteProfile`]s, or from the environment:
//!
//! - `SNAPSECRET_ROUTES_FILE`: path to a TOML route table
//! - `SNAPSECRET_ROUTES_PROFILE`: `full` or `reduced`
//!
//! The file wins over the profile; with neither set the `full` profile is used.

use crate::error::SettingsError;
use crate::profile::RouteProfile;
use crate::registry::ViewRegistry;
use serde::{Deserialize, Serialize};
use snapsecret_router::{History, RouteDefinition, Router};
use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Environment variable naming a TOML route table file.
pub const ROUTES_FILE_ENV: &str = "SNAPSECRET_ROUTES_FILE";

/// Environment variable naming a built-in route profile.
pub const ROUTES_PROFILE_ENV: &str = "SNAPSECRET_ROUTES_PROFILE";

fn default_base() -> String {
	"/".to_string()
}

/// One route of a route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteSpec {
	/// Route pattern, e.g. `/secret/:id`.
	pub path: String,
	/// Optional name for reverse lookups.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Name of the view in the [`ViewRegistry`].
	pub view: String,
	/// Whether bound parameters are passed to the view.
	#[serde(default)]
	pub props: bool,
}

/// A complete route table as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteTableSettings {
	/// Prefix the application is served under.
	#[serde(default = "default_base")]
	pub base: String,
	/// Routes in registration order.
	#[serde(default)]
	pub routes: Vec<RouteSpec>,
}

impl Default for RouteTableSettings {
	fn default() -> Self {
		Self {
			base: default_base(),
			routes: Vec::new(),
		}
	}
}

impl RouteTableSettings {
	/// Parses settings from TOML.
	///
	/// # Errors
	///
	/// Returns [`SettingsError::Toml`] on malformed input or unknown keys.
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(source)?)
	}

	/// Reads settings from a TOML file.
	///
	/// # Errors
	///
	/// Returns [`SettingsError::Io`] if the file cannot be read and
	/// [`SettingsError::Toml`] if it does not parse.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let path = path.as_ref();
		let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let settings = Self::from_toml_str(&content)?;
		tracing::debug!(path = %path.display(), routes = settings.routes.len(), "route table loaded");
		Ok(settings)
	}

	/// Returns a built-in profile.
	///
	/// # Errors
	///
	/// Only fails if the shipped profile data is malformed.
	pub fn profile(profile: RouteProfile) -> Result<Self, SettingsError> {
		Self::from_toml_str(profile.source())
	}

	/// Loads settings as directed by the environment.
	///
	/// # Errors
	///
	/// Returns [`SettingsError::UnknownProfile`] for an unrecognized profile
	/// name, or any error of [`from_file`](RouteTableSettings::from_file).
	pub fn from_env() -> Result<Self, SettingsError> {
		if let Ok(path) = env::var(ROUTES_FILE_ENV) {
			tracing::info!(path = %path, "loading route table from {}", ROUTES_FILE_ENV);
			return Self::from_file(path);
		}
		let profile = match env::var(ROUTES_PROFILE_ENV) {
			Ok(name) => name.parse()?,
			Err(_) => RouteProfile::default(),
		};
		tracing::info!(profile = %profile, "loading built-in route table");
		Self::profile(profile)
	}

	/// Returns the distinct view names the routes refer to, in first-use order.
	pub fn view_names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = Vec::new();
		for route in &self.routes {
			if !names.contains(&route.view.as_str()) {
				names.push(&route.view);
			}
		}
		names
	}

	/// Builds route definitions, resolving view names through `registry`.
	///
	/// # Errors
	///
	/// Returns [`SettingsError::UnknownView`] for a view the registry lacks
	/// and [`SettingsError::Configuration`] for an invalid pattern.
	pub fn build_routes(&self, registry: &ViewRegistry) -> Result<Vec<RouteDefinition>, SettingsError> {
		self.routes
			.iter()
			.map(|spec| -> Result<RouteDefinition, SettingsError> {
				let loader = registry.get(&spec.view).ok_or_else(|| SettingsError::UnknownView {
					path: spec.path.clone(),
					view: spec.view.clone(),
				})?;
				let route = RouteDefinition::new(&spec.path, loader.clone())?
					.exposes_params_if(spec.props);
				Ok(match &spec.name {
					Some(name) => route.named(name.clone()),
					None => route,
				})
			})
			.collect()
	}

	/// Builds a router over `history`.
	///
	/// # Errors
	///
	/// See [`build_routes`](RouteTableSettings::build_routes); the route
	/// table's own validation errors are reported as
	/// [`SettingsError::Configuration`].
	pub fn build_router(
		&self,
		registry: &ViewRegistry,
		history: Arc<dyn History>,
	) -> Result<Router, SettingsError> {
		let router = Router::builder()
			.routes(self.build_routes(registry)?)
			.history(history)
			.base(&self.base)
			.build()?;
		Ok(router)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use snapsecret_router::{ConfigurationError, MemoryHistory, NotFoundView, ViewLoader};

	fn registry_for(settings: &RouteTableSettings) -> ViewRegistry {
		let mut registry = ViewRegistry::new();
		for name in settings.view_names() {
			registry.register(name, ViewLoader::eager(NotFoundView));
		}
		registry
	}

	#[rstest]
	fn test_parse_minimal() {
		let settings = RouteTableSettings::from_toml_str(
			r#"
[[routes]]
path = "/"
view = "HomeView"
"#,
		)
		.unwrap();

		assert_eq!(settings.base, "/");
		assert_eq!(settings.routes.len(), 1);
		assert_eq!(settings.routes[0].name, None);
		assert!(!settings.routes[0].props);
	}

	#[rstest]
	#[case("[[routes]]\npath = \"/\"\n")]
	#[case("[[routes]]\npath = \"/\"\nview = \"V\"\ncomponent = \"V\"\n")]
	#[case("base = 3\n")]
	fn test_malformed_settings(#[case] source: &str) {
		let result = RouteTableSettings::from_toml_str(source);
		assert!(matches!(result, Err(SettingsError::Toml(_))));
	}

	#[rstest]
	#[case(RouteProfile::Full, 6)]
	#[case(RouteProfile::Reduced, 3)]
	fn test_profiles_parse(#[case] profile: RouteProfile, #[case] routes: usize) {
		let settings = RouteTableSettings::profile(profile).unwrap();
		assert_eq!(settings.routes.len(), routes);
	}

	#[rstest]
	fn test_view_names_deduplicated() {
		let settings = RouteTableSettings::profile(RouteProfile::Full).unwrap();

		assert_eq!(
			settings.view_names(),
			[
				"HomeView",
				"NewSecretView",
				"NewSecretFileView",
				"GetSecretView",
				"NotFoundView"
			]
		);
	}

	#[rstest]
	fn test_unknown_view() {
		let settings = RouteTableSettings::profile(RouteProfile::Reduced).unwrap();
		let registry = ViewRegistry::new().with("HomeView", ViewLoader::eager(NotFoundView));

		let err = settings.build_routes(&registry).unwrap_err();

		assert!(matches!(
			err,
			SettingsError::UnknownView { ref view, .. } if view == "NewSecretView"
		));
	}

	#[rstest]
	fn test_invalid_table_is_configuration_error() {
		let settings = RouteTableSettings::from_toml_str(
			r#"
[[routes]]
path = "/secret/:id"
view = "V"

[[routes]]
path = "/secret/:key"
view = "V"
"#,
		)
		.unwrap();

		let err = settings
			.build_router(&registry_for(&settings), Arc::new(MemoryHistory::new()))
			.unwrap_err();

		assert!(matches!(
			err,
			SettingsError::Configuration(ConfigurationError::DuplicatePattern { .. })
		));
	}

	#[rstest]
	fn test_build_router_applies_props_and_names() {
		let settings = RouteTableSettings::profile(RouteProfile::Full).unwrap();

		let router = settings
			.build_router(&registry_for(&settings), Arc::new(MemoryHistory::new()))
			.unwrap();

		let matched = router.resolve("/secret/abc");
		assert_eq!(matched.route_name(), Some("secret.get"));
		assert_eq!(matched.props().get::<String>("id").unwrap(), "abc");
		assert!(router.resolve("/new").props().is_empty());
		assert!(!router.table().has_builtin_not_found());
	}
}
