//! Implementations of the `snapsecret-routes` subcommands.
//!
//! Commands write to the given writer so they can be exercised without a
//! terminal. Views are replaced by placeholders that render their own name,
//! which is all a route table check needs.

use anyhow::Context as _;
use colored::Colorize;
use snapsecret_conf::{RouteProfile, RouteTableSettings, SettingsError, ViewRegistry};
use snapsecret_router::{
	BoxError, MemoryHistory, NavigationOutcome, Router, Tier, View, ViewLoader, ViewProps,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the route table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
	/// A TOML file.
	File(PathBuf),
	/// A built-in profile.
	Profile(RouteProfile),
	/// `SNAPSECRET_ROUTES_FILE` / `SNAPSECRET_ROUTES_PROFILE`.
	Environment,
}

impl TableSource {
	/// Picks the source from the command-line flags.
	pub fn from_args(config: Option<PathBuf>, profile: Option<RouteProfile>) -> Self {
		match (config, profile) {
			(Some(path), _) => TableSource::File(path),
			(None, Some(profile)) => TableSource::Profile(profile),
			(None, None) => TableSource::Environment,
		}
	}

	/// Loads the settings.
	///
	/// # Errors
	///
	/// Propagates the [`SettingsError`] of the chosen source.
	pub fn load(&self) -> Result<RouteTableSettings, SettingsError> {
		tracing::debug!(source = ?self, "loading route table");
		match self {
			TableSource::File(path) => RouteTableSettings::from_file(path),
			TableSource::Profile(profile) => RouteTableSettings::profile(*profile),
			TableSource::Environment => RouteTableSettings::from_env(),
		}
	}
}

/// A view that renders its registry name and props.
struct Placeholder(String);

impl View for Placeholder {
	fn render(&self, props: &ViewProps) -> String {
		if props.is_empty() {
			return self.0.clone();
		}
		let props: Vec<String> = props
			.params()
			.iter()
			.map(|(name, value)| format!("{}={}", name, value))
			.collect();
		format!("{}({})", self.0, props.join(", "))
	}
}

/// Registers a deferred placeholder for every view the settings name.
pub fn placeholder_registry(settings: &RouteTableSettings) -> ViewRegistry {
	let mut registry = ViewRegistry::new();
	for name in settings.view_names() {
		let label = name.to_string();
		registry.register(
			name,
			ViewLoader::deferred(move || {
				let view: Arc<dyn View> = Arc::new(Placeholder(label.clone()));
				async move { Ok::<_, BoxError>(view) }
			}),
		);
	}
	registry
}

fn build_router(settings: &RouteTableSettings) -> Result<Router, SettingsError> {
	settings.build_router(
		&placeholder_registry(settings),
		Arc::new(MemoryHistory::new()),
	)
}

/// Validates the route table.
///
/// # Errors
///
/// Returns the configuration error that makes the table unusable.
pub fn check(settings: &RouteTableSettings, out: &mut impl Write) -> anyhow::Result<()> {
	let router = build_router(settings)?;
	let table = router.table();
	tracing::info!(routes = table.len(), base = %settings.base, "route table is valid");

	writeln!(
		out,
		"{} {} routes, base '{}'",
		"OK".green().bold(),
		table.len(),
		settings.base
	)?;
	if table.has_builtin_not_found() {
		writeln!(
			out,
			"{} no catch-all route; unknown paths use the built-in not-found view",
			"note:".yellow()
		)?;
	}
	Ok(())
}

/// Prints the routes in the order resolution tries them.
///
/// # Errors
///
/// Returns the configuration error that makes the table unusable.
pub fn list(settings: &RouteTableSettings, out: &mut impl Write) -> anyhow::Result<()> {
	let router = build_router(settings)?;

	let table = router.table();
	let views: Vec<_> = table.iter().zip(&settings.routes).collect();

	for route in table.in_precedence_order() {
		let view = match views.iter().find(|(registered, _)| Arc::ptr_eq(registered, route)) {
			Some((_, spec)) => spec.view.normal(),
			None => "(built-in not found)".dimmed(),
		};
		writeln!(
			out,
			"{:<14} {:<24} {:<18} {}{}",
			tier_label(route.tier()),
			route.pattern().as_str().bold(),
			route.name().unwrap_or("-"),
			view,
			if route.exposes_params() { " [props]" } else { "" }
		)?;
	}
	Ok(())
}

fn tier_label(tier: Tier) -> colored::ColoredString {
	match tier {
		Tier::Literal => tier.to_string().green(),
		Tier::Parameterized => tier.to_string().cyan(),
		Tier::CatchAll => tier.to_string().yellow(),
	}
}

/// Navigates to each path in turn and prints what becomes active.
///
/// # Errors
///
/// Returns the configuration error that makes the table unusable, or the
/// first navigation error.
pub async fn resolve(
	settings: &RouteTableSettings,
	paths: &[String],
	out: &mut impl Write,
) -> anyhow::Result<()> {
	let router = build_router(settings)?;

	for path in paths {
		tracing::debug!(path = %path, "resolving");
		let outcome = router
			.push(path)
			.await
			.with_context(|| format!("navigation to '{}' failed", path))?;
		let NavigationOutcome::Settled(active) = outcome else {
			tracing::warn!(path = %path, "navigation superseded");
			continue;
		};
		let name = match active.route_name() {
			Some(name) => format!(" ({})", name),
			None => String::new(),
		};
		writeln!(
			out,
			"{} -> {}{} => {}",
			path,
			active.route.pattern().as_str().bold(),
			name,
			active.render().green()
		)?;
	}
	Ok(())
}

/// Returns whether `err` means the route table itself is unusable.
pub fn is_configuration_error(err: &anyhow::Error) -> bool {
	err.downcast_ref::<SettingsError>().is_some()
}
