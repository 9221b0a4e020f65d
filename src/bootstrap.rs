//! Application startup.

use crate::global::{GlobalRouterError, init_global_router};
use snapsecret_conf::{RouteTableSettings, SettingsError, ViewRegistry};
use snapsecret_router::{History, NavigationOutcome, Router, RouterError};
use std::sync::Arc;

/// Error raised while starting the router.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
	/// The route table could not be built. Startup must abort.
	#[error(transparent)]
	Settings(#[from] SettingsError),

	/// A router is already installed.
	#[error(transparent)]
	Global(#[from] GlobalRouterError),

	/// The initial navigation failed.
	#[error("initial navigation failed: {0}")]
	InitialNavigation(#[from] RouterError),
}

/// Builds the router from `settings`, installs it globally and resolves the
/// location the page was loaded at.
///
/// Returns the installed router together with the outcome of the initial
/// navigation. Spawn [`Router::listen`] afterwards to follow back/forward
/// moves.
///
/// # Errors
///
/// See [`BootstrapError`]. When the initial navigation fails the router is
/// still installed, so the application can retry or navigate elsewhere.
pub async fn bootstrap(
	settings: &RouteTableSettings,
	registry: &ViewRegistry,
	history: Arc<dyn History>,
) -> Result<(Arc<Router>, NavigationOutcome), BootstrapError> {
	let router = settings.build_router(registry, history)?;
	let router = init_global_router(router)?;
	let outcome = router.start().await?;
	Ok((router, outcome))
}
