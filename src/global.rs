//! Process-wide router.
//!
//! The application builds one router at startup and installs it here; every
//! navigation afterwards goes through [`global_router`].

use once_cell::sync::OnceCell;
use snapsecret_router::Router;
use std::sync::Arc;

static GLOBAL_ROUTER: OnceCell<Arc<Router>> = OnceCell::new();

/// Error raised when accessing the global router.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GlobalRouterError {
	/// A router has already been installed.
	#[error("global router is already initialized")]
	AlreadyInitialized,

	/// No router has been installed yet.
	#[error("global router is not initialized: call init_global_router() first")]
	NotInitialized,
}

/// Installs `router` as the process-wide router.
///
/// # Errors
///
/// Returns [`GlobalRouterError::AlreadyInitialized`] if a router was
/// installed before; the existing router stays in place.
pub fn init_global_router(router: Router) -> Result<Arc<Router>, GlobalRouterError> {
	let router = Arc::new(router);
	GLOBAL_ROUTER
		.set(Arc::clone(&router))
		.map_err(|_| GlobalRouterError::AlreadyInitialized)?;
	tracing::info!(routes = router.table().len(), "global router initialized");
	Ok(router)
}

/// Returns the process-wide router.
///
/// # Errors
///
/// Returns [`GlobalRouterError::NotInitialized`] before
/// [`init_global_router`] has succeeded.
pub fn global_router() -> Result<Arc<Router>, GlobalRouterError> {
	GLOBAL_ROUTER
		.get()
		.cloned()
		.ok_or(GlobalRouterError::NotInitialized)
}

/// Returns whether a global router is installed.
pub fn is_initialized() -> bool {
	GLOBAL_ROUTER.get().is_some()
}
