//! SnapSecret client-side router.
//!
//! Maps the path portion of a browser URL to exactly one view of the
//! SnapSecret single-page application and keeps the browser history in step
//! with the active view.
//!
//! ## Architecture
//!
//! - [`pattern`]: Route pattern syntax, matching and reversal
//! - [`params`]: Bound parameters and typed view props
//! - [`view`]: Views and eager/deferred view loaders
//! - [`route`]: Route definitions
//! - [`table`]: The validated route table and path resolution
//! - [`location`]: Query/fragment splitting and base path handling
//! - [`history`]: History backends (in-memory and, on `wasm32`, the browser)
//! - [`navigation`]: Navigation events, phases and outcomes
//! - [`core`]: The [`Router`] driving navigations
//!
//! ## Resolution order
//!
//! Literal routes are tried first, then parameterized routes, then catch-all
//! routes, each group in registration order. A table without a catch-all of
//! its own gets a built-in not-found route, so resolution never fails.
//!
//! ## Example
//!
//! ```
//! use snapsecret_router::{RouteDefinition, Router, ViewLoader, ViewProps};
//!
//! let router = Router::register([
//!     RouteDefinition::new("/", ViewLoader::eager(|_: &ViewProps| "Home".to_string()))
//!         .unwrap()
//!         .named("home"),
//!     RouteDefinition::new("/secret/:id", ViewLoader::eager(|p: &ViewProps| {
//!         format!("Secret {}", p.get::<String>("id").unwrap_or_default())
//!     }))
//!     .unwrap()
//!     .named("secret.get")
//!     .with_props(),
//! ])
//! .unwrap();
//!
//! let matched = router.resolve("/secret/xyz789");
//! assert_eq!(matched.route_name(), Some("secret.get"));
//! assert_eq!(matched.params.get("id"), Some("xyz789"));
//!
//! // Unknown paths land on the built-in not-found route.
//! assert!(router.resolve("/secret/").route.pattern().is_unconditional());
//! ```

pub mod core;
pub mod error;
pub mod history;
pub mod location;
pub mod navigation;
pub mod params;
pub mod pattern;
pub mod route;
pub mod table;
pub mod view;

pub use core::{Router, RouterBuilder};
pub use error::{
	BoxError, ConfigurationError, HistoryError, PathError, RouterError, ViewLoadError,
};
#[cfg(target_arch = "wasm32")]
pub use history::BrowserHistory;
pub use history::{History, HistoryEntry, HistoryState, MemoryHistory, PopState, PopStateReceiver};
pub use location::{BasePath, Location};
pub use navigation::{
	ActiveView, NavigationEvent, NavigationOrigin, NavigationOutcome, NavigationPhase,
};
pub use params::{FromProps, Path, RouteParams, ViewProps};
pub use pattern::{ReverseError, RoutePattern, Tier};
pub use route::{FALLBACK_PATTERN, RouteDefinition};
pub use table::{MatchResult, RouteTable};
pub use view::{DeferredView, NotFoundView, View, ViewLoader};
