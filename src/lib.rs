//! # SnapSecret web
//!
//! Client-side navigation for the SnapSecret single-page application.
//!
//! The router maps the path of the browser URL to exactly one view: creating
//! a text secret, creating a file secret, retrieving a secret by id, the home
//! page, or a not-found page. It keeps the browser history in step with the
//! active view and loads view code on demand.
//!
//! ## Crates
//!
//! - [`router`]: pattern matching, route table, navigation and history
//! - [`conf`]: route tables as data, built-in profiles and the view registry
//!
//! ## Feature Flags
//!
//! - `conf` (default) - route table settings and [`bootstrap`]
//!
//! ## Example
//!
//! ```
//! use snapsecret::prelude::*;
//!
//! let router = Router::register([
//!     RouteDefinition::new("/", ViewLoader::eager(|_: &ViewProps| "Home".to_string()))
//!         .unwrap()
//!         .named("home"),
//! ])
//! .unwrap();
//!
//! assert_eq!(router.resolve("/").route_name(), Some("home"));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod global;

#[cfg(feature = "conf")]
#[cfg_attr(docsrs, doc(cfg(feature = "conf")))]
pub mod bootstrap;

pub use snapsecret_router as router;

#[cfg(feature = "conf")]
#[cfg_attr(docsrs, doc(cfg(feature = "conf")))]
pub use snapsecret_conf as conf;

#[cfg(feature = "conf")]
#[cfg_attr(docsrs, doc(cfg(feature = "conf")))]
pub use bootstrap::{BootstrapError, bootstrap};
pub use global::{GlobalRouterError, global_router, init_global_router, is_initialized};

// Re-export commonly used types
pub mod prelude {
	pub use snapsecret_router::{
		ActiveView, History, MemoryHistory, NavigationEvent, NavigationOrigin, NavigationOutcome,
		Path, RouteDefinition, Router, RouterError, View, ViewLoader, ViewProps,
	};

	#[cfg(feature = "conf")]
	pub use snapsecret_conf::{RouteProfile, RouteTableSettings, ViewRegistry};

	pub use crate::global::{global_router, init_global_router};
}
