//! Route table configuration for SnapSecret.
//!
//! Route tables are data, not code. This crate loads them from TOML or from
//! the built-in profiles, and turns them into a
//! [`Router`](snapsecret_router::Router) by looking up each route's view in a
//! [`ViewRegistry`].
//!
//! ## Example
//!
//! ```
//! use snapsecret_conf::{RouteProfile, RouteTableSettings, ViewRegistry};
//! use snapsecret_router::{MemoryHistory, NotFoundView, ViewLoader};
//! use std::sync::Arc;
//!
//! let settings = RouteTableSettings::profile(RouteProfile::Reduced).unwrap();
//! let mut registry = ViewRegistry::new();
//! for name in settings.view_names() {
//!     registry.register(name, ViewLoader::eager(NotFoundView));
//! }
//!
//! let router = settings
//!     .build_router(&registry, Arc::new(MemoryHistory::new()))
//!     .unwrap();
//! assert_eq!(router.resolve("/secret/abc").route_name(), Some("secret.get"));
//! ```

pub mod error;
pub mod profile;
pub mod registry;
pub mod settings;

pub use error::SettingsError;
pub use profile::RouteProfile;
pub use registry::ViewRegistry;
pub use settings::{ROUTES_FILE_ENV, ROUTES_PROFILE_ENV, RouteSpec, RouteTableSettings};
