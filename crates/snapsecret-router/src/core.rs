//! Core Router implementation.
//!
//! The [`Router`] owns the route table, resolves paths against it and drives
//! navigations: loading deferred views, writing history and publishing the
//! active view. Navigations may overlap; the most recent one wins and
//! anything it overtook finishes as [`NavigationOutcome::Superseded`].

use crate::error::{ConfigurationError, RouterError, ViewLoadError};
use crate::history::{History, HistoryEntry, HistoryState, MemoryHistory};
use crate::location::{BasePath, Location};
use crate::navigation::{
	ActiveView, Navigation, NavigationEvent, NavigationOrigin, NavigationOutcome,
	NavigationPhase,
};
use crate::params::RouteParams;
use crate::route::RouteDefinition;
use crate::table::{MatchResult, RouteTable};
use crate::view::ViewLoader;
use futures::stream::{self, StreamExt as _};
use parking_lot::RwLock;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Builder for [`Router`].
pub struct RouterBuilder {
	routes: Vec<RouteDefinition>,
	history: Option<Arc<dyn History>>,
	base: BasePath,
}

impl RouterBuilder {
	/// Appends a route. Order matters within each precedence tier.
	pub fn route(mut self, route: RouteDefinition) -> Self {
		self.routes.push(route);
		self
	}

	/// Appends several routes.
	pub fn routes(mut self, routes: impl IntoIterator<Item = RouteDefinition>) -> Self {
		self.routes.extend(routes);
		self
	}

	/// Sets the history backend. Defaults to a fresh [`MemoryHistory`].
	pub fn history(mut self, history: Arc<dyn History>) -> Self {
		self.history = Some(history);
		self
	}

	/// Sets the prefix the application is served under.
	pub fn base(mut self, base: &str) -> Self {
		self.base = BasePath::new(base);
		self
	}

	/// Validates the routes and builds the router.
	///
	/// # Errors
	///
	/// Returns the first [`ConfigurationError`] found in the route table.
	pub fn build(self) -> Result<Router, ConfigurationError> {
		let table = RouteTable::new(self.routes)?;
		tracing::info!(
			routes = table.len(),
			builtin_not_found = table.has_builtin_not_found(),
			base = self.base.as_str(),
			"router registered"
		);
		Ok(Router {
			table,
			history: self
				.history
				.unwrap_or_else(|| Arc::new(MemoryHistory::new())),
			base: self.base,
			latest: AtomicU64::new(0),
			active: RwLock::new(None),
		})
	}
}

/// The client-side router.
pub struct Router {
	table: RouteTable,
	history: Arc<dyn History>,
	base: BasePath,
	/// Id of the most recently started navigation.
	latest: AtomicU64,
	active: RwLock<Option<ActiveView>>,
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("routes", &self.table.len())
			.field("base", &self.base)
			.field("latest", &self.latest.load(Ordering::SeqCst))
			.finish()
	}
}

impl Router {
	/// Starts building a router.
	pub fn builder() -> RouterBuilder {
		RouterBuilder {
			routes: Vec::new(),
			history: None,
			base: BasePath::default(),
		}
	}

	/// Builds a router over `routes` backed by an in-memory history.
	///
	/// # Errors
	///
	/// Returns the first [`ConfigurationError`] found in the route table.
	pub fn register(
		routes: impl IntoIterator<Item = RouteDefinition>,
	) -> Result<Self, ConfigurationError> {
		Self::builder().routes(routes).build()
	}

	/// Returns the route table.
	pub fn table(&self) -> &RouteTable {
		&self.table
	}

	/// Returns the history backend.
	pub fn history(&self) -> &Arc<dyn History> {
		&self.history
	}

	/// Returns the base path.
	pub fn base(&self) -> &BasePath {
		&self.base
	}

	/// Resolves an app path. Pure and total.
	pub fn resolve(&self, path: &str) -> MatchResult {
		self.table.resolve(path)
	}

	/// Returns the currently active view.
	pub fn active(&self) -> Option<ActiveView> {
		self.active.read().clone()
	}

	/// Returns whether a navigation has been overtaken by a newer one.
	fn is_superseded(&self, id: u64) -> bool {
		self.latest.load(Ordering::SeqCst) != id
	}

	/// Runs one navigation to completion.
	///
	/// A navigation started later always wins: if one arrives while this one
	/// is still waiting for its view, this one returns
	/// [`NavigationOutcome::Superseded`] without touching history or the
	/// active view.
	///
	/// # Errors
	///
	/// - [`RouterError::ViewLoad`] if the deferred view failed to load; the
	///   previous view stays active and retrying is allowed
	/// - [`RouterError::History`] if the history backend rejected the update
	pub async fn navigate(&self, event: NavigationEvent) -> Result<NavigationOutcome, RouterError> {
		let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
		let mut navigation = Navigation::new(id);
		tracing::debug!(
			navigation = id,
			target = %event.target_path,
			origin = %event.origin,
			"navigation started"
		);

		navigation.advance(NavigationPhase::Resolving);
		let location = Location::parse(&event.target_path);
		let matched = self.table.resolve(&location.path);

		let cached = match matched.route.loader() {
			ViewLoader::Eager(view) => Ok(Arc::clone(view)),
			ViewLoader::Deferred(deferred) => deferred.cached().ok_or(deferred),
		};
		let view = match cached {
			Ok(view) => view,
			Err(deferred) => {
				navigation.advance(NavigationPhase::LoadingView);
				let loaded = deferred.load().await;

				if self.is_superseded(id) {
					let discarded = loaded.as_ref().err().map(ToString::to_string);
					return Ok(self.supersede(&mut navigation, discarded));
				}
				loaded.map_err(|source| {
					let err = ViewLoadError {
						pattern: matched.route.pattern().to_string(),
						route_name: matched.route.name().map(str::to_string),
						source,
					};
					tracing::error!(navigation = id, error = %err, "view load failed");
					err
				})?
			}
		};

		let props = matched.props();
		let mut active = self.active.write();
		// Checked under the write lock so an overtaken navigation can never
		// publish after a newer one.
		if self.is_superseded(id) {
			return Ok(self.supersede(&mut navigation, None));
		}
		navigation.advance(NavigationPhase::Activating);

		if event.origin.updates_history() {
			let entry = HistoryEntry {
				url: self.base.join(&location.to_href()),
				state: HistoryState::new(location.path.clone())
					.with_route_name(matched.route.name())
					.with_params(matched.params.clone())
					.with_navigation_id(id),
			};
			let written = match event.origin {
				NavigationOrigin::ProgrammaticReplace => self.history.replace(entry),
				_ => self.history.push(entry),
			};
			written.inspect_err(|e| {
				tracing::warn!(navigation = id, error = %e, "history update failed");
			})?;
		}

		let view = ActiveView {
			navigation_id: id,
			location,
			route: matched.route,
			params: matched.params,
			props,
			view,
		};
		*active = Some(view.clone());
		drop(active);

		navigation.advance(NavigationPhase::Settled);
		tracing::info!(
			navigation = id,
			path = %view.location.path,
			route = view.route_name().unwrap_or(view.route.pattern().as_str()),
			origin = %event.origin,
			"navigation settled"
		);
		Ok(NavigationOutcome::Settled(view))
	}

	fn supersede(&self, navigation: &mut Navigation, load_error: Option<String>) -> NavigationOutcome {
		tracing::warn!(
			phase = %navigation.phase(),
			discarded_load_error = ?load_error,
			"navigation superseded by a newer one"
		);
		navigation.advance(NavigationPhase::Superseded);
		NavigationOutcome::Superseded
	}

	/// Navigates to `target`, adding a history entry.
	///
	/// # Errors
	///
	/// See [`navigate`](Router::navigate).
	pub async fn push(&self, target: &str) -> Result<NavigationOutcome, RouterError> {
		self.navigate(NavigationEvent::push(target)).await
	}

	/// Navigates to `target`, replacing the current history entry.
	///
	/// # Errors
	///
	/// See [`navigate`](Router::navigate).
	pub async fn replace(&self, target: &str) -> Result<NavigationOutcome, RouterError> {
		self.navigate(NavigationEvent::replace(target)).await
	}

	/// Navigates to a named route, adding a history entry.
	///
	/// # Errors
	///
	/// Returns the errors of [`reverse`](Router::reverse) if no path can be
	/// built, otherwise see [`navigate`](Router::navigate).
	pub async fn push_named(
		&self,
		name: &str,
		params: &[(&str, &str)],
	) -> Result<NavigationOutcome, RouterError> {
		let path = self.reverse(name, params)?;
		self.push(&path).await
	}

	/// Builds the app path of a named route.
	///
	/// # Errors
	///
	/// See [`RouteTable::reverse`](crate::RouteTable::reverse).
	pub fn reverse(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouterError> {
		let params: RouteParams = params.iter().copied().collect();
		self.table.reverse(name, &params)
	}

	/// Resolves the history's current location as the initial page load.
	///
	/// # Errors
	///
	/// See [`navigate`](Router::navigate).
	pub async fn start(&self) -> Result<NavigationOutcome, RouterError> {
		let current = self.history.current().unwrap_or_else(|| "/".to_string());
		let target = self.base.strip(&current);
		self.navigate(NavigationEvent::initial_load(target)).await
	}

	/// Follows back/forward moves until the history stops emitting them.
	///
	/// The subscription is taken when this is called, so moves made before
	/// the returned future is first polled are not lost. Spawn the future on
	/// the UI executor after [`start`](Router::start). Each move starts its
	/// navigation as soon as it arrives, so a later move supersedes one still
	/// waiting for its view. Failed navigations are logged and leave the
	/// previous view in place.
	pub fn listen(self: Arc<Self>) -> impl Future<Output = ()> + Send + 'static {
		let mut events = self.history.subscribe();
		let pops = stream::poll_fn(move |cx| events.poll_recv(cx));
		async move {
			pops.for_each_concurrent(None, |pop| {
				let router = Arc::clone(&self);
				async move {
					let target = router.base.strip(&pop.url);
					if let Err(e) = router.navigate(NavigationEvent::back_forward(target)).await {
						tracing::warn!(url = %pop.url, error = %e, "back/forward navigation failed");
					}
				}
			})
			.await;
			tracing::debug!("history listener stopped");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::params::ViewProps;
	use crate::view::{NotFoundView, View};
	use rstest::rstest;

	fn text(label: &'static str) -> ViewLoader {
		ViewLoader::eager(move |_: &ViewProps| label.to_string())
	}

	fn router() -> Router {
		Router::register([
			RouteDefinition::new("/", text("Home")).unwrap().named("home"),
			RouteDefinition::new("/secret/:id", text("Secret"))
				.unwrap()
				.named("secret.get")
				.with_props(),
			RouteDefinition::new("/*", ViewLoader::eager(NotFoundView)).unwrap(),
		])
		.unwrap()
	}

	#[rstest]
	fn test_register_rejects_conflicts() {
		let result = Router::register([
			RouteDefinition::new("/", text("a")).unwrap(),
			RouteDefinition::new("/", text("b")).unwrap(),
		]);
		assert!(matches!(
			result,
			Err(ConfigurationError::DuplicatePattern { .. })
		));
	}

	#[rstest]
	fn test_reverse() {
		let router = router();

		assert_eq!(router.reverse("home", &[]).unwrap(), "/");
		assert_eq!(
			router.reverse("secret.get", &[("id", "abc")]).unwrap(),
			"/secret/abc"
		);
		assert!(matches!(
			router.reverse("secret.get", &[]),
			Err(RouterError::MissingParameter { ref param, .. }) if param == "id"
		));
		assert!(matches!(
			router.reverse("nope", &[]),
			Err(RouterError::InvalidRouteName(_))
		));
	}

	#[rstest]
	#[tokio::test]
	async fn test_push_activates_and_records_history() {
		// Arrange
		let router = router();

		// Act
		let outcome = router.push("/secret/xyz?view=raw").await.unwrap();

		// Assert
		let active = outcome.active().unwrap();
		assert_eq!(active.route_name(), Some("secret.get"));
		assert_eq!(active.params.get("id"), Some("xyz"));
		assert_eq!(active.props.get::<String>("id").unwrap(), "xyz");
		assert_eq!(active.location.query.get("view").map(String::as_str), Some("raw"));
		assert_eq!(router.history().depth(), 2);
		assert_eq!(
			router.history().current().as_deref(),
			Some("/secret/xyz?view=raw")
		);
		assert_eq!(router.active().unwrap().navigation_id, active.navigation_id);
	}

	#[rstest]
	#[tokio::test]
	async fn test_base_is_applied_to_history() {
		let history = Arc::new(MemoryHistory::with_initial("/app/"));
		let router = Router::builder()
			.route(RouteDefinition::new("/", text("Home")).unwrap())
			.route(RouteDefinition::new("/new", text("New")).unwrap())
			.history(history.clone())
			.base("/app/")
			.build()
			.unwrap();

		let initial = router.start().await.unwrap();
		router.push("/new").await.unwrap();

		assert_eq!(initial.active().unwrap().render(), "Home");
		assert_eq!(history.current().as_deref(), Some("/app/new"));
		assert_eq!(history.current_entry().state.path, "/new");
	}

	#[rstest]
	#[tokio::test]
	async fn test_replace_keeps_depth() {
		let router = router();

		router.replace("/secret/a").await.unwrap();

		assert_eq!(router.history().depth(), 1);
		assert_eq!(router.history().current().as_deref(), Some("/secret/a"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_push_named() {
		let router = router();

		let outcome = router.push_named("secret.get", &[("id", "q1")]).await.unwrap();

		let active = outcome.active().unwrap();
		assert_eq!(active.location.path, "/secret/q1");
		assert_eq!(active.view.render(&active.props), "Secret");
	}
}
