//! Application startup from route table settings

use rstest::*;
use snapsecret::prelude::*;
use snapsecret::router::{BoxError, History};
use snapsecret::{BootstrapError, bootstrap};
use std::sync::Arc;

fn registry() -> ViewRegistry {
	let mut registry = ViewRegistry::new();
	for (name, label) in [
		("HomeView", "Home"),
		("NewSecretView", "New Secret"),
		("NewSecretFileView", "New File Secret"),
		("GetSecretView", "Secret"),
		("NotFoundView", "Not Found"),
	] {
		registry.register(
			name,
			ViewLoader::deferred(move || async move {
				Ok::<_, BoxError>(Arc::new(move |_: &ViewProps| label.to_string()) as Arc<dyn View>)
			}),
		);
	}
	registry
}

#[rstest]
#[tokio::test]
async fn test_bootstrap_installs_router_and_resolves_landing_page() {
	// Arrange
	let settings = RouteTableSettings::profile(RouteProfile::Full).unwrap();
	let history = Arc::new(MemoryHistory::with_initial("/secret/abc"));

	// Act
	let (router, outcome) = bootstrap(&settings, &registry(), history.clone())
		.await
		.unwrap();

	// Assert
	let active = outcome.active().unwrap();
	assert_eq!(active.route_name(), Some("secret.get"));
	assert_eq!(active.params.get("id"), Some("abc"));
	assert_eq!(history.depth(), 1);
	assert!(Arc::ptr_eq(&router, &global_router().unwrap()));

	// A second bootstrap in the same process is refused.
	let again = bootstrap(&settings, &registry(), Arc::new(MemoryHistory::new())).await;
	assert!(matches!(again, Err(BootstrapError::Global(_))));
}

#[rstest]
#[tokio::test]
async fn test_bootstrap_rejects_unknown_views() {
	let settings = RouteTableSettings::profile(RouteProfile::Reduced).unwrap();

	let result = bootstrap(&settings, &ViewRegistry::new(), Arc::new(MemoryHistory::new())).await;

	assert!(matches!(result, Err(BootstrapError::Settings(_))));
}
