//! Log output of route registration and navigation

use rstest::*;
use snapsecret_router::{RouteDefinition, Router, ViewLoader, ViewProps};
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// A tracing layer that captures `[LEVEL] message` lines.
struct LogCapture {
	logs: Arc<Mutex<Vec<String>>>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
	fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
		struct MessageVisitor {
			message: String,
		}

		impl tracing::field::Visit for MessageVisitor {
			fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
				if field.name() == "message" {
					self.message = format!("{:?}", value);
				}
			}
		}

		let mut visitor = MessageVisitor {
			message: String::new(),
		};
		event.record(&mut visitor);

		self.logs
			.lock()
			.unwrap()
			.push(format!("[{}] {}", event.metadata().level(), visitor.message));
	}
}

fn capture() -> (Arc<Mutex<Vec<String>>>, tracing::subscriber::DefaultGuard) {
	let logs = Arc::new(Mutex::new(Vec::new()));
	let guard = tracing_subscriber::registry()
		.with(LogCapture { logs: logs.clone() })
		.set_default();
	(logs, guard)
}

fn route(pattern: &str) -> RouteDefinition {
	RouteDefinition::new(pattern, ViewLoader::eager(|_: &ViewProps| String::new())).unwrap()
}

#[rstest]
fn test_shadowed_catch_all_is_warned() {
	// Arrange
	let (logs, _guard) = capture();

	// Act
	Router::register([route("/"), route("/*"), route("/:pathMatch(.*)*")]).unwrap();

	// Assert
	let captured = logs.lock().unwrap();
	assert!(
		captured
			.iter()
			.any(|log| log.contains("WARN") && log.contains("shadowed")),
		"Expected shadowing warning, but got: {:?}",
		*captured
	);
}

#[rstest]
#[tokio::test]
async fn test_settled_navigation_is_logged() {
	// Arrange
	let (logs, _guard) = capture();
	let router = Router::register([route("/").named("home")]).unwrap();

	// Act
	router.push("/").await.unwrap();

	// Assert
	let captured = logs.lock().unwrap();
	assert!(
		captured
			.iter()
			.any(|log| log.contains("INFO") && log.contains("navigation settled")),
		"Expected settled log, but got: {:?}",
		*captured
	);
	assert!(captured.iter().any(|log| log.contains("router registered")));
}
