//! Views and the loaders that produce them.
//!
//! The router never renders anything itself. It hands the matched route's
//! [`View`] to the rendering layer, loading the view's code first when the
//! route uses a deferred loader.

use crate::error::BoxError;
use crate::params::ViewProps;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A renderable view module.
pub trait View: Send + Sync {
	/// Renders the view for the given props.
	fn render(&self, props: &ViewProps) -> String;
}

impl<F> View for F
where
	F: Fn(&ViewProps) -> String + Send + Sync,
{
	fn render(&self, props: &ViewProps) -> String {
		self(props)
	}
}

type LoadFn = dyn Fn() -> BoxFuture<'static, Result<Arc<dyn View>, BoxError>> + Send + Sync;

/// A view whose code is fetched on first use.
///
/// A successful load is cached for the lifetime of the loader. A failed load
/// is not, so the next navigation to the route tries again.
#[derive(Clone)]
pub struct DeferredView {
	load: Arc<LoadFn>,
	cache: Arc<Mutex<Option<Arc<dyn View>>>>,
}

impl DeferredView {
	/// Wraps an async loader.
	pub fn new<F, Fut>(load: F) -> Self
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<Arc<dyn View>, BoxError>> + Send + 'static,
	{
		Self {
			load: Arc::new(move || Box::pin(load()) as BoxFuture<'static, _>),
			cache: Arc::new(Mutex::new(None)),
		}
	}

	/// Returns the view if it has already been loaded.
	pub fn cached(&self) -> Option<Arc<dyn View>> {
		self.cache.lock().clone()
	}

	/// Returns whether the view has already been loaded.
	pub fn is_loaded(&self) -> bool {
		self.cache.lock().is_some()
	}

	/// Loads the view, reusing a cached result when one exists.
	///
	/// # Errors
	///
	/// Propagates the loader's error unchanged.
	pub async fn load(&self) -> Result<Arc<dyn View>, BoxError> {
		if let Some(view) = self.cached() {
			return Ok(view);
		}
		let view = (self.load)().await?;
		*self.cache.lock() = Some(Arc::clone(&view));
		Ok(view)
	}
}

impl fmt::Debug for DeferredView {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DeferredView")
			.field("loaded", &self.is_loaded())
			.finish()
	}
}

/// How a route obtains its view.
#[derive(Clone)]
pub enum ViewLoader {
	/// The view is linked into the initial bundle.
	Eager(Arc<dyn View>),
	/// The view is fetched on demand.
	Deferred(DeferredView),
}

impl ViewLoader {
	/// Wraps a directly referenced view.
	pub fn eager<V: View + 'static>(view: V) -> Self {
		Self::Eager(Arc::new(view))
	}

	/// Wraps an async loader.
	pub fn deferred<F, Fut>(load: F) -> Self
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<Arc<dyn View>, BoxError>> + Send + 'static,
	{
		Self::Deferred(DeferredView::new(load))
	}

	/// Returns the view without suspending, if it is available.
	pub fn ready(&self) -> Option<Arc<dyn View>> {
		match self {
			Self::Eager(view) => Some(Arc::clone(view)),
			Self::Deferred(deferred) => deferred.cached(),
		}
	}

	/// Returns whether this is a deferred loader.
	pub fn is_deferred(&self) -> bool {
		matches!(self, Self::Deferred(_))
	}
}

impl fmt::Debug for ViewLoader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Eager(_) => f.write_str("Eager"),
			Self::Deferred(d) => d.fmt(f),
		}
	}
}

/// Built-in view used when a table has no catch-all of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundView;

impl View for NotFoundView {
	fn render(&self, _props: &ViewProps) -> String {
		"404 Not Found".to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn text_view(text: &'static str) -> Arc<dyn View> {
		Arc::new(move |_: &ViewProps| text.to_string())
	}

	#[rstest]
	fn test_eager_is_ready() {
		let loader = ViewLoader::eager(NotFoundView);

		let view = loader.ready().unwrap();

		assert!(!loader.is_deferred());
		assert_eq!(view.render(&ViewProps::empty()), "404 Not Found");
	}

	#[rstest]
	#[tokio::test]
	async fn test_deferred_loads_once() {
		// Arrange
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&calls);
		let loader = DeferredView::new(move || {
			counter.fetch_add(1, Ordering::SeqCst);
			async { Ok(text_view("New secret")) }
		});
		assert!(loader.cached().is_none());

		// Act
		let first = loader.load().await.unwrap();
		let second = loader.load().await.unwrap();

		// Assert
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert!(loader.is_loaded());
		assert_eq!(first.render(&ViewProps::empty()), "New secret");
		assert_eq!(second.render(&ViewProps::empty()), "New secret");
	}

	#[rstest]
	#[tokio::test]
	async fn test_deferred_failure_is_not_cached() {
		// Arrange
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&calls);
		let loader = ViewLoader::deferred(move || {
			let attempt = counter.fetch_add(1, Ordering::SeqCst);
			async move {
				if attempt == 0 {
					Err::<Arc<dyn View>, BoxError>("chunk fetch failed".into())
				} else {
					Ok(text_view("Secret"))
				}
			}
		});
		let ViewLoader::Deferred(deferred) = &loader else {
			panic!("expected deferred loader");
		};

		// Act
		let first = deferred.load().await;
		let second = deferred.load().await;

		// Assert
		assert_eq!(first.err().unwrap().to_string(), "chunk fetch failed");
		assert!(second.is_ok());
		assert!(loader.ready().is_some());
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}
}
