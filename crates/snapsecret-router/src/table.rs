//! The validated route table and path resolution.

use crate::error::{ConfigurationError, RouterError};
use crate::params::{RouteParams, ViewProps};
use crate::pattern::{ReverseError, Tier};
use crate::route::RouteDefinition;
use std::collections::HashMap;
use std::sync::Arc;

/// A resolved route with its extracted parameters.
#[derive(Debug, Clone)]
pub struct MatchResult {
	/// The matched route.
	pub route: Arc<RouteDefinition>,
	/// Parameters bound by the match. Empty for literal and catch-all routes.
	pub params: RouteParams,
}

impl MatchResult {
	/// Returns the props the matched view receives.
	pub fn props(&self) -> ViewProps {
		if self.route.exposes_params() {
			ViewProps::new(self.params.clone())
		} else {
			ViewProps::empty()
		}
	}

	/// Returns the matched route's name.
	pub fn route_name(&self) -> Option<&str> {
		self.route.name()
	}
}

/// An ordered, validated set of routes.
///
/// Resolution tries literal routes first, then parameterized routes, then
/// catch-alls, each group in registration order. A table without an
/// unconditional catch-all is given a built-in not-found route, so
/// [`resolve`](RouteTable::resolve) always produces a match.
#[derive(Debug, Clone)]
pub struct RouteTable {
	/// Routes in registration order.
	routes: Vec<Arc<RouteDefinition>>,
	literal: HashMap<String, usize>,
	parameterized: Vec<usize>,
	catch_all: Vec<usize>,
	named: HashMap<String, usize>,
	fallback: Arc<RouteDefinition>,
	synthesized_fallback: bool,
}

impl RouteTable {
	/// Validates the routes and builds the match table.
	///
	/// # Errors
	///
	/// - [`ConfigurationError::DuplicatePattern`] when two non-wildcard routes
	///   match the same paths
	/// - [`ConfigurationError::DuplicateName`] when two routes share a name
	/// - [`ConfigurationError::EmptyName`] when a route name is empty
	pub fn new(
		routes: impl IntoIterator<Item = RouteDefinition>,
	) -> Result<Self, ConfigurationError> {
		let routes: Vec<Arc<RouteDefinition>> = routes.into_iter().map(Arc::new).collect();

		let mut literal = HashMap::new();
		let mut parameterized = Vec::new();
		let mut catch_all = Vec::new();
		let mut named = HashMap::new();
		let mut shapes: HashMap<String, usize> = HashMap::new();
		let mut fallback = None;

		for (index, route) in routes.iter().enumerate() {
			if let Some(name) = route.name() {
				if name.is_empty() {
					return Err(ConfigurationError::EmptyName(
						route.pattern().to_string(),
					));
				}
				if named.insert(name.to_string(), index).is_some() {
					return Err(ConfigurationError::DuplicateName(name.to_string()));
				}
			}

			let tier = route.tier();
			if tier != Tier::CatchAll
				&& let Some(existing) = shapes.insert(route.pattern().shape(), index)
			{
				return Err(ConfigurationError::DuplicatePattern {
					pattern: route.pattern().to_string(),
					existing: routes[existing].pattern().to_string(),
				});
			}

			match tier {
				Tier::Literal => {
					literal.insert(route.pattern().as_str().to_string(), index);
				}
				Tier::Parameterized => parameterized.push(index),
				Tier::CatchAll => {
					if fallback.is_some() {
						tracing::warn!(
							pattern = %route.pattern(),
							"catch-all route is shadowed by an earlier unconditional catch-all"
						);
					} else if route.pattern().is_unconditional() {
						fallback = Some(Arc::clone(route));
					}
					catch_all.push(index);
				}
			}
		}

		let synthesized_fallback = fallback.is_none();
		let fallback = fallback.unwrap_or_else(|| {
			tracing::debug!("route table has no catch-all, installing built-in not-found route");
			Arc::new(RouteDefinition::fallback())
		});

		Ok(Self {
			routes,
			literal,
			parameterized,
			catch_all,
			named,
			fallback,
			synthesized_fallback,
		})
	}

	/// Resolves a path to exactly one route.
	///
	/// Never fails: paths no route claims land on the not-found route.
	pub fn resolve(&self, path: &str) -> MatchResult {
		if let Some(&index) = self.literal.get(path) {
			return self.matched(index, RouteParams::new());
		}

		for &index in &self.parameterized {
			if let Some(params) = self.routes[index].pattern().matches(path) {
				return self.matched(index, params);
			}
		}

		for &index in &self.catch_all {
			if self.routes[index].pattern().is_match(path) {
				return self.matched(index, RouteParams::new());
			}
		}

		MatchResult {
			route: Arc::clone(&self.fallback),
			params: RouteParams::new(),
		}
	}

	fn matched(&self, index: usize, params: RouteParams) -> MatchResult {
		MatchResult {
			route: Arc::clone(&self.routes[index]),
			params,
		}
	}

	/// Looks up a route by name.
	pub fn by_name(&self, name: &str) -> Option<&Arc<RouteDefinition>> {
		self.named.get(name).map(|&index| &self.routes[index])
	}

	/// Builds the path of a named route from `params`.
	///
	/// # Errors
	///
	/// - [`RouterError::InvalidRouteName`] if no route has that name
	/// - [`RouterError::MissingParameter`] if a declared parameter is absent
	/// - [`RouterError::InvalidParameter`] if a value would build a path
	///   that does not resolve to the route
	pub fn reverse(&self, name: &str, params: &RouteParams) -> Result<String, RouterError> {
		let route = self
			.by_name(name)
			.ok_or_else(|| RouterError::InvalidRouteName(name.to_string()))?;
		route.pattern().reverse(params).map_err(|e| match e {
			ReverseError::Missing(param) => RouterError::MissingParameter {
				route: name.to_string(),
				param,
			},
			ReverseError::Invalid { name: param, value } => RouterError::InvalidParameter {
				route: name.to_string(),
				param,
				value,
			},
		})
	}

	/// Returns the route paths fall back to when nothing else matches.
	pub fn not_found(&self) -> &Arc<RouteDefinition> {
		&self.fallback
	}

	/// Returns whether the not-found route was synthesized by the table.
	pub fn has_builtin_not_found(&self) -> bool {
		self.synthesized_fallback
	}

	/// Iterates over routes in registration order.
	pub fn iter(&self) -> impl Iterator<Item = &Arc<RouteDefinition>> {
		self.routes.iter()
	}

	/// Iterates over routes in the order resolution tries them.
	///
	/// Literal routes are listed in registration order even though they are
	/// looked up by exact path.
	pub fn in_precedence_order(&self) -> impl Iterator<Item = &Arc<RouteDefinition>> {
		let mut literal: Vec<usize> = self.literal.values().copied().collect();
		literal.sort_unstable();
		let builtin = self.synthesized_fallback.then_some(&self.fallback);
		literal
			.into_iter()
			.chain(self.parameterized.iter().copied())
			.chain(self.catch_all.iter().copied())
			.map(|index| &self.routes[index])
			.chain(builtin)
	}

	/// Returns the number of registered routes, excluding a built-in not-found route.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Returns whether no routes were registered.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}
}
