//! Navigation targets: splitting paths from query strings and fragments,
//! and mapping between app paths and browser paths under a base prefix.

use indexmap::IndexMap;

/// A navigation target split into its parts.
///
/// Only [`path`](Location::path) takes part in route matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
	/// Absolute path, always starting with `/`.
	pub path: String,
	/// Query string as given, without the leading `?`.
	pub search: Option<String>,
	/// Decoded query pairs. Later duplicates overwrite earlier ones.
	pub query: IndexMap<String, String>,
	/// Fragment without the leading `#`.
	pub fragment: Option<String>,
}

impl Location {
	/// Splits a raw target such as `/secret/abc?view=raw#top`.
	///
	/// A missing leading `/` is added and an empty path becomes `/`.
	/// Malformed query strings are ignored rather than rejected.
	pub fn parse(raw: &str) -> Self {
		let (rest, fragment) = match raw.split_once('#') {
			Some((rest, fragment)) => (rest, Some(fragment.to_string())),
			None => (raw, None),
		};
		let (path, search) = match rest.split_once('?') {
			Some((path, search)) => (path, Some(search.to_string())),
			None => (rest, None),
		};
		let query = search.as_deref().map(parse_query).unwrap_or_default();

		Self {
			path: normalize_path(path),
			search,
			query,
			fragment,
		}
	}

	/// Reassembles the target with the query string exactly as given.
	pub fn to_href(&self) -> String {
		let mut href = self.path.clone();
		if let Some(search) = &self.search {
			href.push('?');
			href.push_str(search);
		}
		if let Some(fragment) = &self.fragment {
			href.push('#');
			href.push_str(fragment);
		}
		href
	}
}

fn parse_query(query: &str) -> IndexMap<String, String> {
	serde_urlencoded::from_str::<Vec<(String, String)>>(query)
		.map(|pairs| pairs.into_iter().collect())
		.unwrap_or_else(|e| {
			tracing::debug!(query, error = %e, "ignoring malformed query string");
			IndexMap::new()
		})
}

fn normalize_path(path: &str) -> String {
	if path.starts_with('/') {
		path.to_string()
	} else {
		format!("/{}", path)
	}
}

/// Prefix under which the application is served, e.g. `/app/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasePath {
	/// Normalized prefix without a trailing `/`; empty for the root.
	prefix: String,
}

impl BasePath {
	/// Creates a base from a prefix such as `/`, `/app` or `app/`.
	pub fn new(base: &str) -> Self {
		let trimmed = base.trim_matches('/');
		let prefix = if trimmed.is_empty() {
			String::new()
		} else {
			format!("/{}", trimmed)
		};
		Self { prefix }
	}

	/// Returns the normalized prefix (`""` for the root).
	pub fn as_str(&self) -> &str {
		&self.prefix
	}

	/// Converts a browser href into an app href.
	///
	/// Paths outside the base are returned unchanged so they still resolve,
	/// normally to the not-found route.
	pub fn strip(&self, browser_href: &str) -> String {
		if self.prefix.is_empty() {
			return browser_href.to_string();
		}
		match browser_href.strip_prefix(self.prefix.as_str()) {
			Some("") => "/".to_string(),
			Some(rest) if rest.starts_with('/') => rest.to_string(),
			Some(rest) if rest.starts_with(['?', '#']) => format!("/{}", rest),
			_ => browser_href.to_string(),
		}
	}

	/// Converts an app href into a browser href.
	pub fn join(&self, app_href: &str) -> String {
		if app_href.starts_with('/') {
			format!("{}{}", self.prefix, app_href)
		} else {
			format!("{}/{}", self.prefix, app_href)
		}
	}
}
