//! Route pattern compilation and matching.
//!
//! Patterns use the vue-router flavoured syntax the SnapSecret frontend has
//! always been configured with:
//!
//! - `/new` - literal, compared verbatim
//! - `/secret/:id` - `id` binds exactly one non-empty segment
//! - `/secret/:id([A-Za-z0-9_-]+)` - the bound segment must also match the regex
//! - `/*`, `/:pathMatch(.*)*` - catch-all, matches any remaining path
//! - `/files/*` - catch-all behind a literal prefix
//!
//! Every compiled pattern belongs to exactly one [`Tier`], which decides the
//! order in which the route table tries it.

use crate::error::ConfigurationError;
use crate::params::RouteParams;
use regex::{Regex, RegexBuilder};
use std::fmt;

/// Maximum allowed length for a route pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of segments in a route pattern.
const MAX_PATTERN_SEGMENTS: usize = 32;

/// Maximum compiled size of a parameter constraint regex.
const MAX_CONSTRAINT_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// Precedence tier of a pattern. Lower tiers are tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
	/// No parameters, compared verbatim.
	Literal,
	/// One or more single-segment parameters.
	Parameterized,
	/// Ends in a catch-all tail.
	CatchAll,
}

impl fmt::Display for Tier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Literal => f.write_str("literal"),
			Self::Parameterized => f.write_str("parameterized"),
			Self::CatchAll => f.write_str("catch-all"),
		}
	}
}

/// Why a path could not be built from a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReverseError {
	/// A declared parameter has no value.
	Missing(String),
	/// A value would not match the segment it fills.
	Invalid {
		/// Parameter name.
		name: String,
		/// Rejected value.
		value: String,
	},
}

#[derive(Debug, Clone)]
struct Constraint {
	source: String,
	regex: Regex,
}

#[derive(Debug, Clone)]
enum Segment {
	Literal(String),
	Param {
		name: String,
		constraint: Option<Constraint>,
	},
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
	pattern: String,
	/// For catch-all patterns these are the prefix segments only.
	segments: Vec<Segment>,
	/// `Some(name)` for catch-all patterns; the inner name is `None` for a bare `*`.
	catch_all: Option<Option<String>>,
}

/// Splits an absolute path into its segments. `/` yields a single empty segment.
pub(crate) fn split_segments(path: &str) -> Option<Vec<&str>> {
	path.strip_prefix('/').map(|rest| rest.split('/').collect())
}

impl RoutePattern {
	/// Compiles a pattern string.
	///
	/// # Errors
	///
	/// Returns [`ConfigurationError::InvalidPattern`] if the pattern does not
	/// start with `/`, exceeds the length or segment limits, declares an
	/// unnamed or badly named parameter, carries an invalid constraint regex,
	/// or places a catch-all anywhere but at the end behind literal segments.
	pub fn parse(pattern: &str) -> Result<Self, ConfigurationError> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(ConfigurationError::invalid_pattern(
				pattern,
				format!(
					"length {} exceeds maximum allowed length of {} bytes",
					pattern.len(),
					MAX_PATTERN_LENGTH
				),
			));
		}

		let raw_segments = split_segments(pattern)
			.ok_or_else(|| ConfigurationError::invalid_pattern(pattern, "must start with '/'"))?;

		if raw_segments.len() > MAX_PATTERN_SEGMENTS {
			return Err(ConfigurationError::invalid_pattern(
				pattern,
				format!(
					"has {} segments, exceeding maximum of {}",
					raw_segments.len(),
					MAX_PATTERN_SEGMENTS
				),
			));
		}

		let last = raw_segments.len() - 1;
		let mut segments = Vec::with_capacity(raw_segments.len());
		let mut catch_all = None;

		for (index, raw) in raw_segments.iter().enumerate() {
			match parse_segment(pattern, raw)? {
				Parsed::Segment(segment) => segments.push(segment),
				Parsed::CatchAll(name) => {
					if index != last {
						return Err(ConfigurationError::invalid_pattern(
							pattern,
							"catch-all must be the last segment",
						));
					}
					if segments.iter().any(|s| matches!(s, Segment::Param { .. })) {
						return Err(ConfigurationError::invalid_pattern(
							pattern,
							"catch-all may only follow literal segments",
						));
					}
					catch_all = Some(name);
				}
			}
		}

		let mut seen = Vec::new();
		for segment in &segments {
			if let Segment::Param { name, .. } = segment {
				if seen.contains(&name) {
					return Err(ConfigurationError::invalid_pattern(
						pattern,
						format!("parameter '{}' is declared twice", name),
					));
				}
				seen.push(name);
			}
		}

		Ok(Self {
			pattern: pattern.to_string(),
			segments,
			catch_all,
		})
	}

	/// A root catch-all binding `name`, e.g. `/:pathMatch(.*)*`.
	pub(crate) fn catch_all(pattern: &str, name: &str) -> Self {
		Self {
			pattern: pattern.to_string(),
			segments: Vec::new(),
			catch_all: Some(Some(name.to_string())),
		}
	}

	/// Returns the original pattern string.
	pub fn as_str(&self) -> &str {
		&self.pattern
	}

	/// Returns the precedence tier of this pattern.
	pub fn tier(&self) -> Tier {
		if self.catch_all.is_some() {
			Tier::CatchAll
		} else if self.param_names().next().is_some() {
			Tier::Parameterized
		} else {
			Tier::Literal
		}
	}

	/// Returns whether this catch-all matches every possible input.
	pub fn is_unconditional(&self) -> bool {
		self.catch_all.is_some() && self.segments.is_empty()
	}

	/// Returns the declared single-segment parameter names, in order.
	pub fn param_names(&self) -> impl Iterator<Item = &str> {
		self.segments.iter().filter_map(|s| match s {
			Segment::Param { name, .. } => Some(name.as_str()),
			Segment::Literal(_) => None,
		})
	}

	/// Key under which two non-wildcard patterns are considered identical.
	///
	/// Parameter names are erased, so `/secret/:id` and `/secret/:key` share a
	/// shape while `/secret/:id(\d+)` does not.
	pub(crate) fn shape(&self) -> String {
		if self.tier() == Tier::Literal {
			return self.pattern.clone();
		}
		let mut shape = String::new();
		for segment in &self.segments {
			shape.push('/');
			match segment {
				Segment::Literal(text) => shape.push_str(text),
				Segment::Param { constraint, .. } => {
					shape.push(':');
					if let Some(c) = constraint {
						shape.push('(');
						shape.push_str(&c.source);
						shape.push(')');
					}
				}
			}
		}
		shape
	}

	/// Attempts to match a path against this pattern.
	///
	/// Literal and catch-all matches bind no parameters.
	pub fn matches(&self, path: &str) -> Option<RouteParams> {
		match self.tier() {
			Tier::Literal => (path == self.pattern).then(RouteParams::new),
			Tier::Parameterized => self.match_segments(path),
			Tier::CatchAll => self.match_prefix(path).then(RouteParams::new),
		}
	}

	/// Checks if this pattern would match the given path.
	pub fn is_match(&self, path: &str) -> bool {
		self.matches(path).is_some()
	}

	fn match_segments(&self, path: &str) -> Option<RouteParams> {
		let parts = split_segments(path)?;
		if parts.len() != self.segments.len() {
			return None;
		}

		let mut params = RouteParams::new();
		for (segment, part) in self.segments.iter().zip(parts) {
			match segment {
				Segment::Literal(text) => {
					if text != part {
						return None;
					}
				}
				Segment::Param { name, constraint } => {
					if part.is_empty() {
						return None;
					}
					if let Some(c) = constraint
						&& !c.regex.is_match(part)
					{
						return None;
					}
					params.insert(name.clone(), part.to_string());
				}
			}
		}
		Some(params)
	}

	fn match_prefix(&self, path: &str) -> bool {
		if self.segments.is_empty() {
			return true;
		}
		let Some(parts) = split_segments(path) else {
			return false;
		};
		parts.len() >= self.segments.len()
			&& self.segments.iter().zip(parts).all(|(segment, part)| {
				matches!(segment, Segment::Literal(text) if text == part)
			})
	}

	/// Generates a path from this pattern with the given parameters.
	///
	/// A named catch-all takes its remainder from `params` when present.
	/// Values are checked so the generated path resolves back to this
	/// pattern.
	///
	/// # Errors
	///
	/// - [`ReverseError::Missing`] for the first declared parameter absent
	///   from `params`
	/// - [`ReverseError::Invalid`] for a value containing `/`, `?` or `#`,
	///   or one rejected by the segment's constraint
	pub fn reverse(&self, params: &RouteParams) -> Result<String, ReverseError> {
		if self.tier() == Tier::Literal {
			return Ok(self.pattern.clone());
		}

		let mut path = String::new();
		for segment in &self.segments {
			path.push('/');
			match segment {
				Segment::Literal(text) => path.push_str(text),
				Segment::Param { name, constraint } => {
					let value = match params.get(name) {
						Some(value) if !value.is_empty() => value,
						_ => return Err(ReverseError::Missing(name.clone())),
					};
					let fits = !value.contains(['/', '?', '#'])
						&& constraint.as_ref().is_none_or(|c| c.regex.is_match(value));
					if !fits {
						return Err(ReverseError::Invalid {
							name: name.clone(),
							value: value.to_string(),
						});
					}
					path.push_str(value);
				}
			}
		}

		if let Some(name) = &self.catch_all {
			path.push('/');
			if let Some((name, rest)) = name.as_deref().and_then(|n| Some((n, params.get(n)?))) {
				if rest.contains(['?', '#']) {
					return Err(ReverseError::Invalid {
						name: name.to_string(),
						value: rest.to_string(),
					});
				}
				path.push_str(rest.trim_start_matches('/'));
			}
		}

		Ok(path)
	}
}

enum Parsed {
	Segment(Segment),
	CatchAll(Option<String>),
}

fn parse_segment(pattern: &str, raw: &str) -> Result<Parsed, ConfigurationError> {
	if raw == "*" {
		return Ok(Parsed::CatchAll(None));
	}
	let Some(spec) = raw.strip_prefix(':') else {
		return Ok(Parsed::Segment(Segment::Literal(raw.to_string())));
	};

	let name_end = spec
		.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
		.unwrap_or(spec.len());
	let name = &spec[..name_end];
	if name.is_empty() {
		return Err(ConfigurationError::invalid_pattern(
			pattern,
			format!("parameter segment '{}' has no name", raw),
		));
	}

	let mut rest = &spec[name_end..];
	let mut constraint = None;
	if rest.starts_with('(') {
		let close = closing_paren(rest).ok_or_else(|| {
			ConfigurationError::invalid_pattern(pattern, format!("unbalanced '(' in '{}'", raw))
		})?;
		constraint = Some(&rest[1..close]);
		rest = &rest[close + 1..];
	}

	let repeatable = match rest {
		"" => false,
		"*" => true,
		other => {
			return Err(ConfigurationError::invalid_pattern(
				pattern,
				format!("unsupported modifier '{}' on parameter '{}'", other, name),
			));
		}
	};

	let wildcard_constraint = constraint == Some(".*");
	if repeatable || wildcard_constraint {
		if constraint.is_some() && !wildcard_constraint {
			return Err(ConfigurationError::invalid_pattern(
				pattern,
				format!(
					"repeatable parameter '{}' is only supported as a catch-all '(.*)'",
					name
				),
			));
		}
		return Ok(Parsed::CatchAll(Some(name.to_string())));
	}

	let constraint = constraint
		.map(|source| compile_constraint(pattern, source))
		.transpose()?;

	Ok(Parsed::Segment(Segment::Param {
		name: name.to_string(),
		constraint,
	}))
}

/// Finds the `)` closing the `(` at index 0, honouring escapes and nesting.
fn closing_paren(s: &str) -> Option<usize> {
	let mut depth = 0usize;
	let mut escaped = false;
	for (i, c) in s.char_indices() {
		if escaped {
			escaped = false;
			continue;
		}
		match c {
			'\\' => escaped = true,
			'(' => depth += 1,
			')' => {
				depth -= 1;
				if depth == 0 {
					return Some(i);
				}
			}
			_ => {}
		}
	}
	None
}

fn compile_constraint(pattern: &str, source: &str) -> Result<Constraint, ConfigurationError> {
	if source.is_empty() {
		return Err(ConfigurationError::invalid_pattern(
			pattern,
			"empty parameter constraint",
		));
	}
	let regex = RegexBuilder::new(&format!("^(?:{})$", source))
		.size_limit(MAX_CONSTRAINT_REGEX_SIZE)
		.build()
		.map_err(|e| {
			ConfigurationError::invalid_pattern(pattern, format!("invalid constraint: {}", e))
		})?;
	Ok(Constraint {
		source: source.to_string(),
		regex,
	})
}

impl PartialEq for RoutePattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for RoutePattern {}

impl fmt::Display for RoutePattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.pattern)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/", Tier::Literal)]
	#[case("/new", Tier::Literal)]
	#[case("/api/v1.0/", Tier::Literal)]
	#[case("/secret/:id", Tier::Parameterized)]
	#[case("/secret/:id([a-z]+)", Tier::Parameterized)]
	#[case("/*", Tier::CatchAll)]
	#[case("/:pathMatch(.*)*", Tier::CatchAll)]
	#[case("/:rest*", Tier::CatchAll)]
	#[case("/:rest(.*)", Tier::CatchAll)]
	#[case("/files/*", Tier::CatchAll)]
	fn test_tier_classification(#[case] pattern: &str, #[case] tier: Tier) {
		let compiled = RoutePattern::parse(pattern).unwrap();
		assert_eq!(compiled.tier(), tier);
	}

	#[rstest]
	fn test_literal_is_verbatim() {
		let pattern = RoutePattern::parse("/new").unwrap();
		assert!(pattern.is_match("/new"));
		assert!(!pattern.is_match("/new/"));
		assert!(!pattern.is_match("/NEW"));
		assert!(pattern.matches("/new").unwrap().is_empty());
	}

	#[rstest]
	fn test_single_param() {
		let pattern = RoutePattern::parse("/secret/:id").unwrap();

		let params = pattern.matches("/secret/xyz789").unwrap();

		assert_eq!(params.get("id"), Some("xyz789"));
		assert_eq!(params.len(), 1);
	}

	#[rstest]
	#[case("/secret/")]
	#[case("/secret")]
	#[case("/secret/a/b")]
	#[case("/other/abc")]
	#[case("secret/abc")]
	fn test_single_param_rejects(#[case] path: &str) {
		let pattern = RoutePattern::parse("/secret/:id").unwrap();
		assert!(pattern.matches(path).is_none());
	}

	#[rstest]
	fn test_param_value_is_not_decoded() {
		let pattern = RoutePattern::parse("/secret/:id").unwrap();

		let params = pattern.matches("/secret/a%20b").unwrap();

		assert_eq!(params.get("id"), Some("a%20b"));
	}

	#[rstest]
	fn test_multiple_params_keep_order() {
		let pattern = RoutePattern::parse("/u/:user/s/:secret").unwrap();

		let params = pattern.matches("/u/alice/s/42").unwrap();

		let names: Vec<_> = params.iter().map(|(k, _)| k.as_str()).collect();
		assert_eq!(names, ["user", "secret"]);
		assert_eq!(pattern.param_names().collect::<Vec<_>>(), ["user", "secret"]);
	}

	#[rstest]
	fn test_constraint_must_match_whole_segment() {
		let pattern = RoutePattern::parse(r"/secret/:id(\d+)").unwrap();
		assert!(pattern.is_match("/secret/123"));
		assert!(!pattern.is_match("/secret/123abc"));
	}

	#[rstest]
	#[case("/*", "/nonexistent/deeply/nested")]
	#[case("/*", "")]
	#[case("/*", "no-leading-slash")]
	#[case("/:pathMatch(.*)*", "/../../etc")]
	#[case("/files/*", "/files")]
	#[case("/files/*", "/files/a/b/c")]
	fn test_catch_all_matches(#[case] pattern: &str, #[case] path: &str) {
		let compiled = RoutePattern::parse(pattern).unwrap();

		let params = compiled.matches(path).unwrap();

		assert!(params.is_empty());
	}

	#[rstest]
	fn test_prefixed_catch_all_requires_prefix() {
		let pattern = RoutePattern::parse("/files/*").unwrap();
		assert!(!pattern.is_unconditional());
		assert!(!pattern.is_match("/filesystem"));
		assert!(!pattern.is_match("/other/files"));
	}

	#[rstest]
	#[case("new")]
	#[case("")]
	#[case("/secret/:")]
	#[case("/secret/:id+")]
	#[case("/secret/:id(")]
	#[case("/secret/:id([)")]
	#[case("/secret/:id()")]
	#[case("/*/tail")]
	#[case("/:id/*")]
	#[case("/:id/:id")]
	#[case(r"/:rest(\d+)*")]
	fn test_invalid_patterns(#[case] pattern: &str) {
		let result = RoutePattern::parse(pattern);
		assert!(
			matches!(result, Err(ConfigurationError::InvalidPattern { .. })),
			"expected '{}' to be rejected",
			pattern
		);
	}

	#[rstest]
	fn test_rejects_excessive_length() {
		// Arrange
		let long_pattern = "/".to_string() + &"a".repeat(1025);

		// Act
		let result = RoutePattern::parse(&long_pattern);

		// Assert
		let err = result.unwrap_err();
		assert!(err.to_string().contains("exceeds maximum allowed length"));
	}

	#[rstest]
	fn test_rejects_excessive_segments() {
		// Arrange
		let segments: Vec<&str> = (0..35).map(|_| "seg").collect();
		let pattern = format!("/{}", segments.join("/"));

		// Act
		let result = RoutePattern::parse(&pattern);

		// Assert
		assert!(result.unwrap_err().to_string().contains("exceeding maximum"));
	}

	#[rstest]
	fn test_shape_erases_param_names() {
		let a = RoutePattern::parse("/secret/:id").unwrap();
		let b = RoutePattern::parse("/secret/:key").unwrap();
		let c = RoutePattern::parse(r"/secret/:id(\d+)").unwrap();

		assert_eq!(a.shape(), b.shape());
		assert_ne!(a.shape(), c.shape());
	}

	#[rstest]
	fn test_reverse() {
		let pattern = RoutePattern::parse("/secret/:id").unwrap();
		let params: RouteParams = [("id", "abc")].into_iter().collect();

		assert_eq!(pattern.reverse(&params), Ok("/secret/abc".to_string()));
		assert_eq!(
			pattern.reverse(&RouteParams::new()),
			Err(ReverseError::Missing("id".to_string()))
		);
		assert_eq!(
			RoutePattern::parse("/new").unwrap().reverse(&RouteParams::new()),
			Ok("/new".to_string())
		);
	}

	#[rstest]
	#[case("/secret/:id", "a/b")]
	#[case("/secret/:id", "a?b")]
	#[case("/secret/:id", "a#b")]
	#[case(r"/secret/:id(\d+)", "abc")]
	#[case("/docs/:rest(.*)*", "guide?x=1")]
	fn test_reverse_rejects_values_that_do_not_round_trip(
		#[case] pattern: &str,
		#[case] value: &str,
	) {
		// Arrange
		let pattern = RoutePattern::parse(pattern).unwrap();
		let name = if pattern.as_str().starts_with("/docs") { "rest" } else { "id" };
		let params: RouteParams = [(name, value)].into_iter().collect();

		// Act
		let result = pattern.reverse(&params);

		// Assert
		assert_eq!(
			result,
			Err(ReverseError::Invalid {
				name: name.to_string(),
				value: value.to_string(),
			})
		);
	}

	#[rstest]
	fn test_reverse_named_catch_all() {
		let pattern = RoutePattern::parse("/docs/:rest(.*)*").unwrap();
		let params: RouteParams = [("rest", "guide/intro")].into_iter().collect();

		assert_eq!(pattern.reverse(&params), Ok("/docs/guide/intro".to_string()));
	}

	#[rstest]
	fn test_pattern_display() {
		let pattern = RoutePattern::parse("/secret/:id").unwrap();
		assert_eq!(format!("{}", pattern), "/secret/:id");
	}
}
