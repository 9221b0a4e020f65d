//! Path parameters and the typed props handed to views.
//!
//! A match binds parameters as plain strings ([`RouteParams`]). Routes that
//! expose their parameters pass them to the view as [`ViewProps`], which
//! offers typed access so views never re-parse the path themselves.

use crate::error::PathError;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::str::FromStr;

/// Parameters bound by a match, in the order the pattern declares them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteParams(IndexMap<String, String>);

impl RouteParams {
	/// Creates an empty parameter mapping.
	pub fn new() -> Self {
		Self(IndexMap::new())
	}

	/// Binds `name` to `value`, replacing any earlier binding.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.0.insert(name.into(), value.into());
	}

	/// Returns the raw value bound to `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.get(name).map(String::as_str)
	}

	/// Returns whether `name` is bound.
	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	/// Returns the number of bound parameters.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns whether no parameters are bound.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over `(name, value)` pairs in declaration order.
	pub fn iter(&self) -> indexmap::map::Iter<'_, String, String> {
		self.0.iter()
	}

	/// Parses the value bound to `name`.
	///
	/// # Errors
	///
	/// Returns [`PathError::Missing`] if `name` is unbound and
	/// [`PathError::ParseError`] if the value does not parse as `T`.
	pub fn parse<T>(&self, name: &str) -> Result<T, PathError>
	where
		T: FromStr,
		T::Err: std::fmt::Display,
	{
		let raw = self
			.get(name)
			.ok_or_else(|| PathError::Missing(name.to_string()))?;
		raw.parse::<T>().map_err(|e| PathError::ParseError {
			name: name.to_string(),
			param_type: std::any::type_name::<T>(),
			raw_value: raw.to_string(),
			reason: e.to_string(),
		})
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteParams {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		)
	}
}

impl<'a> IntoIterator for &'a RouteParams {
	type Item = (&'a String, &'a String);
	type IntoIter = indexmap::map::Iter<'a, String, String>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

/// Input a view receives when it is activated.
///
/// Empty unless the route was registered with
/// [`with_props`](crate::route::RouteDefinition::with_props).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewProps {
	params: RouteParams,
}

impl ViewProps {
	/// Wraps the parameters of a match.
	pub fn new(params: RouteParams) -> Self {
		Self { params }
	}

	/// Props carrying nothing.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Returns the underlying parameters.
	pub fn params(&self) -> &RouteParams {
		&self.params
	}

	/// Returns whether no props were passed.
	pub fn is_empty(&self) -> bool {
		self.params.is_empty()
	}

	/// Returns a single typed prop.
	///
	/// # Errors
	///
	/// See [`RouteParams::parse`].
	pub fn get<T>(&self, name: &str) -> Result<T, PathError>
	where
		T: FromStr,
		T::Err: std::fmt::Display,
	{
		self.params.parse(name)
	}

	/// Deserializes all props into a struct.
	///
	/// Field values are parsed from their string form, so numeric and boolean
	/// fields work as well as strings.
	///
	/// ```
	/// use serde::Deserialize;
	/// use snapsecret_router::{RouteParams, ViewProps};
	///
	/// #[derive(Deserialize)]
	/// struct SecretProps {
	///     id: String,
	/// }
	///
	/// let params: RouteParams = [("id", "xyz789")].into_iter().collect();
	/// let props: SecretProps = ViewProps::new(params).extract().unwrap();
	/// assert_eq!(props.id, "xyz789");
	/// ```
	///
	/// # Errors
	///
	/// Returns [`PathError::Deserialize`] if a field is missing or does not
	/// parse.
	pub fn extract<T: DeserializeOwned>(&self) -> Result<T, PathError> {
		let pairs: Vec<(&str, &str)> = self
			.params
			.iter()
			.map(|(k, v)| (k.as_str(), v.as_str()))
			.collect();
		let encoded = serde_urlencoded::to_string(&pairs)
			.map_err(|e| PathError::Deserialize(e.to_string()))?;
		serde_urlencoded::from_str(&encoded).map_err(|e| PathError::Deserialize(e.to_string()))
	}

	/// Extracts props positionally, see [`FromProps`].
	///
	/// # Errors
	///
	/// Returns [`PathError::CountMismatch`] or [`PathError::ParseError`].
	pub fn positional<T: FromProps>(&self) -> Result<T, PathError> {
		T::from_props(self)
	}
}

/// Single positional prop extractor.
///
/// ```
/// use snapsecret_router::{Path, RouteParams, ViewProps};
///
/// let params: RouteParams = [("id", "42")].into_iter().collect();
/// let Path(id) = ViewProps::new(params).positional::<Path<u64>>().unwrap();
/// assert_eq!(id, 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path<T>(pub T);

impl<T> Path<T> {
	/// Unwraps the inner value.
	pub fn into_inner(self) -> T {
		self.0
	}
}

impl<T> Deref for Path<T> {
	type Target = T;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Types that can be built from props by position.
pub trait FromProps: Sized {
	/// Extracts `Self` from the props.
	///
	/// # Errors
	///
	/// Returns [`PathError::CountMismatch`] if the number of props doesn't
	/// match and [`PathError::ParseError`] if a value fails to parse.
	fn from_props(props: &ViewProps) -> Result<Self, PathError>;
}

fn parse_at<T>(props: &ViewProps, index: usize) -> Result<T, PathError>
where
	T: FromStr,
	T::Err: std::fmt::Display,
{
	let (name, raw) = props
		.params
		.0
		.get_index(index)
		.ok_or(PathError::CountMismatch {
			expected: index + 1,
			actual: props.params.len(),
		})?;
	raw.parse::<T>().map_err(|e| PathError::ParseError {
		name: name.clone(),
		param_type: std::any::type_name::<T>(),
		raw_value: raw.clone(),
		reason: e.to_string(),
	})
}

fn expect_count(props: &ViewProps, expected: usize) -> Result<(), PathError> {
	if props.params.len() != expected {
		return Err(PathError::CountMismatch {
			expected,
			actual: props.params.len(),
		});
	}
	Ok(())
}

impl<T> FromProps for Path<T>
where
	T: FromStr,
	T::Err: std::fmt::Display,
{
	fn from_props(props: &ViewProps) -> Result<Self, PathError> {
		expect_count(props, 1)?;
		parse_at(props, 0).map(Path)
	}
}

macro_rules! impl_from_props_for_tuple {
	($count:expr; $($ty:ident => $idx:tt),+) => {
		impl<$($ty),+> FromProps for ($(Path<$ty>,)+)
		where
			$($ty: FromStr, $ty::Err: std::fmt::Display,)+
		{
			fn from_props(props: &ViewProps) -> Result<Self, PathError> {
				expect_count(props, $count)?;
				Ok(($(Path(parse_at::<$ty>(props, $idx)?),)+))
			}
		}
	};
}

impl_from_props_for_tuple!(2; T1 => 0, T2 => 1);
impl_from_props_for_tuple!(3; T1 => 0, T2 => 1, T3 => 2);
