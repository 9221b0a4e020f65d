//! Built-in route profiles.

use crate::error::SettingsError;
use std::fmt;
use std::str::FromStr;

const FULL: &str = include_str!("../routes/full.toml");
const REDUCED: &str = include_str!("../routes/reduced.toml");

/// A route table shipped with the crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RouteProfile {
	/// Home, new secret, new file secret, secret by id, `/404` and a catch-all.
	#[default]
	Full,
	/// Home, new secret and secret by id. Unknown paths use the built-in
	/// not-found route.
	Reduced,
}

impl RouteProfile {
	/// All built-in profiles.
	pub const ALL: [RouteProfile; 2] = [RouteProfile::Full, RouteProfile::Reduced];

	/// Returns the profile's TOML source.
	pub fn source(self) -> &'static str {
		match self {
			RouteProfile::Full => FULL,
			RouteProfile::Reduced => REDUCED,
		}
	}

	/// Returns the profile's name.
	pub fn as_str(self) -> &'static str {
		match self {
			RouteProfile::Full => "full",
			RouteProfile::Reduced => "reduced",
		}
	}
}

impl fmt::Display for RouteProfile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for RouteProfile {
	type Err = SettingsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"full" => Ok(RouteProfile::Full),
			"reduced" => Ok(RouteProfile::Reduced),
			_ => Err(SettingsError::UnknownProfile(s.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("full", RouteProfile::Full)]
	#[case("Reduced", RouteProfile::Reduced)]
	#[case(" full ", RouteProfile::Full)]
	fn test_parse_profile(#[case] input: &str, #[case] expected: RouteProfile) {
		assert_eq!(input.parse::<RouteProfile>().unwrap(), expected);
	}

	#[rstest]
	fn test_unknown_profile() {
		let err = "minimal".parse::<RouteProfile>().unwrap_err();
		assert!(matches!(err, SettingsError::UnknownProfile(ref name) if name == "minimal"));
	}

	#[rstest]
	fn test_display_round_trips() {
		for profile in RouteProfile::ALL {
			assert_eq!(profile.to_string().parse::<RouteProfile>().unwrap(), profile);
		}
	}
}
