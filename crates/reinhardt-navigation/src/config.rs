//! Router options.
//!
//! ```toml
//! mode = "history"
//! hash_prefix = "#!"
//! not_found = "/404"
//! mount = "#app"
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Which navigation mode the router should be wired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
	/// URL kept in the fragment.
	#[default]
	Hash,
	/// URL kept in the path through the History API.
	History,
}

/// Static router configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterOptions {
	/// Navigation mode.
	#[serde(default)]
	pub mode: ModeKind,
	/// Fragment prefix used by hash mode.
	#[serde(default = "default_hash_prefix")]
	pub hash_prefix: String,
	/// Path of the catch-all route unmatched URLs fall back to.
	#[serde(default = "default_not_found")]
	pub not_found: String,
	/// Mount target handed to the view host on start.
	#[serde(default)]
	pub mount: Option<String>,
}

fn default_hash_prefix() -> String {
	"#!".to_string()
}

fn default_not_found() -> String {
	"/404".to_string()
}

impl Default for RouterOptions {
	fn default() -> Self {
		Self {
			mode: ModeKind::default(),
			hash_prefix: default_hash_prefix(),
			not_found: default_not_found(),
			mount: None,
		}
	}
}

impl RouterOptions {
	/// Default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses options from a TOML document; missing keys take defaults.
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}

	/// Parses options from a JSON document; missing keys take defaults.
	pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(source)?)
	}

	/// Sets the navigation mode.
	pub fn mode(mut self, mode: ModeKind) -> Self {
		self.mode = mode;
		self
	}

	/// Sets the hash-mode fragment prefix.
	pub fn hash_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.hash_prefix = prefix.into();
		self
	}

	/// Sets the not-found path.
	pub fn not_found(mut self, path: impl Into<String>) -> Self {
		self.not_found = path.into();
		self
	}

	/// Sets the mount target.
	pub fn mount(mut self, target: impl Into<String>) -> Self {
		self.mount = Some(target.into());
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let options = RouterOptions::default();

		assert_eq!(options.mode, ModeKind::Hash);
		assert_eq!(options.hash_prefix, "#!");
		assert_eq!(options.not_found, "/404");
		assert_eq!(options.mount, None);
	}

	#[rstest]
	fn test_from_toml() {
		let options = RouterOptions::from_toml_str(
			r##"
mode = "history"
mount = "#app"
"##,
		)
		.unwrap();

		assert_eq!(options.mode, ModeKind::History);
		assert_eq!(options.mount.as_deref(), Some("#app"));
		assert_eq!(options.not_found, "/404");
	}

	#[rstest]
	fn test_from_json() {
		let options = RouterOptions::from_json_str(r##"{"not_found": "/missing", "hash_prefix": "#"}"##).unwrap();

		assert_eq!(options, RouterOptions::new().not_found("/missing").hash_prefix("#"));
	}

	#[rstest]
	#[case::bad_mode("mode = \"pushstate\"")]
	#[case::bad_type("not_found = 404")]
	fn test_invalid_toml(#[case] source: &str) {
		assert!(matches!(
			RouterOptions::from_toml_str(source),
			Err(ConfigError::Toml(_))
		));
	}

	#[rstest]
	fn test_invalid_json() {
		assert!(matches!(
			RouterOptions::from_json_str("{"),
			Err(ConfigError::Json(_))
		));
	}

	#[rstest]
	fn test_serialize_round_trip() {
		let options = RouterOptions::new().mode(ModeKind::History).mount("#root");
		let text = toml::to_string(&options).unwrap();

		assert!(text.contains("mode = \"history\""));
		assert_eq!(RouterOptions::from_toml_str(&text).unwrap(), options);
	}
}
