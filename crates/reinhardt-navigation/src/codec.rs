//! URL codec: query strings and path segments to typed key/value data.
//!
//! The wire format is what appears in the address bar, so it follows
//! `encodeURIComponent` byte for byte:
//!
//! - `a=1&b=true&c=null&d=hello%20world` parses to a number, a boolean,
//!   a null and a string.
//! - `tag[]=x&tag[]=y` accumulates into a list under `tag` and is written
//!   back with one `tag[]=` pair per element.
//! - Values with no wire form are omitted rather than written as `key=`.

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Ordered key/value data parsed from a query string or dynamic path segments.
pub type QueryMap = IndexMap<String, QueryValue>;

/// Characters left untouched by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'_')
	.remove(b'.')
	.remove(b'!')
	.remove(b'~')
	.remove(b'*')
	.remove(b'\'')
	.remove(b'(')
	.remove(b')');

/// Suffix marking a repeated (list-valued) query key.
const LIST_SUFFIX: &str = "[]";

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^-?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?$").expect("numeric pattern compiles")
});

/// A scalar (or list of scalars) carried in a query string or path segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
	/// The literal token `null`.
	Null,
	/// The literal tokens `true` / `false`.
	Bool(bool),
	/// Any numeric-looking token.
	Number(f64),
	/// Everything else, percent-decoded.
	String(String),
	/// Values accumulated from `key[]` pairs, in order of appearance.
	List(Vec<QueryValue>),
}

impl QueryValue {
	/// Returns the string payload, if this is a string.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}

	/// Returns the numeric payload, if this is a number.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Number(n) => Some(*n),
			_ => None,
		}
	}

	/// Returns the boolean payload, if this is a boolean.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	/// Returns the list elements, if this is a list.
	pub fn as_list(&self) -> Option<&[QueryValue]> {
		match self {
			Self::List(items) => Some(items),
			_ => None,
		}
	}

	/// Returns `true` for [`QueryValue::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}
}

fn format_number(n: f64) -> String {
	// `-0` has no sign on the wire.
	if n == 0.0 {
		"0".to_string()
	} else {
		n.to_string()
	}
}

impl fmt::Display for QueryValue {
	/// Writes the natural, unencoded form of the value.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => f.write_str("null"),
			Self::Bool(b) => write!(f, "{}", b),
			Self::Number(n) => f.write_str(&format_number(*n)),
			Self::String(s) => f.write_str(s),
			Self::List(items) => {
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						f.write_str(",")?;
					}
					write!(f, "{}", item)?;
				}
				Ok(())
			}
		}
	}
}

impl From<&str> for QueryValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for QueryValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<bool> for QueryValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<f64> for QueryValue {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl From<i32> for QueryValue {
	fn from(value: i32) -> Self {
		Self::Number(f64::from(value))
	}
}

impl From<u32> for QueryValue {
	fn from(value: u32) -> Self {
		Self::Number(f64::from(value))
	}
}

impl<T: Into<QueryValue>> From<Vec<T>> for QueryValue {
	fn from(values: Vec<T>) -> Self {
		Self::List(values.into_iter().map(Into::into).collect())
	}
}

impl PartialEq<&str> for QueryValue {
	fn eq(&self, other: &&str) -> bool {
		self.as_str() == Some(*other)
	}
}

impl PartialEq<f64> for QueryValue {
	fn eq(&self, other: &f64) -> bool {
		self.as_f64() == Some(*other)
	}
}

impl PartialEq<bool> for QueryValue {
	fn eq(&self, other: &bool) -> bool {
		self.as_bool() == Some(*other)
	}
}

/// Percent-encodes a string the way `encodeURIComponent` does.
pub fn encode_component(raw: &str) -> String {
	utf8_percent_encode(raw, URI_COMPONENT).to_string()
}

/// Percent-decodes a string; malformed UTF-8 sequences are replaced.
pub fn decode_component(raw: &str) -> String {
	percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Coerces a raw token into a typed value.
///
/// Numeric-looking tokens become numbers, `true`/`false`/`null` become
/// their typed equivalents, anything else is percent-decoded as a string.
pub fn parse_scalar(raw: &str) -> QueryValue {
	match raw {
		"true" => QueryValue::Bool(true),
		"false" => QueryValue::Bool(false),
		"null" => QueryValue::Null,
		_ if NUMERIC.is_match(raw) => raw
			.parse::<f64>()
			.map(QueryValue::Number)
			.unwrap_or_else(|_| QueryValue::String(raw.to_string())),
		_ => QueryValue::String(decode_component(raw)),
	}
}

/// Writes a scalar in its wire form.
///
/// Returns `None` for values that have no wire form (non-finite numbers
/// and nested lists); callers omit those entirely.
pub fn stringify_scalar(value: &QueryValue) -> Option<String> {
	match value {
		QueryValue::Null => Some("null".to_string()),
		QueryValue::Bool(b) => Some(b.to_string()),
		QueryValue::Number(n) if n.is_finite() => Some(format_number(*n)),
		QueryValue::Number(_) => None,
		QueryValue::String(s) => Some(encode_component(s)),
		QueryValue::List(_) => None,
	}
}

/// Parses a query string (with or without its leading `?`).
///
/// Returns `None` when the string carries no pairs at all.
pub fn parse_query(raw: &str) -> Option<QueryMap> {
	let raw = raw.strip_prefix('?').unwrap_or(raw);
	let mut map = QueryMap::new();

	for pair in raw.split('&').filter(|p| !p.is_empty()) {
		let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
		let key = decode_component(key);
		let value = parse_scalar(value);

		match key.strip_suffix(LIST_SUFFIX) {
			Some(base) => {
				let slot = map
					.entry(base.to_string())
					.or_insert_with(|| QueryValue::List(Vec::new()));
				match slot {
					QueryValue::List(items) => items.push(value),
					other => {
						let previous = std::mem::replace(other, QueryValue::Null);
						*other = QueryValue::List(vec![previous, value]);
					}
				}
			}
			None => {
				map.insert(key, value);
			}
		}
	}

	if map.is_empty() { None } else { Some(map) }
}

/// Writes a map back into a query string (without a leading `?`).
pub fn stringify_query(map: &QueryMap) -> String {
	let mut pairs = Vec::with_capacity(map.len());

	for (key, value) in map {
		let key = encode_component(key);
		match value {
			QueryValue::List(items) => {
				pairs.extend(
					items
						.iter()
						.filter_map(stringify_scalar)
						.map(|v| format!("{}{}={}", key, LIST_SUFFIX, v)),
				);
			}
			scalar => {
				if let Some(v) = stringify_scalar(scalar) {
					pairs.push(format!("{}={}", key, v));
				}
			}
		}
	}

	pairs.join("&")
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("42", QueryValue::Number(42.0))]
	#[case("-3.5", QueryValue::Number(-3.5))]
	#[case("1e3", QueryValue::Number(1000.0))]
	#[case("true", QueryValue::Bool(true))]
	#[case("false", QueryValue::Bool(false))]
	#[case("null", QueryValue::Null)]
	#[case("hello%20world", QueryValue::String("hello world".to_string()))]
	#[case("12abc", QueryValue::String("12abc".to_string()))]
	#[case("", QueryValue::String(String::new()))]
	fn test_parse_scalar(#[case] raw: &str, #[case] expected: QueryValue) {
		assert_eq!(parse_scalar(raw), expected);
	}

	#[rstest]
	#[case(QueryValue::Number(5.0), Some("5"))]
	#[case(QueryValue::Number(0.25), Some("0.25"))]
	#[case(QueryValue::Number(-0.0), Some("0"))]
	#[case(QueryValue::Bool(false), Some("false"))]
	#[case(QueryValue::Null, Some("null"))]
	#[case(QueryValue::String("a b&c".to_string()), Some("a%20b%26c"))]
	#[case(QueryValue::String("(it's)*!~".to_string()), Some("(it's)*!~"))]
	#[case(QueryValue::Number(f64::NAN), None)]
	#[case(QueryValue::List(vec![]), None)]
	fn test_stringify_scalar(#[case] value: QueryValue, #[case] expected: Option<&str>) {
		assert_eq!(stringify_scalar(&value).as_deref(), expected);
	}

	#[rstest]
	fn test_parse_query_mixed() {
		let map = parse_query("?page=2&draft=false&owner=null&q=rust%20lang").unwrap();

		assert_eq!(map["page"], 2.0);
		assert_eq!(map["draft"], false);
		assert!(map["owner"].is_null());
		assert_eq!(map["q"], "rust lang");
	}

	#[rstest]
	fn test_parse_query_list_keys() {
		let map = parse_query("tag[]=b&tag[]=a&tag[]=3").unwrap();

		assert_eq!(
			map["tag"],
			QueryValue::List(vec!["b".into(), "a".into(), QueryValue::Number(3.0)])
		);
	}

	#[rstest]
	fn test_parse_query_promotes_scalar_to_list() {
		let map = parse_query("x=1&x[]=2").unwrap();
		assert_eq!(map["x"], QueryValue::List(vec![1.into(), 2.into()]));
	}

	#[rstest]
	#[case("")]
	#[case("?")]
	#[case("&&")]
	fn test_parse_query_empty(#[case] raw: &str) {
		assert!(parse_query(raw).is_none());
	}

	#[rstest]
	fn test_parse_query_key_without_value() {
		let map = parse_query("flag&x=1").unwrap();
		assert_eq!(map["flag"], "");
		assert_eq!(map["x"], 1.0);
	}

	#[rstest]
	fn test_stringify_query_preserves_order_and_lists() {
		let mut map = QueryMap::new();
		map.insert("b".into(), 1.into());
		map.insert("tag".into(), vec!["x y", "z"].into());
		map.insert("skip".into(), QueryValue::Number(f64::INFINITY));
		map.insert("a".into(), QueryValue::Null);

		assert_eq!(stringify_query(&map), "b=1&tag[]=x%20y&tag[]=z&a=null");
	}

	#[rstest]
	fn test_stringify_query_encodes_keys() {
		let mut map = QueryMap::new();
		map.insert("sort by".into(), "name".into());
		assert_eq!(stringify_query(&map), "sort%20by=name");
	}

	#[rstest]
	fn test_display_is_unencoded() {
		assert_eq!(QueryValue::from("a b").to_string(), "a b");
		assert_eq!(QueryValue::Number(6.0).to_string(), "6");
		assert_eq!(QueryValue::from(vec![1, 2]).to_string(), "1,2");
	}
}
