//! Canonical, provider-agnostic identity claims.

// crates.io
use serde::{Deserializer, Serializer};
use serde_json::Value;
// self
use crate::{_prelude::*, error::UpstreamError};

/// Identity attributes produced after a successful federated login.
///
/// `issuer` + `subject` identify the external account and stay stable across logins; every
/// other field is best-effort and may be absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
	/// Issuer of the identity (the provider's OAuth 2.0 base).
	pub issuer: String,
	/// Provider-stable identifier of the account.
	pub subject: String,
	/// Display name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Casual name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nickname: Option<String>,
	/// Handle the user prefers to be referred to by.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub preferred_username: Option<String>,
	/// Avatar URL.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub picture: Option<String>,
	/// Email address reported by the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Whether the provider attests that `email` is verified.
	#[serde(default)]
	pub email_verified: bool,
	/// Locale tag (e.g. `en-US`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub locale: Option<String>,
	/// Raw profile object as returned by the provider, for downstream mapping.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub raw_claims: BTreeMap<String, Value>,
}
impl Claims {
	/// Rejects claims whose subject is empty; every other field is optional.
	pub(crate) fn require_subject(self) -> Result<Self, UpstreamError> {
		if self.subject.trim().is_empty() { Err(UpstreamError::MissingSubject) } else { Ok(self) }
	}
}

/// Boolean that accepts the heterogeneous truthy/falsy encodings providers emit.
///
/// JSON booleans map directly; strings are matched case-insensitively against
/// `true`/`t`/`1`/`yes`/`y`/`on` and their negations; numbers are true when non-zero. Null,
/// absent, or unrecognized values are `false` so an unclear value never attests anything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ConvertibleBool(pub bool);
impl ConvertibleBool {
	/// Normalizes an arbitrary JSON value.
	pub fn from_value(value: &Value) -> Self {
		let truthy = match value {
			Value::Bool(flag) => *flag,
			Value::String(text) => parse_flag(text).unwrap_or(false),
			Value::Number(number) =>
				number.as_f64().map(|n| n != 0.0 && !n.is_nan()).unwrap_or(false),
			Value::Null | Value::Array(_) | Value::Object(_) => false,
		};

		Self(truthy)
	}

	/// Returns the normalized flag.
	pub fn get(self) -> bool {
		self.0
	}
}
impl From<bool> for ConvertibleBool {
	fn from(value: bool) -> Self {
		Self(value)
	}
}
impl From<ConvertibleBool> for bool {
	fn from(value: ConvertibleBool) -> Self {
		value.0
	}
}
impl Serialize for ConvertibleBool {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_bool(self.0)
	}
}
impl<'de> Deserialize<'de> for ConvertibleBool {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = Value::deserialize(deserializer)?;

		Ok(Self::from_value(&value))
	}
}

fn parse_flag(text: &str) -> Option<bool> {
	const TRUTHY: [&str; 6] = ["true", "t", "1", "yes", "y", "on"];
	const FALSY: [&str; 7] = ["false", "f", "0", "no", "n", "off", ""];

	let text = text.trim();

	if TRUTHY.iter().any(|candidate| text.eq_ignore_ascii_case(candidate)) {
		Some(true)
	} else if FALSY.iter().any(|candidate| text.eq_ignore_ascii_case(candidate)) {
		Some(false)
	} else {
		None
	}
}
