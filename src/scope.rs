//! Scope modeling and grant enforcement.
//!
//! Configured scopes are an ordered list validated at startup; granted scopes arrive as a
//! delimited string from the token endpoint and are treated as an unordered set. Most
//! providers separate granted scopes with spaces; some (GitHub) use commas.

// std
use std::collections::BTreeSet;
// self
use crate::_prelude::*;

/// Errors emitted when validating configured scopes.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
	/// A scope appears more than once in an ordered scope list.
	#[error("Scope is listed more than once: {scope}.")]
	Duplicate {
		/// The repeated scope string.
		scope: String,
	},
}

/// Delimiter used by RFC 6749 token responses.
pub const SPACE_DELIMITER: char = ' ';

/// Deduplicated set of granted scopes.
///
/// Scopes are sorted so lookups stay independent of the order (and repetition) in which a
/// provider reported them.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ScopeSet {
	scopes: Arc<[String]>,
}
impl ScopeSet {
	/// Parses the scope string reported by a token endpoint.
	///
	/// Whitespace always separates scopes; `delimiter` adds the provider's own separator.
	/// Parsing never fails: empty fragments are skipped and repeated scopes are harmless.
	pub fn from_granted(granted: &str, delimiter: char) -> Self {
		let set = granted
			.split(|ch: char| ch.is_whitespace() || ch == delimiter)
			.filter(|scope| !scope.is_empty())
			.map(str::to_owned)
			.collect::<BTreeSet<_>>();

		Self { scopes: Arc::from(set.into_iter().collect::<Vec<_>>()) }
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	/// Returns true if no scopes are present.
	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	/// Returns true if the set contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.scopes.binary_search_by(|candidate| candidate.as_str().cmp(scope)).is_ok()
	}

	/// Returns the required scopes this set does not cover, preserving their order.
	pub fn missing<'a, I>(&self, required: I) -> Vec<String>
	where
		I: IntoIterator<Item = &'a String>,
	{
		required.into_iter().filter(|scope| !self.contains(scope)).cloned().collect()
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeSet").field(&self.scopes).finish()
	}
}

/// Validates an ordered list of configured scopes.
pub fn validate_required(scopes: &[String]) -> Result<(), ScopeValidationError> {
	let mut seen = BTreeSet::new();

	for scope in scopes {
		validate_entry(scope)?;

		if !seen.insert(scope.as_str()) {
			return Err(ScopeValidationError::Duplicate { scope: scope.clone() });
		}
	}

	Ok(())
}

/// Checks that `granted` covers every scope in `required`.
///
/// Runs before any profile request: providers may silently downgrade requested scopes, and
/// a profile fetched with an under-scoped token is incomplete or rejected.
pub fn enforce(required: &[String], granted: &ScopeSet) -> Result<()> {
	let missing = granted.missing(required);

	if missing.is_empty() { Ok(()) } else { Err(Error::ScopeMissing { missing }) }
}

fn validate_entry(scope: &str) -> Result<(), ScopeValidationError> {
	if scope.is_empty() {
		return Err(ScopeValidationError::Empty);
	}
	if scope.chars().any(char::is_whitespace) {
		return Err(ScopeValidationError::ContainsWhitespace { scope: scope.to_owned() });
	}

	Ok(())
}
