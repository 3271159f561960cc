//! Error types shared by providers, configuration, and transports.
//!
//! Provider operations only ever fail with [`Error`], which has exactly two kinds: the grant
//! lacks a required scope, or something upstream (transport, provider API, payload, redirect
//! resolution) went wrong. Startup-time problems are reported separately through
//! [`ConfigError`].

// self
use crate::{_prelude::*, scope::ScopeValidationError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical error returned by every provider operation.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The token grant does not cover every configured scope.
	///
	/// Treat this as an authentication failure; retrying the same grant cannot succeed.
	#[error("Token grant is missing the required scopes: {}.", .missing.join(", "))]
	ScopeMissing {
		/// Required scopes absent from the grant, in configuration order.
		missing: Vec<String>,
	},
	/// Upstream failure; the original cause is kept as the error source.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
}
impl Error {
	/// Returns true for [`Error::ScopeMissing`].
	pub fn is_scope_missing(&self) -> bool {
		matches!(self, Self::ScopeMissing { .. })
	}

	/// Returns the wrapped upstream failure, if any.
	pub fn as_upstream(&self) -> Option<&UpstreamError> {
		match self {
			Self::Upstream(e) => Some(e),
			Self::ScopeMissing { .. } => None,
		}
	}
}
impl From<RedirectError> for Error {
	fn from(e: RedirectError) -> Self {
		UpstreamError::from(e).into()
	}
}

/// Failures raised while talking to (or preparing to talk to) an identity provider.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The caller's deadline elapsed before the provider answered.
	#[error("Provider request was cancelled before it completed.")]
	Cancelled {
		/// Transport timeout error, absent when the deadline expired before dispatch.
		#[source]
		source: Option<BoxError>,
	},
	/// Provider API answered with a non-success status.
	#[error("Provider API responded with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body for diagnostics.
		body_preview: String,
	},
	/// Provider API returned a payload that does not match the expected profile shape.
	#[error("Provider API returned a malformed profile.")]
	Decode {
		/// Structured parsing failure, including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Profile did not carry a usable subject identifier.
	#[error("Provider profile is missing a subject identifier.")]
	MissingSubject,
	/// Redirect URI could not be resolved for the provider.
	#[error("Redirect URI could not be resolved.")]
	Redirect {
		/// Resolution failure.
		#[source]
		source: RedirectError,
	},
	/// Outbound HTTP request could not be constructed.
	#[error("Provider request could not be constructed.")]
	Request {
		/// Request builder failure.
		#[source]
		source: oauth2::http::Error,
	},
}
impl UpstreamError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport timeout as a cancellation.
	pub fn cancelled(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Cancelled { source: Some(Box::new(src)) }
	}

	/// Returns true when the failure came from an expired deadline or timeout.
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled { .. })
	}
}
impl From<RedirectError> for UpstreamError {
	fn from(source: RedirectError) -> Self {
		Self::Redirect { source }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for UpstreamError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::cancelled(e) } else { Self::network(e) }
	}
}

/// Redirect URI resolution failures.
#[derive(Debug, ThisError)]
pub enum RedirectError {
	/// The base URI cannot carry a path (e.g. `mailto:` or `data:` URLs).
	#[error("Redirect base `{base}` cannot carry a callback path.")]
	CannotBeABase {
		/// Offending base URI.
		base: String,
	},
	/// A custom resolver could not produce a base URI for the request.
	#[error("Redirect base could not be resolved: {reason}.")]
	Unresolved {
		/// Resolver-supplied reason.
		reason: String,
	},
}

/// Startup-time configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Configuration document could not be parsed.
	#[error("Configuration document is invalid at `{}`.", .source.path())]
	Parse {
		/// Structured parsing failure, including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Configuration document has trailing content after the JSON value.
	#[error("Configuration document has trailing content.")]
	TrailingContent {
		/// Underlying JSON error.
		#[source]
		source: serde_json::Error,
	},
	/// Two providers share the same identifier.
	#[error("Provider `{id}` is configured more than once.")]
	DuplicateProvider {
		/// Duplicated provider identifier.
		id: String,
	},
	/// Provider has no client identifier.
	#[error("Provider `{id}` has an empty client_id.")]
	MissingClientId {
		/// Provider identifier.
		id: String,
	},
	/// Provider requires a malformed scope.
	#[error("Provider `{id}` has an invalid scope list.")]
	InvalidScope {
		/// Provider identifier.
		id: String,
		/// Scope validation failure.
		#[source]
		source: ScopeValidationError,
	},
	/// Provider was constructed for a different provider kind.
	#[error("Provider `{id}` is configured as `{configured}` but was built as `{expected}`.")]
	KindMismatch {
		/// Provider identifier.
		id: String,
		/// Kind named in the configuration.
		configured: &'static str,
		/// Kind of the variant being constructed.
		expected: &'static str,
	},
	/// A provider endpoint URL is invalid.
	#[error("Provider endpoint URL is invalid.")]
	InvalidEndpoint(#[from] url::ParseError),
}
