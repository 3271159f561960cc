//! Cross-cutting dependencies injected into providers.

// self
use crate::{_prelude::*, context::RequestContext, error::RedirectError, http::ApiHttpClient};

/// Narrow accessor for the system-wide settings a provider needs.
///
/// Providers hold an `Arc<dyn Dependencies>` instead of a handle to the whole identity system,
/// which keeps them testable with small fakes.
pub trait Dependencies
where
	Self: Send + Sync,
{
	/// Public base URI callback paths are appended to.
	///
	/// Receives the request context so multi-tenant deployments can pick a base per request.
	fn redirect_uri_base(&self, ctx: &RequestContext) -> Result<Url, RedirectError>;

	/// HTTP client used for provider API calls.
	fn http_client(&self) -> &dyn ApiHttpClient;
}

/// Redirect base that can be swapped when configuration reloads.
#[derive(Debug)]
pub struct RedirectBase(RwLock<Url>);
impl RedirectBase {
	/// Creates a holder with the initial base.
	pub fn new(base: Url) -> Self {
		Self(RwLock::new(base))
	}

	/// Returns a copy of the current base.
	pub fn get(&self) -> Url {
		self.0.read().clone()
	}

	/// Replaces the base, returning the previous value.
	pub fn replace(&self, base: Url) -> Url {
		std::mem::replace(&mut *self.0.write(), base)
	}
}

/// Default [`Dependencies`] implementation backed by a reloadable base and a shared client.
pub struct FederationDeps {
	redirect_base: RedirectBase,
	http_client: Arc<dyn ApiHttpClient>,
}
impl FederationDeps {
	/// Creates dependencies from a redirect base and an HTTP client.
	pub fn new(redirect_uri_base: Url, http_client: Arc<dyn ApiHttpClient>) -> Self {
		Self { redirect_base: RedirectBase::new(redirect_uri_base), http_client }
	}

	/// Creates dependencies that call providers through a default reqwest client.
	#[cfg(feature = "reqwest")]
	pub fn with_reqwest(redirect_uri_base: Url) -> Self {
		Self::new(redirect_uri_base, Arc::new(crate::http::ReqwestHttpClient::default()))
	}

	/// Reloadable redirect base.
	pub fn redirect_base(&self) -> &RedirectBase {
		&self.redirect_base
	}
}
impl Dependencies for FederationDeps {
	fn redirect_uri_base(&self, _: &RequestContext) -> Result<Url, RedirectError> {
		Ok(self.redirect_base.get())
	}

	fn http_client(&self) -> &dyn ApiHttpClient {
		self.http_client.as_ref()
	}
}
impl Debug for FederationDeps {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FederationDeps")
			.field("redirect_base", &self.redirect_base)
			.finish_non_exhaustive()
	}
}
