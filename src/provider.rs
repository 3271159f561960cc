//! The provider contract and its built-in variants.
//!
//! A [`Provider`] is bound to one [`Configuration`] entry plus the shared [`Dependencies`]. It
//! exposes three capabilities to the login flow:
//!
//! - [`Provider::oauth2`] produces the deterministic [`ClientConfig`] used for the
//!   authorization-code exchange.
//! - [`Provider::auth_code_url_options`] decides extra authorization-URL parameters from the
//!   flow (forced re-authentication or not).
//! - [`Provider::claims`] enforces the configured scopes against the grant, fetches the user
//!   profile, and normalizes it into [`Claims`].
//!
//! Provider quirks live inside each variant; everything else in the flow is provider-agnostic.

pub mod discord;
pub mod github;
pub mod registry;

pub use discord::DiscordProvider;
pub use github::GitHubProvider;
pub use registry::ProviderRegistry;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	claims::Claims,
	config::{Configuration, ProviderKind},
	context::RequestContext,
	deps::Dependencies,
	error::ConfigError,
	http::{self, Profile},
	oauth::{ClientAuthMethod, ClientConfig, ProviderEndpoints, TokenExchange},
	obs::{self, Outcome, ProviderSpan, Stage},
	scope::{self, ScopeSet},
};

/// Boxed future returned by [`Provider::claims`].
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Query parameters of the provider callback request.
pub type QueryParams = BTreeMap<String, String>;

/// Extracts callback query parameters from a URL; later duplicates win.
pub fn query_params(url: &Url) -> QueryParams {
	url.query_pairs().into_owned().collect()
}

/// Login flow attributes a provider may react to.
pub trait FlowRequest {
	/// Whether the user must re-authenticate at the provider instead of reusing a session.
	fn is_forced(&self) -> bool {
		false
	}
}
impl FlowRequest for bool {
	fn is_forced(&self) -> bool {
		*self
	}
}

/// Values of the OAuth 2.0 `prompt` authorization parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Prompt {
	/// Always ask the user to approve the grant.
	Consent,
	/// Skip the approval screen when the user already authorized the client.
	None,
}
impl Prompt {
	/// Parameter value sent to the provider.
	pub const fn as_str(self) -> &'static str {
		match self {
			Prompt::Consent => "consent",
			Prompt::None => "none",
		}
	}

	/// Prompt matching the flow's re-authentication requirement.
	pub fn for_request(request: &dyn FlowRequest) -> Self {
		if request.is_forced() { Prompt::Consent } else { Prompt::None }
	}
}

/// `prompt` parameter for providers that support it.
pub fn prompt_params(request: &dyn FlowRequest) -> Vec<(String, String)> {
	vec![("prompt".into(), Prompt::for_request(request).as_str().into())]
}

/// Capabilities every identity provider variant implements.
///
/// Providers are stateless between calls and shared across concurrent logins as
/// `Arc<dyn Provider>`.
pub trait Provider
where
	Self: Send + Sync,
{
	/// Configuration entry the provider was built from.
	fn config(&self) -> &Configuration;

	/// Builds the OAuth 2.0 client configuration. Performs no network I/O.
	///
	/// Fails only when the redirect URI cannot be resolved.
	fn oauth2(&self, ctx: &RequestContext) -> Result<ClientConfig>;

	/// Extra authorization-URL parameters for the given flow.
	fn auth_code_url_options(&self, request: &dyn FlowRequest) -> Vec<(String, String)>;

	/// Enforces scopes, fetches the profile, and normalizes it.
	///
	/// No profile request is issued when the grant misses a configured scope.
	fn claims<'a>(
		&'a self,
		ctx: &'a RequestContext,
		exchange: &'a TokenExchange,
		query: &'a QueryParams,
	) -> ProviderFuture<'a, Claims>;
}

/// Checks that a configuration entry targets `expected` and is internally valid.
pub(crate) fn check_config(
	config: &Configuration,
	expected: ProviderKind,
) -> Result<(), ConfigError> {
	if config.provider != expected {
		return Err(ConfigError::KindMismatch {
			id: config.id.to_string(),
			configured: config.provider.as_str(),
			expected: expected.as_str(),
		});
	}

	config.validate()
}

/// Assembles the client configuration shared by every variant.
pub(crate) fn client_config(
	config: &Configuration,
	deps: &dyn Dependencies,
	ctx: &RequestContext,
	endpoints: &ProviderEndpoints,
	auth_method: ClientAuthMethod,
) -> Result<ClientConfig> {
	ProviderSpan::new(config.provider, Stage::OAuth2Client).in_scope(|| {
		let result = deps
			.redirect_uri_base(ctx)
			.and_then(|base| config.redirect_uri(&base))
			.map(|redirect_uri| ClientConfig {
				client_id: config.client_id.clone(),
				client_secret: config.client_secret.clone(),
				endpoints: endpoints.clone(),
				redirect_uri,
				scopes: config.scope.clone(),
				auth_method,
			})
			.map_err(Error::from);

		if let Err(e) = &result {
			obs::log_failure(config.provider, Stage::OAuth2Client, e);
		}

		result
	})
}

/// Runs the claims pipeline: scope enforcement, one profile request, then `normalize`.
///
/// `scope_delimiter` is the separator the provider uses in the token response `scope` field.
pub(crate) async fn fetch_claims<T, F>(
	config: &Configuration,
	deps: &dyn Dependencies,
	ctx: &RequestContext,
	exchange: &TokenExchange,
	scope_delimiter: char,
	profile_url: &Url,
	normalize: F,
) -> Result<Claims>
where
	T: DeserializeOwned + Send,
	F: FnOnce(Profile<T>) -> Claims + Send,
{
	let provider = config.provider;
	let span = ProviderSpan::new(provider, Stage::Claims);

	obs::record_claims_outcome(provider, Outcome::Attempt);

	let result = span
		.instrument(async move {
			let granted = ScopeSet::from_granted(&exchange.granted_scope(), scope_delimiter);

			scope::enforce(&config.scope, &granted)?;

			let profile = http::fetch_profile::<T>(
				deps.http_client(),
				ctx,
				profile_url,
				&exchange.access_token,
			)
			.await?;

			normalize(profile).require_subject().map_err(Error::from)
		})
		.await;

	obs::record_claims_outcome(provider, Outcome::of(&result));

	if let Err(e) = &result {
		obs::log_failure(provider, Stage::Claims, e);
	}

	result
}

/// Maps empty strings to `None`.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|value| !value.trim().is_empty())
}
