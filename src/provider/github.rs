//! GitHub identity provider.
//!
//! GitHub has no `prompt` parameter; the authorization page always reuses the browser session,
//! so [`Provider::auth_code_url_options`] returns nothing for this variant. Its token endpoint
//! also separates granted scopes with commas instead of spaces.

// self
use crate::{
	_prelude::*,
	claims::Claims,
	config::{Configuration, ProviderKind},
	context::RequestContext,
	deps::Dependencies,
	error::ConfigError,
	http::Profile,
	oauth::{ClientAuthMethod, ClientConfig, ProviderEndpoints, TokenExchange},
	provider::{self, FlowRequest, Provider, ProviderFuture, QueryParams},
};

/// Issuer recorded on every GitHub identity.
pub const ISSUER: &str = "https://github.com/login/oauth";
/// Base of the OAuth 2.0 endpoints.
pub const OAUTH_BASE: &str = "https://github.com/login/oauth/";
/// Public REST API base.
pub const API_BASE: &str = "https://api.github.com/";

/// GitHub reports granted scopes comma-delimited (`read:user,user:email`).
pub const SCOPE_DELIMITER: char = ',';

/// GitHub variant of [`Provider`].
pub struct GitHubProvider {
	config: Configuration,
	deps: Arc<dyn Dependencies>,
	endpoints: ProviderEndpoints,
	user_endpoint: Url,
}
impl GitHubProvider {
	/// Builds the provider against github.com.
	pub fn new(config: Configuration, deps: Arc<dyn Dependencies>) -> Result<Self, ConfigError> {
		Self::with_base_urls(config, deps, Url::parse(OAUTH_BASE)?, Url::parse(API_BASE)?)
	}

	/// Builds the provider against custom bases, e.g. GitHub Enterprise or a mock server.
	///
	/// Both bases must end with `/`.
	pub fn with_base_urls(
		config: Configuration,
		deps: Arc<dyn Dependencies>,
		oauth_base: Url,
		api_base: Url,
	) -> Result<Self, ConfigError> {
		provider::check_config(&config, ProviderKind::GitHub)?;

		let endpoints = ProviderEndpoints {
			authorization: oauth_base.join("authorize")?,
			token: oauth_base.join("access_token")?,
		};
		let user_endpoint = api_base.join("user")?;

		Ok(Self { config, deps, endpoints, user_endpoint })
	}
}
impl Provider for GitHubProvider {
	fn config(&self) -> &Configuration {
		&self.config
	}

	fn oauth2(&self, ctx: &RequestContext) -> Result<ClientConfig> {
		provider::client_config(
			&self.config,
			self.deps.as_ref(),
			ctx,
			&self.endpoints,
			ClientAuthMethod::ClientSecretPost,
		)
	}

	fn auth_code_url_options(&self, _: &dyn FlowRequest) -> Vec<(String, String)> {
		Vec::new()
	}

	fn claims<'a>(
		&'a self,
		ctx: &'a RequestContext,
		exchange: &'a TokenExchange,
		_: &'a QueryParams,
	) -> ProviderFuture<'a, Claims> {
		Box::pin(provider::fetch_claims(
			&self.config,
			self.deps.as_ref(),
			ctx,
			exchange,
			SCOPE_DELIMITER,
			&self.user_endpoint,
			normalize,
		))
	}
}
impl Debug for GitHubProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GitHubProvider")
			.field("config", &self.config)
			.field("endpoints", &self.endpoints)
			.field("user_endpoint", &self.user_endpoint)
			.finish_non_exhaustive()
	}
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
	#[serde(default)]
	id: Option<u64>,
	#[serde(default)]
	login: Option<String>,
	#[serde(default)]
	name: Option<String>,
	#[serde(default)]
	avatar_url: Option<String>,
	#[serde(default)]
	email: Option<String>,
}

// `/user` exposes only the public email and never attests verification.
fn normalize(profile: Profile<GitHubUser>) -> Claims {
	let Profile { data: user, raw } = profile;
	let login = provider::non_empty(user.login);

	Claims {
		issuer: ISSUER.into(),
		subject: user.id.map(|id| id.to_string()).unwrap_or_default(),
		name: provider::non_empty(user.name),
		nickname: login.clone(),
		preferred_username: login,
		picture: provider::non_empty(user.avatar_url),
		email: provider::non_empty(user.email),
		email_verified: false,
		locale: None,
		raw_claims: raw,
	}
}
