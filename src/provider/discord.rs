//! Discord identity provider.
//!
//! Profiles come from `GET /users/@me`. Discord migrated from `name#1234` tags to unique
//! usernames; migrated accounts report the discriminator `"0"`, which affects both the
//! display name and the default avatar.

// self
use crate::{
	_prelude::*,
	claims::{Claims, ConvertibleBool},
	config::{Configuration, ProviderKind},
	context::RequestContext,
	deps::Dependencies,
	error::ConfigError,
	http::Profile,
	oauth::{ClientAuthMethod, ClientConfig, ProviderEndpoints, TokenExchange},
	provider::{self, FlowRequest, Provider, ProviderFuture, QueryParams},
	scope,
};

/// Issuer recorded on every Discord identity.
pub const ISSUER: &str = "https://discord.com/api/oauth2/";
/// Public REST API base.
pub const API_BASE: &str = "https://discord.com/api/";
/// Image CDN base.
pub const CDN_BASE: &str = "https://cdn.discordapp.com/";

/// Discord reports granted scopes space-delimited.
pub const SCOPE_DELIMITER: char = scope::SPACE_DELIMITER;

const MIGRATED_DISCRIMINATOR: &str = "0";

/// Discord variant of [`Provider`].
pub struct DiscordProvider {
	config: Configuration,
	deps: Arc<dyn Dependencies>,
	endpoints: ProviderEndpoints,
	user_endpoint: Url,
}
impl DiscordProvider {
	/// Builds the provider against the public Discord API.
	pub fn new(config: Configuration, deps: Arc<dyn Dependencies>) -> Result<Self, ConfigError> {
		Self::with_api_base(config, deps, Url::parse(API_BASE)?)
	}

	/// Builds the provider against a custom API base such as a proxy or a mock server.
	///
	/// `api_base` must end with `/`; endpoint paths are joined onto it.
	pub fn with_api_base(
		config: Configuration,
		deps: Arc<dyn Dependencies>,
		api_base: Url,
	) -> Result<Self, ConfigError> {
		provider::check_config(&config, ProviderKind::Discord)?;

		let endpoints = ProviderEndpoints {
			authorization: api_base.join("oauth2/authorize")?,
			token: api_base.join("oauth2/token")?,
		};
		let user_endpoint = api_base.join("users/@me")?;

		Ok(Self { config, deps, endpoints, user_endpoint })
	}

	/// Endpoint the profile is fetched from.
	pub fn user_endpoint(&self) -> &Url {
		&self.user_endpoint
	}
}
impl Provider for DiscordProvider {
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

	fn auth_code_url_options(&self, request: &dyn FlowRequest) -> Vec<(String, String)> {
		provider::prompt_params(request)
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
impl Debug for DiscordProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DiscordProvider")
			.field("config", &self.config)
			.field("endpoints", &self.endpoints)
			.field("user_endpoint", &self.user_endpoint)
			.finish_non_exhaustive()
	}
}

#[derive(Debug, Deserialize)]
struct DiscordUser {
	#[serde(default)]
	id: String,
	#[serde(default)]
	username: String,
	#[serde(default)]
	discriminator: Option<String>,
	#[serde(default)]
	avatar: Option<String>,
	#[serde(default)]
	email: Option<String>,
	#[serde(default)]
	verified: ConvertibleBool,
	#[serde(default)]
	locale: Option<String>,
}
impl DiscordUser {
	fn is_migrated(&self) -> bool {
		self.discriminator
			.as_deref()
			.is_none_or(|tag| tag.is_empty() || tag == MIGRATED_DISCRIMINATOR)
	}

	fn display_name(&self) -> String {
		match self.discriminator.as_deref() {
			Some(tag) if !self.is_migrated() => format!("{}#{tag}", self.username),
			_ => self.username.clone(),
		}
	}

	fn avatar_url(&self) -> String {
		match self.avatar.as_deref().filter(|hash| !hash.is_empty()) {
			Some(hash) => {
				let ext = if hash.starts_with("a_") { "gif" } else { "png" };

				format!("{CDN_BASE}avatars/{}/{hash}.{ext}", self.id)
			},
			None => format!("{CDN_BASE}embed/avatars/{}.png", self.default_avatar_index()),
		}
	}

	fn default_avatar_index(&self) -> u64 {
		if self.is_migrated() {
			self.id.parse::<u64>().map(|id| (id >> 22) % 6).unwrap_or(0)
		} else {
			self.discriminator
				.as_deref()
				.and_then(|tag| tag.parse::<u64>().ok())
				.map(|tag| tag % 5)
				.unwrap_or(0)
		}
	}
}

fn normalize(profile: Profile<DiscordUser>) -> Claims {
	let Profile { data: user, raw } = profile;
	let username = provider::non_empty(Some(user.username.clone()));
	let name = username.as_ref().map(|_| user.display_name());
	// CDN paths are keyed by the account id.
	let picture = (!user.id.is_empty()).then(|| user.avatar_url());

	Claims {
		issuer: ISSUER.into(),
		subject: user.id,
		name,
		nickname: username.clone(),
		preferred_username: username,
		picture,
		email: provider::non_empty(user.email),
		email_verified: user.verified.get(),
		locale: provider::non_empty(user.locale),
		raw_claims: raw,
	}
}
