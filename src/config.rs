//! Per-provider configuration and the federation-wide configuration document.
//!
//! Configuration is loaded once at startup, validated, and shared read-only afterwards. The
//! document shape is:
//!
//! ```json
//! {
//!   "redirect_uri_base": "https://id.example.com/",
//!   "providers": [
//!     {
//!       "id": "discord",
//!       "provider": "discord",
//!       "client_id": "1234",
//!       "client_secret": "s3cr3t",
//!       "scope": ["identify", "email"]
//!     }
//!   ]
//! }
//! ```

pub mod id;

pub use id::*;

// std
use std::collections::BTreeSet;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, RedirectError},
	scope,
	secret::Secret,
};

/// Path segments appended to the redirect base, followed by the provider identifier.
pub const CALLBACK_PATH: [&str; 4] = ["self-service", "methods", "oidc", "callback"];

/// External identity providers with a built-in variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
	/// Discord (`discord.com`).
	Discord,
	/// GitHub (`github.com`).
	#[serde(rename = "github")]
	GitHub,
}
impl ProviderKind {
	/// Returns the configuration label of the provider kind.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderKind::Discord => "discord",
			ProviderKind::GitHub => "github",
		}
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Static settings for one configured identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
	/// Identifier of this provider entry; also the last path segment of its callback URL.
	pub id: ProviderId,
	/// Which provider variant serves this entry.
	pub provider: ProviderKind,
	/// Human-readable label for login screens.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	/// OAuth 2.0 client identifier issued by the provider.
	pub client_id: String,
	/// OAuth 2.0 client secret issued by the provider.
	pub client_secret: Secret,
	/// Scopes requested at authorization and required in the grant, in request order.
	#[serde(default)]
	pub scope: Vec<String>,
}
impl Configuration {
	/// Creates a configuration without scopes or label.
	pub fn new(
		id: ProviderId,
		provider: ProviderKind,
		client_id: impl Into<String>,
		client_secret: impl Into<Secret>,
	) -> Self {
		Self {
			id,
			provider,
			label: None,
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			scope: Vec::new(),
		}
	}

	/// Replaces the required scopes.
	pub fn with_scope<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scope = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Sets the display label.
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());

		self
	}

	/// Maps the deployment's redirect base onto this provider's callback URL.
	///
	/// The result is `<base>/self-service/methods/oidc/callback/<id>`. It depends only on the
	/// base and the provider identifier, so URLs registered with the provider stay valid.
	pub fn redirect_uri(&self, base: &Url) -> Result<Url, RedirectError> {
		let mut url = base.clone();

		url.path_segments_mut()
			.map_err(|_| RedirectError::CannotBeABase { base: base.to_string() })?
			.pop_if_empty()
			.extend(CALLBACK_PATH)
			.push(&self.id);

		Ok(url)
	}

	/// Validates the entry in isolation.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::MissingClientId { id: self.id.to_string() });
		}

		scope::validate_required(&self.scope)
			.map_err(|source| ConfigError::InvalidScope { id: self.id.to_string(), source })
	}
}

/// Federation-wide configuration document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederationConfig {
	/// Public base URI that callback paths are appended to.
	pub redirect_uri_base: Url,
	/// Configured providers.
	#[serde(default)]
	pub providers: Vec<Configuration>,
}
impl FederationConfig {
	/// Parses and validates a JSON configuration document.
	pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(json);

		Self::from_deserializer(&mut de)
	}

	/// Parses and validates a JSON configuration document from raw bytes.
	pub fn from_json_slice(json: &[u8]) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_slice(json);

		Self::from_deserializer(&mut de)
	}

	/// Looks up a provider entry by identifier.
	pub fn provider(&self, id: &str) -> Option<&Configuration> {
		self.providers.iter().find(|config| config.id.as_ref() == id)
	}

	/// Validates every entry and rejects duplicate provider identifiers.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let mut seen = BTreeSet::new();

		for config in &self.providers {
			config.validate()?;

			if !seen.insert(config.id.as_ref()) {
				return Err(ConfigError::DuplicateProvider { id: config.id.to_string() });
			}
		}

		Ok(())
	}

	fn from_deserializer<'de, R>(de: &mut serde_json::Deserializer<R>) -> Result<Self, ConfigError>
	where
		R: serde_json::de::Read<'de>,
	{
		let config: Self = serde_path_to_error::deserialize(&mut *de)
			.map_err(|source| ConfigError::Parse { source })?;

		de.end().map_err(|source| ConfigError::TrailingContent { source })?;
		config.validate()?;

		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn discord() -> Configuration {
		let id = ProviderId::new("discord").expect("Provider identifier fixture should be valid.");

		Configuration::new(id, ProviderKind::Discord, "client", "secret")
			.with_scope(["identify", "email"])
	}

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Test URL should parse.")
	}

	#[test]
	fn redirect_uri_appends_callback_path() {
		let config = discord();

		assert_eq!(
			config.redirect_uri(&url("https://id.example.com")).map(String::from).ok(),
			Some("https://id.example.com/self-service/methods/oidc/callback/discord".into())
		);
		assert_eq!(
			config.redirect_uri(&url("https://id.example.com/base/")).map(String::from).ok(),
			Some("https://id.example.com/base/self-service/methods/oidc/callback/discord".into())
		);
	}

	#[test]
	fn redirect_uri_is_stable() {
		let config = discord();
		let base = url("https://id.example.com/");
		let first = config.redirect_uri(&base).expect("Redirect URI should resolve.");
		let second = config.redirect_uri(&base).expect("Redirect URI should resolve again.");

		assert_eq!(first, second);
	}

	#[test]
	fn redirect_uri_rejects_opaque_bases() {
		let err = discord()
			.redirect_uri(&url("mailto:admin@example.com"))
			.expect_err("Opaque bases cannot carry a path.");

		assert!(matches!(err, RedirectError::CannotBeABase { .. }));
	}

	#[test]
	fn validation_rejects_empty_client_id_and_bad_scopes() {
		let mut config = discord();

		assert!(config.validate().is_ok());

		config.client_id = " ".into();

		assert!(matches!(config.validate(), Err(ConfigError::MissingClientId { .. })));

		let config = discord().with_scope(["email", "email"]);

		assert!(matches!(config.validate(), Err(ConfigError::InvalidScope { .. })));
	}

	#[test]
	fn document_parses_and_redacts_secret() {
		let config = FederationConfig::from_json_str(
			r#"{
				"redirect_uri_base": "https://id.example.com/",
				"providers": [
					{
						"id": "discord",
						"provider": "discord",
						"label": "Discord",
						"client_id": "1234",
						"client_secret": "s3cr3t",
						"scope": ["identify", "email"]
					},
					{ "id": "gh", "provider": "github", "client_id": "abcd", "client_secret": "x" }
				]
			}"#,
		)
		.expect("Configuration document should parse.");

		assert_eq!(config.providers.len(), 2);

		let discord = config.provider("discord").expect("Discord entry should be present.");

		assert_eq!(discord.provider, ProviderKind::Discord);
		assert_eq!(discord.scope, vec!["identify", "email"]);
		assert_eq!(discord.client_secret.expose(), "s3cr3t");
		assert!(!format!("{discord:?}").contains("s3cr3t"));
		assert_eq!(
			config.provider("gh").map(|entry| entry.provider),
			Some(ProviderKind::GitHub)
		);
		assert!(config.provider("gitlab").is_none());
	}

	#[test]
	fn document_errors_report_the_failing_path() {
		let err = FederationConfig::from_json_str(
			r#"{"redirect_uri_base":"https://id.example.com/","providers":[{"id":"x","provider":"myspace","client_id":"a","client_secret":"b"}]}"#,
		)
		.expect_err("Unknown provider kinds must be rejected.");

		match err {
			ConfigError::Parse { source } =>
				assert_eq!(source.path().to_string(), "providers[0].provider"),
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[test]
	fn document_rejects_duplicates_and_trailing_content() {
		let entry = r#"{"id":"d","provider":"discord","client_id":"a","client_secret":"b"}"#;
		let duplicated = format!(
			r#"{{"redirect_uri_base":"https://id.example.com/","providers":[{entry},{entry}]}}"#
		);

		assert!(matches!(
			FederationConfig::from_json_str(&duplicated),
			Err(ConfigError::DuplicateProvider { .. })
		));
		assert!(matches!(
			FederationConfig::from_json_slice(br#"{"redirect_uri_base":"https://a.example/"} {}"#),
			Err(ConfigError::TrailingContent { .. })
		));
	}
}
