//! OAuth 2.0 client configuration and token exchange results.
//!
//! Providers describe *how* to talk to them through a [`ClientConfig`]; the login flow turns it
//! into an `oauth2` client, sends the user to the authorization URL, exchanges the code, and
//! wraps the token response in a [`TokenExchange`] for claims retrieval.

pub use oauth2;

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use oauth2::{
	AuthType, AuthUrl, ClientId, ClientSecret, EndpointNotSet, EndpointSet, RedirectUrl,
	TokenResponse, TokenUrl, basic::BasicClient,
};
use rand::{Rng, distr::Alphanumeric};
use serde_json::Value;
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, secret::Secret};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// `oauth2` client with authorization and token endpoints set.
pub type ConfiguredClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Authorization and token endpoints of a provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProviderEndpoints {
	/// Authorization endpoint the user agent is redirected to.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
}

/// Deterministic OAuth 2.0 client configuration produced by a provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: Secret,
	/// Provider endpoints.
	pub endpoints: ProviderEndpoints,
	/// Callback URL registered with the provider.
	pub redirect_uri: Url,
	/// Scopes to request, in configured order.
	pub scopes: Vec<String>,
	/// How the client authenticates at the token endpoint.
	pub auth_method: ClientAuthMethod,
}
impl ClientConfig {
	/// Builds an `oauth2` client ready for `exchange_code`.
	pub fn basic_client(&self) -> ConfiguredClient {
		let client = BasicClient::new(ClientId::new(self.client_id.clone()))
			.set_client_secret(ClientSecret::new(self.client_secret.expose().to_owned()))
			.set_auth_uri(AuthUrl::from_url(self.endpoints.authorization.clone()))
			.set_token_uri(TokenUrl::from_url(self.endpoints.token.clone()))
			.set_redirect_uri(RedirectUrl::from_url(self.redirect_uri.clone()));

		match self.auth_method {
			ClientAuthMethod::ClientSecretBasic => client,
			ClientAuthMethod::ClientSecretPost => client.set_auth_type(AuthType::RequestBody),
		}
	}

	/// Starts an authorization request with a fresh state and PKCE (S256) pair.
	///
	/// `extra_params` (usually from `Provider::auth_code_url_options`) are appended after the
	/// standard parameters in the given order.
	pub fn authorize(&self, extra_params: &[(String, String)]) -> AuthorizationRequest {
		let state = random_string(STATE_LEN);
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
		let mut url = self.endpoints.authorization.clone();

		{
			let mut query = url.query_pairs_mut();

			query
				.append_pair("response_type", "code")
				.append_pair("client_id", &self.client_id)
				.append_pair("redirect_uri", self.redirect_uri.as_str());

			if !self.scopes.is_empty() {
				query.append_pair("scope", &self.scopes.join(" "));
			}

			query
				.append_pair("state", &state)
				.append_pair("code_challenge", &challenge)
				.append_pair("code_challenge_method", "S256");

			for (key, value) in extra_params {
				query.append_pair(key, value);
			}
		}

		AuthorizationRequest { url, state, pkce_verifier: Secret::new(verifier) }
	}
}

/// Authorization redirect prepared by [`ClientConfig::authorize`].
#[derive(Clone, Debug)]
pub struct AuthorizationRequest {
	/// URL the user agent must be sent to.
	pub url: Url,
	/// Opaque state value that must round-trip via the callback.
	pub state: String,
	pkce_verifier: Secret,
}
impl AuthorizationRequest {
	/// PKCE verifier to send with the code exchange. Callers must avoid logging this string.
	pub fn pkce_verifier(&self) -> &str {
		self.pkce_verifier.expose()
	}

	/// Returns true when the callback's `state` matches the one issued.
	pub fn validate_state(&self, returned_state: &str) -> bool {
		returned_state == self.state
	}
}

/// Token exchange result handed to claims retrieval.
///
/// Holds the access token and any extra fields the token endpoint returned. Only the `scope`
/// field is interpreted here; providers may read others through [`TokenExchange::extra`].
#[derive(Clone, Debug, PartialEq)]
pub struct TokenExchange {
	/// Bearer access token.
	pub access_token: Secret,
	/// Extra token-response fields keyed by name.
	pub extra: BTreeMap<String, Value>,
}
impl TokenExchange {
	/// Creates a result carrying only an access token.
	pub fn new(access_token: impl Into<Secret>) -> Self {
		Self { access_token: access_token.into(), extra: BTreeMap::new() }
	}

	/// Adds or replaces an extra field.
	pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.extra.insert(key.into(), value.into());

		self
	}

	/// Sets the granted scope string.
	pub fn with_scope(self, granted: impl Into<String>) -> Self {
		self.with_extra("scope", granted.into())
	}

	/// Builds a result from an `oauth2` token response.
	pub fn from_token_response<R>(response: &R) -> Self
	where
		R: TokenResponse,
	{
		let exchange = Self::new(response.access_token().secret().to_owned());

		match response.scopes() {
			Some(scopes) => exchange.with_scope(
				scopes.iter().map(|scope| scope.as_str()).collect::<Vec<_>>().join(" "),
			),
			None => exchange,
		}
	}

	/// Returns an extra field by name.
	pub fn extra(&self, key: &str) -> Option<&Value> {
		self.extra.get(key)
	}

	/// Space-delimited granted scopes.
	///
	/// A string `scope` field is returned as-is and an array of strings is joined with spaces;
	/// anything else means nothing was granted.
	pub fn granted_scope(&self) -> String {
		match self.extra("scope") {
			Some(Value::String(granted)) => granted.clone(),
			Some(Value::Array(items)) =>
				items.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(" "),
			_ => String::new(),
		}
	}
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::{
		AccessToken, EmptyExtraTokenFields, Scope,
		basic::{BasicTokenResponse, BasicTokenType},
	};
	use serde_json::json;
	// self
	use super::*;

	fn config() -> ClientConfig {
		ClientConfig {
			client_id: "client-1".into(),
			client_secret: Secret::new("secret-1"),
			endpoints: ProviderEndpoints {
				authorization: Url::parse("https://provider.example/oauth2/authorize")
					.expect("Authorization endpoint should parse."),
				token: Url::parse("https://provider.example/oauth2/token")
					.expect("Token endpoint should parse."),
			},
			redirect_uri: Url::parse("https://id.example.com/callback/discord")
				.expect("Redirect URI should parse."),
			scopes: vec!["identify".into(), "email".into()],
			auth_method: ClientAuthMethod::ClientSecretPost,
		}
	}

	#[test]
	fn authorize_url_carries_standard_and_extra_params() {
		let config = config();
		let request = config.authorize(&[("prompt".into(), "none".into())]);
		let pairs = request.url.query_pairs().into_owned().collect::<Vec<_>>();
		let get = |key: &str| {
			pairs.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
		};

		assert_eq!(request.url.path(), "/oauth2/authorize");
		assert_eq!(get("response_type"), Some("code"));
		assert_eq!(get("client_id"), Some("client-1"));
		assert_eq!(get("redirect_uri"), Some("https://id.example.com/callback/discord"));
		assert_eq!(get("scope"), Some("identify email"));
		assert_eq!(get("state"), Some(request.state.as_str()));
		assert_eq!(get("code_challenge_method"), Some("S256"));
		assert_eq!(
			pairs.last().map(|(key, value)| (key.as_str(), value.as_str())),
			Some(("prompt", "none"))
		);
		assert_eq!(request.state.len(), STATE_LEN);
		assert!(request.validate_state(&request.state.clone()));
		assert!(!request.validate_state("forged"));

		let expected_challenge =
			URL_SAFE_NO_PAD.encode(Sha256::digest(request.pkce_verifier().as_bytes()));

		assert_eq!(get("code_challenge"), Some(expected_challenge.as_str()));
		assert!(!format!("{request:?}").contains(request.pkce_verifier()));
	}

	#[test]
	fn authorize_generates_fresh_state() {
		let config = config();

		assert_ne!(config.authorize(&[]).state, config.authorize(&[]).state);
	}

	#[test]
	fn basic_client_uses_configured_endpoints() {
		let config = config();
		let client = config.basic_client();

		assert_eq!(client.client_id().as_str(), "client-1");
		assert_eq!(client.auth_uri().url(), &config.endpoints.authorization);
		assert_eq!(client.token_uri().url(), &config.endpoints.token);
		assert_eq!(client.redirect_uri().map(|uri| uri.url()), Some(&config.redirect_uri));
	}

	#[test]
	fn granted_scope_reads_strings_and_arrays() {
		assert_eq!(
			TokenExchange::new("t").with_scope("identify email").granted_scope(),
			"identify email"
		);
		assert_eq!(
			TokenExchange::new("t").with_extra("scope", json!(["identify", "email"])).granted_scope(),
			"identify email"
		);
		assert_eq!(TokenExchange::new("t").with_extra("scope", json!(7)).granted_scope(), "");
		assert_eq!(TokenExchange::new("t").granted_scope(), "");
	}

	#[test]
	fn token_response_scopes_become_the_grant() {
		let mut response = BasicTokenResponse::new(
			AccessToken::new("access-1".into()),
			BasicTokenType::Bearer,
			EmptyExtraTokenFields {},
		);

		response.set_scopes(Some(vec![Scope::new("identify".into()), Scope::new("email".into())]));

		let exchange = TokenExchange::from_token_response(&response);

		assert_eq!(exchange.access_token.expose(), "access-1");
		assert_eq!(exchange.granted_scope(), "identify email");
		assert!(!format!("{exchange:?}").contains("access-1"));
	}
}
