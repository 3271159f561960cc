#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
use oauth2_federation::{
	config::ProviderKind,
	context::RequestContext,
	error::Error,
	oauth::{TokenExchange, oauth2::basic::BasicTokenResponse},
	provider::{GitHubProvider, Provider, QueryParams},
};
use serde_json::json;
// self
use common::*;

fn provider(server: &MockServer) -> GitHubProvider {
	provider_with_scope(server, ["read:user"])
}

fn provider_with_scope<const N: usize>(server: &MockServer, scope: [&str; N]) -> GitHubProvider {
	GitHubProvider::with_base_urls(
		configuration("github", ProviderKind::GitHub, scope),
		reqwest_deps(),
		url(&server.url("/login/oauth/")),
		url(&server.url("/api/")),
	)
	.expect("GitHub provider should build against the mock server.")
}

#[tokio::test]
async fn claims_are_normalized_from_the_profile() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/user")
				.header("authorization", "Bearer gh-token")
				.header_exists("user-agent");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"id": 583231,
				"login": "octocat",
				"name": "The Octocat",
				"avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
				"email": "octocat@github.com"
			}));
		})
		.await;
	let exchange =
		TokenExchange::new("gh-token").with_extra("scope", json!(["read:user", "user:email"]));
	let claims = provider(&server)
		.claims(&RequestContext::new(), &exchange, &QueryParams::new())
		.await
		.expect("Claims should be retrieved.");

	mock.assert_async().await;

	assert_eq!(claims.issuer, "https://github.com/login/oauth");
	assert_eq!(claims.subject, "583231");
	assert_eq!(claims.name.as_deref(), Some("The Octocat"));
	assert_eq!(claims.nickname.as_deref(), Some("octocat"));
	assert_eq!(claims.email.as_deref(), Some("octocat@github.com"));
	assert!(!claims.email_verified);
}

#[tokio::test]
async fn comma_delimited_token_grant_satisfies_every_scope() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user").header("authorization", "Bearer gh-token");
			then.status(200).json_body(json!({ "id": 1, "login": "octocat" }));
		})
		.await;
	let response: BasicTokenResponse = serde_json::from_str(
		r#"{"access_token":"gh-token","token_type":"bearer","scope":"read:user,user:email"}"#,
	)
	.expect("GitHub token response should decode.");
	let exchange = TokenExchange::from_token_response(&response);

	assert_eq!(exchange.granted_scope(), "read:user,user:email");

	let claims = provider_with_scope(&server, ["read:user", "user:email"])
		.claims(&RequestContext::new(), &exchange, &QueryParams::new())
		.await
		.expect("A complete comma-delimited grant should pass enforcement.");

	mock.assert_calls_async(1).await;

	assert_eq!(claims.subject, "1");
}

#[tokio::test]
async fn comma_delimited_partial_grant_is_rejected() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user");
			then.status(200).json_body(json!({ "id": 1, "login": "octocat" }));
		})
		.await;
	let exchange = TokenExchange::new("gh-token").with_scope("read:user,repo");
	let err = provider_with_scope(&server, ["read:user", "user:email"])
		.claims(&RequestContext::new(), &exchange, &QueryParams::new())
		.await
		.expect_err("`user:email` was not granted.");

	mock.assert_calls_async(0).await;

	match err {
		Error::ScopeMissing { missing } => assert_eq!(missing, ["user:email"]),
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn missing_scope_fails_before_any_request() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user");
			then.status(200).json_body(json!({ "id": 1, "login": "a" }));
		})
		.await;
	let err = provider(&server)
		.claims(&RequestContext::new(), &TokenExchange::new("gh-token"), &QueryParams::new())
		.await
		.expect_err("An empty grant must be rejected.");

	mock.assert_calls_async(0).await;

	assert!(err.is_scope_missing());
}

#[test]
fn prompt_policy_is_a_no_op() {
	let provider = GitHubProvider::new(
		configuration("github", ProviderKind::GitHub, ["read:user"]),
		reqwest_deps(),
	)
	.expect("GitHub provider should build.");

	assert!(provider.auth_code_url_options(&true).is_empty());
	assert!(provider.auth_code_url_options(&false).is_empty());
}

#[test]
fn oauth2_points_at_github() {
	let provider = GitHubProvider::new(
		configuration("gh", ProviderKind::GitHub, ["read:user"]),
		reqwest_deps(),
	)
	.expect("GitHub provider should build.");
	let client = provider.oauth2(&RequestContext::new()).expect("Client config should build.");

	assert_eq!(
		client.endpoints.authorization.as_str(),
		"https://github.com/login/oauth/authorize"
	);
	assert_eq!(
		client.endpoints.token.as_str(),
		"https://github.com/login/oauth/access_token"
	);
	assert_eq!(
		client.redirect_uri.as_str(),
		"https://id.example.com/self-service/methods/oidc/callback/gh"
	);
}
