//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::{
	io,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
use oauth2_federation::{
	config::{Configuration, ProviderId, ProviderKind},
	deps::{Dependencies, FederationDeps},
	error::UpstreamError,
	http::{ApiHttpClient, HttpFuture, ReqwestHttpClient},
	oauth::oauth2::{HttpRequest, HttpResponse},
	reqwest::Client as ReqwestClient,
	url::Url,
};

pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";
pub const REDIRECT_BASE: &str = "https://id.example.com/";

pub fn url(value: &str) -> Url {
	Url::parse(value).expect("Test URL should parse.")
}

pub fn provider_id(value: &str) -> ProviderId {
	ProviderId::new(value).expect("Provider identifier fixture should be valid.")
}

pub fn configuration<const N: usize>(
	id: &str,
	kind: ProviderKind,
	scope: [&str; N],
) -> Configuration {
	Configuration::new(provider_id(id), kind, CLIENT_ID, CLIENT_SECRET).with_scope(scope)
}

/// Builds a reqwest client that accepts the self-signed certificates produced by `httpmock`.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

pub fn deps_with(client: Arc<dyn ApiHttpClient>) -> Arc<dyn Dependencies> {
	Arc::new(FederationDeps::new(url(REDIRECT_BASE), client))
}

pub fn reqwest_deps() -> Arc<dyn Dependencies> {
	deps_with(Arc::new(test_reqwest_http_client()))
}

/// Transport double that counts calls and fails every request with a network error.
#[derive(Debug, Default)]
pub struct FailingClient {
	calls: AtomicUsize,
}
impl FailingClient {
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl ApiHttpClient for FailingClient {
	fn execute(&self, _: HttpRequest, _: Option<Duration>) -> HttpFuture<'_, HttpResponse> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async {
			Err(UpstreamError::network(io::Error::new(
				io::ErrorKind::ConnectionReset,
				"connection reset by peer",
			)))
		})
	}
}
