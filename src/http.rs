//! Transport primitives for provider API calls.
//!
//! [`ApiHttpClient`] is the crate's only dependency on an HTTP stack. Providers hand it a fully
//! built [`HttpRequest`] plus an optional timeout derived from the caller's deadline, and map
//! the [`HttpResponse`] themselves. Implementations classify their own failures into
//! [`UpstreamError`], so transport error types never leak past the provider boundary.

// std
use std::time::Duration as StdDuration;
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use oauth2::{
	HttpRequest, HttpResponse,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, USER_AGENT},
	},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{_prelude::*, context::RequestContext, error::UpstreamError, secret::Secret};

const BODY_PREVIEW_LIMIT: usize = 256;
const CLIENT_USER_AGENT: &str = concat!("oauth2-federation/", env!("CARGO_PKG_VERSION"));

/// Boxed future returned by [`ApiHttpClient::execute`].
pub type HttpFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, UpstreamError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of calling provider REST APIs.
///
/// Implementations must be `Send + Sync + 'static` so a single client can be shared by every
/// provider and every concurrent login attempt.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes `request`, giving up after `timeout` when one is supplied.
	///
	/// Timeouts must surface as [`UpstreamError::Cancelled`]; other transport failures as
	/// [`UpstreamError::Network`]. Non-success statuses are returned as responses, not errors.
	fn execute(&self, request: HttpRequest, timeout: Option<StdDuration>)
	-> HttpFuture<'_, HttpResponse>;
}

/// Decoded provider profile together with the raw JSON object it came from.
#[derive(Clone, Debug)]
pub struct Profile<T> {
	/// Typed view of the profile.
	pub data: T,
	/// Raw top-level fields of the profile object.
	pub raw: BTreeMap<String, Value>,
}

/// Issues a bearer-authenticated `GET` and decodes the JSON body.
///
/// The caller's deadline is checked before dispatch and forwarded as the transport timeout.
pub async fn fetch_profile<T>(
	client: &dyn ApiHttpClient,
	ctx: &RequestContext,
	url: &Url,
	access_token: &Secret,
) -> Result<Profile<T>, UpstreamError>
where
	T: DeserializeOwned,
{
	let timeout = ctx.remaining()?;
	let request = Request::builder()
		.method(Method::GET)
		.uri(url.as_str())
		.header(ACCEPT, "application/json")
		.header(AUTHORIZATION, format!("Bearer {}", access_token.expose()))
		.header(USER_AGENT, CLIENT_USER_AGENT)
		.body(Vec::new())
		.map_err(|source| UpstreamError::Request { source })?;
	let response = client.execute(request, timeout).await?;
	let status = response.status();

	if !status.is_success() {
		return Err(UpstreamError::Status {
			status: status.as_u16(),
			body_preview: truncate_preview(&String::from_utf8_lossy(response.body())),
		});
	}

	decode_profile(response.body())
}

fn decode_profile<T>(body: &[u8]) -> Result<Profile<T>, UpstreamError>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(body);
	let value: Value = serde_path_to_error::deserialize(&mut de)
		.map_err(|source| UpstreamError::Decode { source })?;
	let data = serde_path_to_error::deserialize(value.clone())
		.map_err(|source| UpstreamError::Decode { source })?;
	let raw = match value {
		Value::Object(fields) => fields.into_iter().collect(),
		_ => BTreeMap::new(),
	};

	Ok(Profile { data, raw })
}

fn truncate_preview(body: &str) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body.to_owned();
	}

	let mut buf = body.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	fn execute(
		&self,
		request: HttpRequest,
		timeout: Option<StdDuration>,
	) -> HttpFuture<'_, HttpResponse> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut request = reqwest::Request::try_from(request)?;

			if timeout.is_some() {
				*request.timeout_mut() = timeout;
			}

			let response = client.execute(request).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
