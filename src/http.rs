//! Transport primitives shared by the Supabase handle and the TikTok flow.
//!
//! [`ReqwestHttpClient::execute`] dispatches a prepared request, buffers the body, and captures
//! [`ResponseMetadata`] so callers can classify failures with the upstream status and retry hint
//! still attached.

// std
use std::{borrow::Cow, ops::Deref};
// crates.io
use reqwest::{
	RequestBuilder,
	header::{HeaderMap, RETRY_AFTER},
	redirect::Policy,
};
use serde::de::DeserializeOwned;
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError, UpstreamError},
};

/// Metadata captured from the most recent HTTP response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the upstream endpoint.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token and user-info calls must not follow redirects; [`ReqwestHttpClient::new`] builds a
/// client with redirects disabled. Custom clients passed through
/// [`ReqwestHttpClient::with_client`] should be configured the same way.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Builds a client that never follows redirects.
	pub fn new() -> Result<Self> {
		let client =
			ReqwestClient::builder().redirect(Policy::none()).build().map_err(ConfigError::from)?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Sends `request`, buffering the response body.
	///
	/// Only transport failures are reported as errors; HTTP error statuses come back as a regular
	/// [`HttpResponse`] so callers decide how to classify them.
	pub async fn execute(
		&self,
		request: RequestBuilder,
		endpoint: &'static str,
	) -> Result<HttpResponse> {
		let response =
			request.send().await.map_err(|e| TransportError::network(endpoint, e))?;
		let status = response.status().as_u16();
		let retry_after = parse_retry_after(response.headers());
		let body = response
			.bytes()
			.await
			.map_err(|e| TransportError::network(endpoint, e))?
			.to_vec();

		tracing::debug!(endpoint, status, body_len = body.len(), "upstream responded");

		Ok(HttpResponse { metadata: ResponseMetadata { status: Some(status), retry_after }, body })
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Buffered upstream response.
#[derive(Clone, Debug)]
pub struct HttpResponse {
	/// Status and retry metadata.
	pub metadata: ResponseMetadata,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// HTTP status code (0 when unknown).
	pub fn status(&self) -> u16 {
		self.metadata.status.unwrap_or_default()
	}

	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status())
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text_lossy(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}

	/// Converts non-2xx responses into [`UpstreamError::Status`].
	pub fn error_for_status(self, endpoint: &'static str) -> Result<Self> {
		self.expect_status(endpoint, |status| (200..300).contains(&status))
	}

	/// Converts responses whose status fails `accept` into [`UpstreamError::Status`].
	pub fn expect_status(
		self,
		endpoint: &'static str,
		accept: impl FnOnce(u16) -> bool,
	) -> Result<Self> {
		if accept(self.status()) {
			return Ok(self);
		}

		Err(UpstreamError::Status {
			endpoint,
			status: self.status(),
			body: self.text_lossy().into_owned(),
			retry_after: self.metadata.retry_after,
		}
		.into())
	}

	/// Parses the body as JSON, reporting the path of the first failing field.
	pub fn json<T>(&self, endpoint: &'static str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
			UpstreamError::ResponseParse { endpoint, source, status: self.metadata.status }.into()
		})
	}
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
