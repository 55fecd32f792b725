//! Supabase client handle.
//!
//! [`create_client`] is the factory: it validates the endpoint URL and key, then builds a handle
//! whose requests always carry the key. The handle is cheap to clone and every clone shares the
//! same connection pool. Use [`shared`] when a single process-wide handle is wanted, or construct
//! one at startup and pass it around explicitly.

pub mod shared;
pub mod table;

pub use shared::{install, installed, shared, shared_from};
pub use table::TableQuery;

// crates.io
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
// self
use crate::{
	_prelude::*,
	config::{EnvSource, SupabaseEnv, SupabaseSettings},
	error::ConfigError,
	http::ReqwestHttpClient,
	secret::Secret,
};

const API_KEY_HEADER: HeaderName = HeaderName::from_static("apikey");
const CLIENT_INFO_HEADER: HeaderName = HeaderName::from_static("x-client-info");
const CLIENT_INFO: &str = concat!("cookr-backend/", env!("CARGO_PKG_VERSION"));

/// Builds a Supabase handle for `url` authenticated with `key`.
///
/// Blank inputs are rejected with [`ConfigError::MissingSupabaseUrl`] or
/// [`ConfigError::MissingSupabaseKey`]; the URL must parse and use `http` or `https`.
pub fn create_client(url: impl AsRef<str>, key: impl Into<Secret>) -> Result<SupabaseClient> {
	let raw_url = url.as_ref().trim();
	let key = key.into();

	if raw_url.is_empty() {
		return Err(ConfigError::MissingSupabaseUrl.into());
	}
	if key.is_blank() {
		return Err(ConfigError::MissingSupabaseKey.into());
	}

	let mut base_url =
		Url::parse(raw_url).map_err(|source| ConfigError::InvalidSupabaseUrl { source })?;

	if !matches!(base_url.scheme(), "http" | "https") {
		return Err(ConfigError::UnsupportedScheme { scheme: base_url.scheme().into() }.into());
	}
	if !base_url.path().ends_with('/') {
		let path = format!("{}/", base_url.path());

		base_url.set_path(&path);
	}

	base_url.set_query(None);
	base_url.set_fragment(None);

	let client = ReqwestClient::builder()
		.default_headers(default_headers(&key)?)
		.build()
		.map_err(ConfigError::from)?;

	tracing::debug!(url = %base_url, "supabase client created");

	Ok(SupabaseClient(Arc::new(ClientInner {
		base_url,
		key,
		http: ReqwestHttpClient::with_client(client),
	})))
}

fn default_headers(key: &Secret) -> Result<HeaderMap> {
	let mut api_key =
		HeaderValue::from_str(key.expose()).map_err(|_| ConfigError::InvalidKeyHeader)?;
	let mut bearer = HeaderValue::from_str(&format!("Bearer {}", key.expose()))
		.map_err(|_| ConfigError::InvalidKeyHeader)?;

	api_key.set_sensitive(true);
	bearer.set_sensitive(true);

	let mut headers = HeaderMap::new();

	headers.insert(API_KEY_HEADER, api_key);
	headers.insert(AUTHORIZATION, bearer);
	headers.insert(CLIENT_INFO_HEADER, HeaderValue::from_static(CLIENT_INFO));

	Ok(headers)
}

/// Configured handle to a Supabase project.
#[derive(Clone)]
pub struct SupabaseClient(Arc<ClientInner>);
struct ClientInner {
	base_url: Url,
	key: Secret,
	http: ReqwestHttpClient,
}
impl SupabaseClient {
	/// Builds a handle from raw settings, forwarding them untouched to [`create_client`].
	pub fn from_settings(settings: &SupabaseSettings) -> Result<Self> {
		create_client(&settings.url, settings.key.clone())
	}

	/// Reads `env` from `source` and builds a handle.
	///
	/// Absent variables are forwarded as empty strings, so the error (if any) is the one
	/// [`create_client`] reports.
	pub fn from_env(env: SupabaseEnv, source: &(impl ?Sized + EnvSource)) -> Result<Self> {
		Self::from_settings(&env.read(source))
	}

	/// Builds a handle only when both variables are set; returns `None` otherwise.
	pub fn optional_from_env(
		env: SupabaseEnv,
		source: &(impl ?Sized + EnvSource),
	) -> Result<Option<Self>> {
		let settings = env.read(source);

		if !settings.is_complete() {
			tracing::info!(
				url_var = env.url_var,
				key_var = env.key_var,
				"supabase is not configured; continuing without it"
			);

			return Ok(None);
		}

		Self::from_settings(&settings).map(Some)
	}

	/// Normalized project URL (always ends with `/`).
	pub fn base_url(&self) -> &Url {
		&self.0.base_url
	}

	/// Key sent with every request.
	pub fn key(&self) -> &Secret {
		&self.0.key
	}

	/// HTTP client carrying the authentication headers.
	pub fn http_client(&self) -> &ReqwestHttpClient {
		&self.0.http
	}

	/// PostgREST endpoint (`rest/v1`).
	pub fn rest_url(&self) -> Result<Url> {
		self.endpoint("rest/v1")
	}

	/// GoTrue endpoint (`auth/v1`).
	pub fn auth_url(&self) -> Result<Url> {
		self.endpoint("auth/v1")
	}

	/// Storage endpoint (`storage/v1`).
	pub fn storage_url(&self) -> Result<Url> {
		self.endpoint("storage/v1")
	}

	/// Edge functions endpoint (`functions/v1`).
	pub fn functions_url(&self) -> Result<Url> {
		self.endpoint("functions/v1")
	}

	/// Realtime endpoint (`realtime/v1`) on the matching websocket scheme.
	pub fn realtime_url(&self) -> Result<Url> {
		let mut url = self.endpoint("realtime/v1")?;
		let scheme = if url.scheme() == "https" { "wss" } else { "ws" };

		// Both sides are special schemes, so the swap cannot be refused.
		let _ = url.set_scheme(scheme);

		Ok(url)
	}

	/// Starts a query against `table`.
	pub fn from(&self, table: impl Into<String>) -> TableQuery<'_> {
		TableQuery::new(self, table.into())
	}

	/// Whether both handles share the same underlying state.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	fn endpoint(&self, segment: &'static str) -> Result<Url> {
		self.0
			.base_url
			.join(segment)
			.map_err(|source| ConfigError::InvalidEndpoint { segment, source }.into())
	}
}
impl Debug for SupabaseClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SupabaseClient")
			.field("base_url", &self.0.base_url.as_str())
			.field("key", &self.0.key)
			.finish()
	}
}
