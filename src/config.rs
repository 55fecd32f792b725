//! Environment-backed configuration for the Supabase handle and the TikTok login flow.
//!
//! Lookups go through [`EnvSource`] so services read the real process environment via
//! [`ProcessEnv`] while tests and embedders hand in a plain map. Supabase values are treated as
//! opaque strings here; validating them is the job of
//! [`create_client`](crate::supabase::create_client).

// self
use crate::{_prelude::*, error::ConfigError, secret::Secret};

/// Source of configuration variables.
pub trait EnvSource {
	/// Returns the value bound to `key`, if any.
	fn var(&self, key: &str) -> Option<String>;
}

/// Reads variables from the current process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;
impl EnvSource for ProcessEnv {
	fn var(&self, key: &str) -> Option<String> {
		std::env::var(key).ok()
	}
}
impl EnvSource for HashMap<String, String> {
	fn var(&self, key: &str) -> Option<String> {
		self.get(key).cloned()
	}
}
impl EnvSource for BTreeMap<String, String> {
	fn var(&self, key: &str) -> Option<String> {
		self.get(key).cloned()
	}
}
impl EnvSource for [(&str, &str)] {
	fn var(&self, key: &str) -> Option<String> {
		self.iter().find(|(k, _)| *k == key).map(|(_, v)| (*v).to_owned())
	}
}
impl<const N: usize> EnvSource for [(&str, &str); N] {
	fn var(&self, key: &str) -> Option<String> {
		self.as_slice().var(key)
	}
}

/// Names of the two variables that configure the Supabase handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SupabaseEnv {
	/// Variable holding the project endpoint URL.
	pub url_var: &'static str,
	/// Variable holding the access key.
	pub key_var: &'static str,
}
impl SupabaseEnv {
	/// `SUPABASE_URL` + `SUPABASE_KEY`, as read by the backend service.
	pub const SERVICE: Self = Self { url_var: "SUPABASE_URL", key_var: "SUPABASE_KEY" };
	/// `VITE_SUPABASE_URL` + `VITE_SUPABASE_ANON_KEY`, as injected into frontend builds. This is
	/// the default pair.
	pub const VITE: Self = Self { url_var: "VITE_SUPABASE_URL", key_var: "VITE_SUPABASE_ANON_KEY" };

	/// Reads both variables. Absent values come back as empty strings.
	pub fn read(&self, source: &(impl ?Sized + EnvSource)) -> SupabaseSettings {
		SupabaseSettings {
			url: source.var(self.url_var).unwrap_or_default(),
			key: Secret::new(source.var(self.key_var).unwrap_or_default()),
		}
	}
}
impl Default for SupabaseEnv {
	fn default() -> Self {
		Self::VITE
	}
}

/// Raw, unvalidated Supabase settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SupabaseSettings {
	/// Project endpoint URL.
	pub url: String,
	/// Access key.
	pub key: Secret,
}
impl SupabaseSettings {
	/// Whether both values are present and non-blank.
	pub fn is_complete(&self) -> bool {
		!self.url.trim().is_empty() && !self.key.is_blank()
	}
}

/// TikTok login configuration.
#[derive(Clone, Debug)]
pub struct TikTokConfig {
	/// Application client key (`TIKTOK_CLIENT_KEY`).
	pub client_key: Option<String>,
	/// Application client secret (`TIKTOK_CLIENT_SECRET`).
	pub client_secret: Option<Secret>,
	/// Redirect URI registered with TikTok (`TIKTOK_REDIRECT_URI`).
	pub redirect_uri: Url,
	/// Frontend origin that receives the final redirect (`FRONTEND_URL`).
	pub frontend_url: Url,
	/// Scopes requested during authorization.
	pub scopes: Vec<String>,
}
impl TikTokConfig {
	/// Variable holding the client key.
	pub const CLIENT_KEY_VAR: &'static str = "TIKTOK_CLIENT_KEY";
	/// Variable holding the client secret.
	pub const CLIENT_SECRET_VAR: &'static str = "TIKTOK_CLIENT_SECRET";
	/// Default frontend origin.
	pub const DEFAULT_FRONTEND_URL: &'static str = "https://cookr.dev";
	/// Default redirect URI.
	pub const DEFAULT_REDIRECT_URI: &'static str = "https://api.cookr.dev/auth/tiktok/callback";
	/// Scopes requested unless overridden.
	pub const DEFAULT_SCOPES: [&'static str; 2] = ["user.info.basic", "video.list"];
	/// Variable holding the frontend origin.
	pub const FRONTEND_URL_VAR: &'static str = "FRONTEND_URL";
	/// Variable holding the redirect URI.
	pub const REDIRECT_URI_VAR: &'static str = "TIKTOK_REDIRECT_URI";

	/// Loads the configuration from the process environment.
	pub fn from_env() -> Result<Self> {
		Self::from_source(&ProcessEnv)
	}

	/// Loads the configuration from `source`, applying defaults for optional values.
	///
	/// A missing client key or secret is not an error here; the flow reports it when a login is
	/// attempted.
	pub fn from_source(source: &(impl ?Sized + EnvSource)) -> Result<Self> {
		let client_key = source.var(Self::CLIENT_KEY_VAR).filter(|v| !v.trim().is_empty());
		let client_secret = source
			.var(Self::CLIENT_SECRET_VAR)
			.filter(|v| !v.trim().is_empty())
			.map(Secret::new);
		let redirect_raw = source
			.var(Self::REDIRECT_URI_VAR)
			.filter(|v| !v.trim().is_empty())
			.unwrap_or_else(|| Self::DEFAULT_REDIRECT_URI.into());
		let redirect_uri =
			Url::parse(&redirect_raw).map_err(|source| ConfigError::InvalidRedirect { source })?;
		let frontend_raw = source
			.var(Self::FRONTEND_URL_VAR)
			.filter(|v| !v.trim().is_empty())
			.unwrap_or_else(|| Self::DEFAULT_FRONTEND_URL.into());
		let frontend_url = parse_frontend_url(&frontend_raw)?;

		Ok(Self {
			client_key,
			client_secret,
			redirect_uri,
			frontend_url,
			scopes: Self::DEFAULT_SCOPES.iter().map(|s| (*s).to_owned()).collect(),
		})
	}

	/// Overrides the requested scopes.
	pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Comma-joined scope list as TikTok expects it.
	pub fn scope_param(&self) -> String {
		self.scopes.join(",")
	}
}

fn parse_frontend_url(raw: &str) -> Result<Url> {
	let url = Url::parse(raw)
		.map_err(|source| ConfigError::InvalidFrontendUrl { source: Some(source) })?;

	if url.cannot_be_a_base() {
		return Err(ConfigError::InvalidFrontendUrl { source: None }.into());
	}

	Ok(url)
}
