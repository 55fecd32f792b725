//! Configuration diagnostics safe to expose on an internal debug route.

// self
use crate::{
	_prelude::*,
	config::{SupabaseSettings, TikTokConfig},
	tiktok::{CallbackParams, TikTokEndpoints},
};

/// Substrings that mark a variable as relevant to this crate.
pub const RELEVANT_VARIABLE_MARKERS: [&str; 2] = ["TIKTOK", "SUPABASE"];

/// Snapshot of which variables are configured. Secrets are reported as set/unset only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnvReport {
	/// Whether `TIKTOK_CLIENT_KEY` is set.
	pub tiktok_client_key_set: bool,
	/// Client key value (public identifier, not a secret).
	pub tiktok_client_key_value: Option<String>,
	/// Whether `TIKTOK_CLIENT_SECRET` is set.
	pub tiktok_client_secret_set: bool,
	/// Effective redirect URI.
	pub tiktok_redirect_uri: String,
	/// Effective authorize endpoint.
	pub auth_url: String,
	/// Effective token endpoint.
	pub token_url: String,
	/// Whether the Supabase URL is set; `None` when Supabase settings were not supplied.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub supabase_url_set: Option<bool>,
	/// Whether the Supabase key is set; `None` when Supabase settings were not supplied.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub supabase_key_set: Option<bool>,
}
impl EnvReport {
	/// Builds a report from loaded configuration.
	pub fn collect(
		config: &TikTokConfig,
		endpoints: &TikTokEndpoints,
		supabase: Option<&SupabaseSettings>,
	) -> Self {
		Self {
			tiktok_client_key_set: config.client_key.is_some(),
			tiktok_client_key_value: config.client_key.clone(),
			tiktok_client_secret_set: config.client_secret.is_some(),
			tiktok_redirect_uri: config.redirect_uri.to_string(),
			auth_url: endpoints.authorization.to_string(),
			token_url: endpoints.token.to_string(),
			supabase_url_set: supabase.map(|s| !s.url.trim().is_empty()),
			supabase_key_set: supabase.map(|s| !s.key.is_blank()),
		}
	}
}

/// Sorted names of variables containing one of [`RELEVANT_VARIABLE_MARKERS`].
///
/// Pass `std::env::vars()` to inspect the running process. Values are never returned.
pub fn relevant_variable_names<I, K, V>(vars: I) -> Vec<String>
where
	I: IntoIterator<Item = (K, V)>,
	K: Into<String>,
{
	let mut names: Vec<String> = vars
		.into_iter()
		.map(|(name, _)| name.into())
		.filter(|name| RELEVANT_VARIABLE_MARKERS.iter().any(|marker| name.contains(marker)))
		.collect();

	names.sort();
	names.dedup();

	names
}

/// Callback parameters echoed back with whether the state is still pending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CallbackDebug {
	/// Authorization code, if present.
	pub code: Option<String>,
	/// State, if present.
	pub state: Option<String>,
	/// Provider error code, if present.
	pub error: Option<String>,
	/// Provider error description, if present.
	pub error_description: Option<String>,
	/// Whether the state is known and not yet consumed.
	pub state_exists: bool,
}
impl CallbackDebug {
	/// Copies `params` and attaches the state lookup result.
	pub fn new(params: &CallbackParams, state_exists: bool) -> Self {
		Self {
			code: params.code.clone(),
			state: params.state.clone(),
			error: params.error.clone(),
			error_description: params.error_description.clone(),
			state_exists,
		}
	}
}
