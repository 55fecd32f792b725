//! Redirect handling: code exchange, profile lookup, user persistence, frontend redirect.

// crates.io
use reqwest::header::{ACCEPT, HeaderValue};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	secret::Secret,
	tiktok::{
		TikTokAuth,
		token::{TikTokToken, TokenEnvelope},
		user::{TikTokUser, TikTokUserRow, USER_FIELDS, UserInfoEnvelope},
	},
};

const TOKEN_ENDPOINT: &str = "tiktok.token";
const USER_INFO_ENDPOINT: &str = "tiktok.user_info";

/// Query parameters TikTok appends to the redirect URI.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackParams {
	/// Authorization code.
	#[serde(default)]
	pub code: Option<String>,
	/// State issued by [`TikTokAuth::start_authorization`].
	#[serde(default)]
	pub state: Option<String>,
	/// Provider error code when the user denied access.
	#[serde(default)]
	pub error: Option<String>,
	/// Provider error description.
	#[serde(default)]
	pub error_description: Option<String>,
}

/// Result of a successful callback.
#[derive(Clone, Debug)]
pub struct CallbackOutcome {
	/// Token issued by TikTok.
	pub token: TikTokToken,
	/// Profile returned by the user-info endpoint.
	pub user: TikTokUser,
	/// Frontend URL the browser should be redirected to.
	pub redirect: Url,
}

impl TikTokAuth {
	/// Validates raw callback parameters and runs [`TikTokAuth::handle_callback`].
	pub async fn handle_callback_params(&self, params: &CallbackParams) -> Result<CallbackOutcome> {
		if let Some(error) = &params.error {
			return Err(Error::AuthorizationDenied {
				error: error.clone(),
				description: params.error_description.clone(),
			});
		}

		let code = params
			.code
			.as_deref()
			.ok_or(Error::MissingCallbackParameter { name: "code" })?;
		let state = params
			.state
			.as_deref()
			.ok_or(Error::MissingCallbackParameter { name: "state" })?;

		self.handle_callback(code, state).await
	}

	/// Completes a login for the `code` + `state` pair TikTok redirected back with.
	///
	/// The state is consumed before anything else happens, so a replayed callback fails with
	/// [`Error::InvalidState`] even if the first attempt errored later on.
	pub async fn handle_callback(&self, code: &str, state: &str) -> Result<CallbackOutcome> {
		const KIND: FlowKind = FlowKind::TikTokCallback;

		let span = FlowSpan::new(KIND, "handle_callback");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let pending = self.store.take(state).await?.ok_or(Error::InvalidState)?;

				if pending.is_expired_at(OffsetDateTime::now_utc(), self.state_ttl) {
					return Err(Error::StateExpired);
				}

				let token = self.exchange_code(code, &pending.verifier).await?;
				let user = self.fetch_user(&token).await?;

				self.record_user(&user, &token).await;

				let redirect = frontend_redirect(&self.config.frontend_url, &token, &user)?;

				Ok(CallbackOutcome { token, user, redirect })
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// Exchanges an authorization code for an access token.
	pub async fn exchange_code(&self, code: &str, verifier: &Secret) -> Result<TikTokToken> {
		let client_key = self.client_key()?;
		let client_secret = self.config.client_secret.as_ref().map(Secret::expose).unwrap_or_default();
		let form = [
			("client_key", client_key),
			("client_secret", client_secret),
			("code", code),
			("grant_type", "authorization_code"),
			("redirect_uri", self.config.redirect_uri.as_str()),
			("code_verifier", verifier.expose()),
		];
		let request = self
			.http_client
			.post(self.endpoints.token.clone())
			.header(ACCEPT, HeaderValue::from_static("application/json"))
			.form(&form);
		let response = self
			.http_client
			.execute(request, TOKEN_ENDPOINT)
			.await?
			.expect_status(TOKEN_ENDPOINT, |status| status == 200)?;
		let envelope = response.json::<TokenEnvelope>(TOKEN_ENDPOINT)?;

		envelope.into_token(OffsetDateTime::now_utc()).ok_or_else(|| Error::MissingAccessToken {
			response: response.text_lossy().into_owned(),
		})
	}

	/// Loads the basic profile of the token's owner.
	pub async fn fetch_user(&self, token: &TikTokToken) -> Result<TikTokUser> {
		let request = self
			.http_client
			.get(self.endpoints.user_info.clone())
			.bearer_auth(token.access_token.expose())
			.header(ACCEPT, HeaderValue::from_static("application/json"))
			.query(&[("fields", USER_FIELDS)]);
		let response = self
			.http_client
			.execute(request, USER_INFO_ENDPOINT)
			.await?
			.expect_status(USER_INFO_ENDPOINT, |status| status == 200)?;

		Ok(response.json::<UserInfoEnvelope>(USER_INFO_ENDPOINT)?.into_user())
	}

	/// Upserts the user into Supabase when a handle is attached. Failures are logged, not
	/// returned.
	async fn record_user(&self, user: &TikTokUser, token: &TikTokToken) {
		let Some(supabase) = &self.supabase else {
			return;
		};
		let row = TikTokUserRow {
			open_id: user.open_id(),
			display_name: user.display_name(),
			avatar_url: user.avatar_url(),
			access_token: token.access_token.expose(),
		};

		if let Err(e) = supabase.from(Self::USERS_TABLE).upsert(&row).await {
			tracing::warn!(error = %e, table = Self::USERS_TABLE, "failed to store TikTok user");
		}
	}
}

/// Builds `<frontend>/search?access_token=..&user=<json>`.
fn frontend_redirect(frontend: &Url, token: &TikTokToken, user: &TikTokUser) -> Result<Url> {
	let user_json = serde_json::to_string(user)
		.map_err(|source| TransportError::Encode { endpoint: "frontend.redirect", source })?;
	let mut url = frontend.clone();
	let path = format!("{}/search", url.path().trim_end_matches('/'));

	if url.cannot_be_a_base() {
		return Err(ConfigError::InvalidFrontendUrl { source: None }.into());
	}

	url.set_path(&path);
	url.set_query(None);
	url.query_pairs_mut()
		.append_pair("access_token", token.access_token.expose())
		.append_pair("user", &user_json);

	Ok(url)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn token(value: &str) -> TikTokToken {
		TikTokToken {
			access_token: Secret::new(value),
			refresh_token: None,
			open_id: None,
			scope: None,
			token_type: None,
			expires_at: None,
		}
	}

	#[test]
	fn frontend_redirect_appends_search_path_and_payload() {
		let user: TikTokUser = serde_json::from_str(
			"{\"open_id\":\"oid\",\"display_name\":\"Chef & Co\",\"union_id\":null}",
		)
		.expect("Profile fixture should deserialize.");
		let frontend = Url::parse("https://cookr.dev").expect("Frontend fixture should parse.");
		let url = frontend_redirect(&frontend, &token("act.1"), &user)
			.expect("Redirect should build.");

		assert_eq!(url.path(), "/search");

		let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();

		assert_eq!(pairs.get("access_token").map(String::as_str), Some("act.1"));

		let decoded: TikTokUser = serde_json::from_str(&pairs["user"])
			.expect("User payload should round-trip through the query string.");

		assert_eq!(decoded, user);
		assert_eq!(pairs["user"], "{\"open_id\":\"oid\",\"display_name\":\"Chef & Co\",\"union_id\":null}");
	}

	#[test]
	fn frontend_redirect_keeps_base_path() {
		let frontend =
			Url::parse("http://localhost:5173/app/").expect("Frontend fixture should parse.");
		let url = frontend_redirect(&frontend, &token("t"), &TikTokUser::default())
			.expect("Redirect should build.");

		assert_eq!(url.path(), "/app/search");
		assert!(url.as_str().ends_with("user=%7B%7D"));
	}
}
