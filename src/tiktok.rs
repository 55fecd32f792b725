//! TikTok OAuth 2.0 Authorization Code + PKCE login.
//!
//! [`TikTokAuth::start_authorization`] produces the URL to send the browser to and remembers the
//! state + verifier in a [`StateStore`]. [`TikTokAuth::handle_callback`] consumes that state,
//! exchanges the code, loads the user's profile, optionally records the user in Supabase, and
//! returns the frontend redirect. TikTok names the client identifier `client_key`, which is why
//! the exchange is hand-built instead of going through a generic OAuth client.

pub mod callback;
pub mod session;
pub mod token;
pub mod user;

pub use callback::*;
pub use session::{AuthorizationSession, PkceCodeChallengeMethod};
pub use token::TikTokToken;
pub use user::TikTokUser;

// self
use crate::{
	_prelude::*,
	config::{SupabaseSettings, TikTokConfig},
	diagnostics::{CallbackDebug, EnvReport},
	error::ConfigError,
	http::ReqwestHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::StateStore,
	supabase::SupabaseClient,
};

/// TikTok OAuth endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TikTokEndpoints {
	/// Browser-facing authorize endpoint.
	pub authorization: Url,
	/// Token exchange endpoint.
	pub token: Url,
	/// User-info endpoint.
	pub user_info: Url,
}
impl TikTokEndpoints {
	/// Production authorize endpoint.
	pub const AUTHORIZATION: &'static str = "https://www.tiktok.com/v2/auth/authorize/";
	/// Production token endpoint.
	pub const TOKEN: &'static str = "https://open.tiktokapis.com/v2/oauth/token/";
	/// Production user-info endpoint.
	pub const USER_INFO: &'static str = "https://open.tiktokapis.com/v2/user/info/";

	/// Builds endpoints from raw URLs.
	pub fn parse(authorization: &str, token: &str, user_info: &str) -> Result<Self, url::ParseError> {
		Ok(Self {
			authorization: Url::parse(authorization)?,
			token: Url::parse(token)?,
			user_info: Url::parse(user_info)?,
		})
	}

	/// Production TikTok endpoints.
	pub fn production() -> Result<Self, url::ParseError> {
		Self::parse(Self::AUTHORIZATION, Self::TOKEN, Self::USER_INFO)
	}
}

/// Coordinates the TikTok login flow.
///
/// The flow owns the configuration, endpoints, HTTP client, and pending-state store. Attach a
/// Supabase handle with [`TikTokAuth::with_supabase`] to record users after a successful login.
#[derive(Clone)]
pub struct TikTokAuth {
	/// Client credentials, redirect URI, frontend origin, and scopes.
	pub config: TikTokConfig,
	/// Endpoints used for the authorize redirect, token exchange, and user info.
	pub endpoints: TikTokEndpoints,
	/// Store holding state + verifier pairs between redirect and callback.
	pub store: Arc<dyn StateStore>,
	/// HTTP client used for token and user-info calls.
	pub http_client: ReqwestHttpClient,
	/// Optional Supabase handle used to record users.
	pub supabase: Option<SupabaseClient>,
	/// Maximum age of a pending authorization.
	pub state_ttl: Duration,
}
impl TikTokAuth {
	/// Default lifetime of a pending authorization.
	pub const DEFAULT_STATE_TTL: Duration = Duration::minutes(10);
	/// Table that receives authenticated users.
	pub const USERS_TABLE: &'static str = "tiktok_users";

	/// Creates a flow against the production TikTok endpoints.
	pub fn new(config: TikTokConfig, store: Arc<dyn StateStore>) -> Result<Self> {
		let endpoints = TikTokEndpoints::production()
			.map_err(|source| ConfigError::InvalidTikTokEndpoint { source })?;

		Ok(Self {
			config,
			endpoints,
			store,
			http_client: ReqwestHttpClient::new()?,
			supabase: None,
			state_ttl: Self::DEFAULT_STATE_TTL,
		})
	}

	/// Overrides the TikTok endpoints.
	pub fn with_endpoints(mut self, endpoints: TikTokEndpoints) -> Self {
		self.endpoints = endpoints;

		self
	}

	/// Overrides the HTTP client.
	pub fn with_http_client(mut self, http_client: ReqwestHttpClient) -> Self {
		self.http_client = http_client;

		self
	}

	/// Attaches the Supabase handle used to record users.
	pub fn with_supabase(mut self, supabase: SupabaseClient) -> Self {
		self.supabase = Some(supabase);

		self
	}

	/// Overrides how long a pending authorization stays valid (negative values clamp to zero).
	pub fn with_state_ttl(mut self, ttl: Duration) -> Self {
		self.state_ttl = if ttl.is_negative() { Duration::ZERO } else { ttl };

		self
	}

	/// Starts a login, returning the authorize URL and the state the callback must echo.
	pub async fn start_authorization(&self) -> Result<AuthorizationSession> {
		const KIND: FlowKind = FlowKind::TikTokAuthorize;

		let span = FlowSpan::new(KIND, "start_authorization");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let client_key = self.client_key()?;
				let now = OffsetDateTime::now_utc();
				// A TTL reaching past the earliest representable instant never expires anything.
				if let Some(cutoff) = now.checked_sub(self.state_ttl) {
					let pruned = self.store.prune(cutoff).await?;

					if pruned > 0 {
						tracing::debug!(pruned, "dropped expired pending authorizations");
					}
				}

				let (session, pending) = session::build_session(
					&self.endpoints.authorization,
					&self.config,
					client_key,
					now,
				);

				self.store.save(pending).await?;

				Ok::<_, Error>(session)
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// Reports which TikTok variables are configured, plus the Supabase settings when a handle is
	/// attached.
	pub fn env_report(&self) -> EnvReport {
		let supabase = self.supabase.as_ref().map(|client| SupabaseSettings {
			url: client.base_url().to_string(),
			key: client.key().clone(),
		});

		EnvReport::collect(&self.config, &self.endpoints, supabase.as_ref())
	}

	/// Echoes callback parameters alongside whether the state is still pending.
	pub async fn debug_callback(&self, params: &CallbackParams) -> Result<CallbackDebug> {
		let state_exists = match params.state.as_deref() {
			Some(state) => self.store.contains(state).await?,
			None => false,
		};

		Ok(CallbackDebug::new(params, state_exists))
	}

	fn client_key(&self) -> Result<&str> {
		self.config
			.client_key
			.as_deref()
			.filter(|key| !key.trim().is_empty())
			.ok_or_else(|| ConfigError::MissingTikTokClientKey.into())
	}
}
impl Debug for TikTokAuth {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TikTokAuth")
			.field("endpoints", &self.endpoints)
			.field("client_key", &self.config.client_key)
			.field("client_secret_set", &self.config.client_secret.is_some())
			.field("redirect_uri", &self.config.redirect_uri.as_str())
			.field("supabase", &self.supabase.is_some())
			.field("state_ttl", &self.state_ttl)
			.finish()
	}
}
