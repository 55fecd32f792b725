//! Fixtures shared by the integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use url::Url;
// self
use cookr_backend::{
	config::TikTokConfig,
	store::{MemoryStateStore, StateStore},
	supabase::{self, SupabaseClient},
	tiktok::{TikTokAuth, TikTokEndpoints},
};

pub const CLIENT_KEY: &str = "client-key-it";
pub const CLIENT_SECRET: &str = "client-secret-it";
pub const SUPABASE_KEY: &str = "anon-key-it";
pub const FRONTEND_URL: &str = "https://frontend.example.com";
pub const REDIRECT_URI: &str = "https://api.example.com/auth/tiktok/callback";

/// Endpoints that point every TikTok call at `base` (an `httpmock` server).
pub fn endpoints(base: &str) -> TikTokEndpoints {
	let join = |path: &str| {
		Url::parse(&format!("{}{path}", base.trim_end_matches('/')))
			.expect("Mock endpoint URL should parse successfully.")
	};

	TikTokEndpoints {
		authorization: join("/v2/auth/authorize/"),
		token: join("/v2/oauth/token/"),
		user_info: join("/v2/user/info/"),
	}
}

pub fn tiktok_config() -> TikTokConfig {
	TikTokConfig::from_source(&[
		("TIKTOK_CLIENT_KEY", CLIENT_KEY),
		("TIKTOK_CLIENT_SECRET", CLIENT_SECRET),
		("TIKTOK_REDIRECT_URI", REDIRECT_URI),
		("FRONTEND_URL", FRONTEND_URL),
	])
	.expect("Test TikTok configuration should parse.")
}

pub fn supabase_client(base: &str) -> SupabaseClient {
	supabase::create_client(base, SUPABASE_KEY)
		.expect("Supabase test client should build successfully.")
}

/// Flow backed by an in-memory state store and mock endpoints rooted at `base`.
pub fn build_auth(base: &str) -> (TikTokAuth, Arc<MemoryStateStore>) {
	let store_backend = Arc::new(MemoryStateStore::default());
	let store: Arc<dyn StateStore> = store_backend.clone();
	let auth = TikTokAuth::new(tiktok_config(), store)
		.expect("Test TikTok flow should build.")
		.with_endpoints(endpoints(base));

	(auth, store_backend)
}
