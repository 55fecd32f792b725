//! State and PKCE generation plus the authorize URL for a new login.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, config::TikTokConfig, secret::Secret, store::PendingAuthorization};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// Supported PKCE challenge methods surfaced via [`AuthorizationSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Handshake metadata returned by [`TikTokAuth::start_authorization`](super::TikTokAuth::start_authorization).
///
/// The verifier never leaves the state store; the session only carries what is safe to hand to
/// the browser.
#[derive(Clone, Debug)]
pub struct AuthorizationSession {
	/// Opaque state value that must round-trip via the redirect handler.
	pub state: String,
	/// Redirect URI supplied when constructing the authorize URL.
	pub redirect_uri: Url,
	/// Fully-formed authorize URL that callers should send end-users to.
	pub authorize_url: Url,
	code_challenge: String,
	code_challenge_method: PkceCodeChallengeMethod,
}
impl AuthorizationSession {
	/// PKCE code challenge derived from the secret verifier.
	pub fn code_challenge(&self) -> &str {
		&self.code_challenge
	}

	/// PKCE challenge method (currently always `S256`).
	pub fn code_challenge_method(&self) -> PkceCodeChallengeMethod {
		self.code_challenge_method
	}
}

pub(super) struct PkcePair {
	verifier: String,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl PkcePair {
	pub(super) fn generate() -> Self {
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let challenge = compute_pkce_challenge(&verifier);

		Self { verifier, challenge, method: PkceCodeChallengeMethod::S256 }
	}
}

/// Builds the browser-facing session and the entry to persist until the callback arrives.
pub(super) fn build_session(
	authorization_endpoint: &Url,
	config: &TikTokConfig,
	client_key: &str,
	now: OffsetDateTime,
) -> (AuthorizationSession, PendingAuthorization) {
	let state = random_string(STATE_LEN);
	let pkce = PkcePair::generate();
	let authorize_url = build_authorize_url(authorization_endpoint, config, client_key, &state, &pkce);
	let PkcePair { verifier, challenge, method } = pkce;
	let session = AuthorizationSession {
		state: state.clone(),
		redirect_uri: config.redirect_uri.clone(),
		authorize_url,
		code_challenge: challenge,
		code_challenge_method: method,
	};
	let pending = PendingAuthorization { state, verifier: Secret::new(verifier), created_at: now };

	(session, pending)
}

fn build_authorize_url(
	authorization_endpoint: &Url,
	config: &TikTokConfig,
	client_key: &str,
	state: &str,
	pkce: &PkcePair,
) -> Url {
	let mut url = authorization_endpoint.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("client_key", client_key);
	pairs.append_pair("scope", &config.scope_param());
	pairs.append_pair("response_type", "code");
	pairs.append_pair("redirect_uri", config.redirect_uri.as_str());
	pairs.append_pair("state", state);
	pairs.append_pair("code_challenge", &pkce.challenge);
	pairs.append_pair("code_challenge_method", pkce.method.as_str());

	drop(pairs);

	url
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

pub(super) fn compute_pkce_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(verifier.as_bytes());
	let digest = hasher.finalize();
	URL_SAFE_NO_PAD.encode(digest)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config() -> TikTokConfig {
		TikTokConfig::from_source(&[("TIKTOK_CLIENT_KEY", "ck")])
			.expect("Config fixture should parse.")
	}

	#[test]
	fn pkce_challenge_matches_rfc7636_vector() {
		assert_eq!(
			compute_pkce_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
			"E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
		);
	}

	#[test]
	fn session_carries_state_and_challenge_for_pending_verifier() {
		let endpoint = Url::parse("https://www.tiktok.com/v2/auth/authorize/")
			.expect("Authorize endpoint fixture should parse.");
		let now = OffsetDateTime::now_utc();
		let (session, pending) = build_session(&endpoint, &config(), "ck", now);

		assert_eq!(session.state.len(), STATE_LEN);
		assert_eq!(session.state, pending.state);
		assert_eq!(pending.verifier.expose().len(), PKCE_VERIFIER_LEN);
		assert_eq!(pending.created_at, now);
		assert_eq!(session.code_challenge(), compute_pkce_challenge(pending.verifier.expose()));
		assert_eq!(session.code_challenge_method(), PkceCodeChallengeMethod::S256);

		let pairs: Vec<(String, String)> =
			session.authorize_url.query_pairs().into_owned().collect();
		let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();

		assert_eq!(
			keys,
			[
				"client_key",
				"scope",
				"response_type",
				"redirect_uri",
				"state",
				"code_challenge",
				"code_challenge_method"
			]
		);
		assert!(pairs.contains(&("scope".into(), "user.info.basic,video.list".into())));
		assert!(pairs.contains(&(
			"redirect_uri".into(),
			"https://api.cookr.dev/auth/tiktok/callback".into()
		)));
	}

	#[test]
	fn sessions_never_reuse_state() {
		let endpoint = Url::parse("https://www.tiktok.com/v2/auth/authorize/")
			.expect("Authorize endpoint fixture should parse.");
		let now = OffsetDateTime::now_utc();
		let (a, _) = build_session(&endpoint, &config(), "ck", now);
		let (b, _) = build_session(&endpoint, &config(), "ck", now);

		assert_ne!(a.state, b.state);
		assert_ne!(a.code_challenge(), b.code_challenge());
	}
}
