//! Token endpoint payloads.
//!
//! TikTok has shipped both a flat token response and one nested under `data`; both are read.

// self
use crate::{_prelude::*, secret::Secret};

/// Access token issued by the code exchange.
#[derive(Clone, Debug)]
pub struct TikTokToken {
	/// Bearer token for TikTok APIs.
	pub access_token: Secret,
	/// Refresh token, when issued.
	pub refresh_token: Option<Secret>,
	/// TikTok user identifier tied to the token.
	pub open_id: Option<String>,
	/// Granted scopes as reported by TikTok.
	pub scope: Option<String>,
	/// Token type (normally `Bearer`).
	pub token_type: Option<String>,
	/// Absolute expiry, when `expires_in` was present and positive.
	pub expires_at: Option<OffsetDateTime>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenGrant {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	open_id: Option<String>,
	#[serde(default)]
	scope: Option<String>,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default)]
	expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenEnvelope {
	#[serde(flatten)]
	top: TokenGrant,
	#[serde(default)]
	data: Option<TokenGrant>,
}
impl TokenEnvelope {
	/// Picks the top-level grant when it carries an access token, falling back to `data`.
	pub(super) fn into_token(self, now: OffsetDateTime) -> Option<TikTokToken> {
		let has_token = |grant: &TokenGrant| {
			grant.access_token.as_deref().is_some_and(|token| !token.is_empty())
		};
		let grant = if has_token(&self.top) {
			self.top
		} else {
			self.data.filter(has_token)?
		};
		let expires_at = grant
			.expires_in
			.filter(|secs| *secs > 0)
			.and_then(|secs| now.checked_add(Duration::seconds(secs)));

		Some(TikTokToken {
			access_token: Secret::new(grant.access_token?),
			refresh_token: grant.refresh_token.filter(|t| !t.is_empty()).map(Secret::new),
			open_id: grant.open_id,
			scope: grant.scope,
			token_type: grant.token_type,
			expires_at,
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	fn parse(raw: &str) -> TokenEnvelope {
		serde_json::from_str(raw).expect("Token fixture should deserialize.")
	}

	#[test]
	fn reads_flat_token_response() {
		let now = datetime!(2025-01-01 00:00 UTC);
		let token = parse(
			"{\"access_token\":\"act.1\",\"refresh_token\":\"rft.1\",\"open_id\":\"oid\",\"scope\":\"user.info.basic\",\"token_type\":\"Bearer\",\"expires_in\":86400}",
		)
		.into_token(now)
		.expect("Flat responses should yield a token.");

		assert_eq!(token.access_token.expose(), "act.1");
		assert_eq!(token.refresh_token.as_ref().map(Secret::expose), Some("rft.1"));
		assert_eq!(token.open_id.as_deref(), Some("oid"));
		assert_eq!(token.expires_at, Some(datetime!(2025-01-02 00:00 UTC)));
	}

	#[test]
	fn falls_back_to_nested_data() {
		let token = parse("{\"access_token\":\"\",\"data\":{\"access_token\":\"act.2\"}}")
			.into_token(OffsetDateTime::now_utc())
			.expect("Nested responses should yield a token.");

		assert_eq!(token.access_token.expose(), "act.2");
		assert!(token.expires_at.is_none());
	}

	#[test]
	fn missing_token_yields_none() {
		let now = OffsetDateTime::now_utc();

		assert!(
			parse("{\"error\":\"invalid_request\",\"error_description\":\"bad code\"}")
				.into_token(now)
				.is_none()
		);
		assert!(parse("{\"data\":{}}").into_token(now).is_none());
	}
}
