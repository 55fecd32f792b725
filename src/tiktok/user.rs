//! User-info payloads.

// crates.io
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Fields requested from the user-info endpoint.
pub const USER_FIELDS: &str = "open_id,union_id,avatar_url,display_name";

/// TikTok profile exactly as the user-info endpoint returned it.
///
/// The object is kept verbatim, including explicit `null`s and field order, so it can be
/// forwarded to the frontend unchanged. Accessors cover the requested [`USER_FIELDS`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TikTokUser(pub Map<String, Value>);
impl TikTokUser {
	/// App-scoped user identifier.
	pub fn open_id(&self) -> Option<&str> {
		self.str_field("open_id")
	}

	/// Developer-scoped user identifier.
	pub fn union_id(&self) -> Option<&str> {
		self.str_field("union_id")
	}

	/// Avatar image URL.
	pub fn avatar_url(&self) -> Option<&str> {
		self.str_field("avatar_url")
	}

	/// Public display name.
	pub fn display_name(&self) -> Option<&str> {
		self.str_field("display_name")
	}

	fn str_field(&self, name: &str) -> Option<&str> {
		self.0.get(name).and_then(Value::as_str)
	}
}

#[derive(Debug, Deserialize)]
pub(super) struct UserInfoEnvelope {
	#[serde(default)]
	data: Option<UserInfoData>,
}
impl UserInfoEnvelope {
	/// Profile under `data.user`, or an empty profile when TikTok omitted it.
	pub(super) fn into_user(self) -> TikTokUser {
		self.data.and_then(|data| data.user).unwrap_or_default()
	}
}

#[derive(Debug, Deserialize)]
struct UserInfoData {
	#[serde(default)]
	user: Option<TikTokUser>,
}

/// Row written to the `tiktok_users` table.
#[derive(Debug, Serialize)]
pub(super) struct TikTokUserRow<'a> {
	pub(super) open_id: Option<&'a str>,
	pub(super) display_name: Option<&'a str>,
	pub(super) avatar_url: Option<&'a str>,
	pub(super) access_token: &'a str,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn user_info_keeps_profile_verbatim() {
		let envelope: UserInfoEnvelope = serde_json::from_str(
			"{\"data\":{\"user\":{\"open_id\":\"oid\",\"display_name\":\"Chef\",\"avatar_url\":null,\"bio_description\":\"hi\"}},\"error\":{\"code\":\"ok\"}}",
		)
		.expect("User-info fixture should deserialize.");
		let user = envelope.into_user();

		assert_eq!(user.open_id(), Some("oid"));
		assert_eq!(user.display_name(), Some("Chef"));
		assert_eq!(user.avatar_url(), None);
		assert_eq!(user.union_id(), None);
		assert_eq!(user.0.get("bio_description"), Some(&serde_json::json!("hi")));

		let rendered = serde_json::to_string(&user).expect("Profile should serialize.");

		assert_eq!(
			rendered,
			"{\"open_id\":\"oid\",\"display_name\":\"Chef\",\"avatar_url\":null,\"bio_description\":\"hi\"}"
		);
	}

	#[test]
	fn missing_profile_becomes_empty_object() {
		let envelope: UserInfoEnvelope =
			serde_json::from_str("{\"error\":{\"code\":\"access_token_invalid\"}}")
				.expect("Error-only fixture should deserialize.");
		let user = envelope.into_user();

		assert_eq!(user, TikTokUser::default());
		assert_eq!(serde_json::to_string(&user).expect("Profile should serialize."), "{}");
	}
}
