//! Process-wide Supabase handle.
//!
//! The first successful call binds the handle for the rest of the process; every later call
//! returns that same instance. Prefer passing a [`SupabaseClient`] explicitly where possible and
//! keep this accessor for call sites that cannot be threaded through.

// std
use std::sync::OnceLock;
// self
use crate::{
	_prelude::*,
	config::{EnvSource, ProcessEnv, SupabaseEnv},
	supabase::SupabaseClient,
};

static SHARED: OnceLock<SupabaseClient> = OnceLock::new();

/// Returns the process-wide handle, building it from [`SupabaseEnv::VITE`] on first use.
pub fn shared() -> Result<&'static SupabaseClient> {
	shared_from(SupabaseEnv::VITE, &ProcessEnv)
}

/// Returns the process-wide handle, building it from `env` read out of `source` on first use.
///
/// Construction errors are returned without binding anything, so a later call can retry once
/// the environment is fixed. Inputs are ignored once a handle is bound.
pub fn shared_from(
	env: SupabaseEnv,
	source: &(impl ?Sized + EnvSource),
) -> Result<&'static SupabaseClient> {
	if let Some(client) = SHARED.get() {
		return Ok(client);
	}

	let client = SupabaseClient::from_env(env, source)?;

	// A concurrent initializer may win the race; its handle is the one everybody sees.
	Ok(SHARED.get_or_init(|| client))
}

/// Binds an explicitly built handle as the process-wide one.
///
/// Returns the rejected handle when another one is already bound.
pub fn install(client: SupabaseClient) -> Result<&'static SupabaseClient, SupabaseClient> {
	let candidate = Arc::clone(&client.0);
	let bound = SHARED.get_or_init(|| client);

	if Arc::ptr_eq(&bound.0, &candidate) { Ok(bound) } else { Err(SupabaseClient(candidate)) }
}

/// Returns the process-wide handle if one is bound.
pub fn installed() -> Option<&'static SupabaseClient> {
	SHARED.get()
}
