//! Shared Supabase client handle plus the TikTok OAuth 2.0 + PKCE login flow used by the cookr
//! backend.
//!
//! The crate reads the Supabase endpoint and key from the environment, builds one
//! [`SupabaseClient`](supabase::SupabaseClient), and exposes it process-wide through
//! [`supabase::shared`]. Services that prefer explicit wiring construct the handle once at startup
//! and hand it to [`TikTokAuth`](tiktok::TikTokAuth) and friends directly.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod http;
pub mod obs;
pub mod secret;
pub mod store;
pub mod supabase;
pub mod tiktok;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
