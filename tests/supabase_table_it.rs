mod common;

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde::Deserialize;
use serde_json::json;
// self
use cookr_backend::{
	config::SupabaseEnv,
	error::{Error, UpstreamError},
	supabase::SupabaseClient,
};

#[derive(Debug, PartialEq, Deserialize)]
struct Recipe {
	id: u32,
	title: String,
}

#[tokio::test]
async fn select_sends_key_headers_and_decodes_rows() -> Result<()> {
	let server = MockServer::start_async().await;
	let client = common::supabase_client(&server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/rest/v1/recipes")
				.header("apikey", common::SUPABASE_KEY)
				.header("authorization", "Bearer anon-key-it")
				.query_param("select", "*")
				.query_param("cuisine", "eq.thai")
				.query_param("limit", "2");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"id\":1,\"title\":\"Pad Thai\"},{\"id\":2,\"title\":\"Tom Yum\"}]");
		})
		.await;
	let rows = client.from("recipes").eq("cuisine", "thai").limit(2).select("*").await?;

	mock.assert_async().await;

	assert_eq!(rows.len(), 2);
	assert_eq!(rows[0]["title"], json!("Pad Thai"));

	let typed = client.from("recipes").eq("cuisine", "thai").limit(2).select_as::<Recipe>("*").await?;

	assert_eq!(typed[1], Recipe { id: 2, title: "Tom Yum".into() });

	mock.assert_calls_async(2).await;

	Ok(())
}

#[tokio::test]
async fn upsert_posts_json_with_merge_preference() -> Result<()> {
	let server = MockServer::start_async().await;
	let client = common::supabase_client(&server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/rest/v1/tiktok_users")
				.query_param("on_conflict", "open_id")
				.header("content-type", "application/json")
				.header("prefer", "resolution=merge-duplicates,return=minimal")
				.json_body(json!({ "open_id": "oid", "display_name": "Chef" }));
			then.status(201);
		})
		.await;

	client
		.from("tiktok_users")
		.on_conflict("open_id")
		.upsert(&json!({ "open_id": "oid", "display_name": "Chef" }))
		.await?;

	mock.assert_async().await;

	Ok(())
}

#[tokio::test]
async fn error_statuses_surface_as_upstream_errors() {
	let server = MockServer::start_async().await;
	let client = common::supabase_client(&server.base_url());

	server
		.mock_async(|when, then| {
			when.method(GET).path("/rest/v1/missing");
			then.status(404)
				.header("retry-after", "30")
				.body("{\"message\":\"relation \\\"public.missing\\\" does not exist\"}");
		})
		.await;

	let err = client.from("missing").select("*").await.expect_err("404 should surface as an error.");

	match err {
		Error::Upstream(UpstreamError::Status { endpoint, status, body, retry_after }) => {
			assert_eq!(endpoint, "supabase.rest");
			assert_eq!(status, 404);
			assert!(body.contains("does not exist"));
			assert_eq!(retry_after, Some(time::Duration::seconds(30)));
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn malformed_rows_report_parse_errors() {
	let server = MockServer::start_async().await;
	let client = common::supabase_client(&server.base_url());

	server
		.mock_async(|when, then| {
			when.method(GET).path("/rest/v1/recipes");
			then.status(200).body("[{\"id\":\"one\",\"title\":\"Pad Thai\"}]");
		})
		.await;

	let err = client
		.from("recipes")
		.select_as::<Recipe>("id,title")
		.await
		.expect_err("Mismatched rows should fail to decode.");

	match err {
		Error::Upstream(UpstreamError::ResponseParse { source, .. }) => {
			assert_eq!(source.path().to_string(), "[0].id");
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[test]
fn env_backed_handle_targets_configured_project() {
	let source = [
		("VITE_SUPABASE_URL", "https://proj.supabase.co"),
		("VITE_SUPABASE_ANON_KEY", "anon"),
	];
	let client = SupabaseClient::from_env(SupabaseEnv::VITE, &source)
		.expect("Complete settings should build a handle.");

	assert_eq!(client.base_url().as_str(), "https://proj.supabase.co/");
	assert_eq!(client.key().expose(), "anon");
}
