//! PostgREST table access through a [`SupabaseClient`].

// crates.io
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::TransportError,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	supabase::SupabaseClient,
};

const ENDPOINT: &str = "supabase.rest";
const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";

/// Query builder for a single table.
#[derive(Clone, Debug)]
pub struct TableQuery<'a> {
	client: &'a SupabaseClient,
	table: String,
	filters: Vec<(String, String)>,
	order: Option<String>,
	limit: Option<usize>,
	on_conflict: Option<String>,
}
impl<'a> TableQuery<'a> {
	pub(super) fn new(client: &'a SupabaseClient, table: String) -> Self {
		Self { client, table, filters: Vec::new(), order: None, limit: None, on_conflict: None }
	}

	/// Table this query targets.
	pub fn table(&self) -> &str {
		&self.table
	}

	/// Keeps rows whose `column` equals `value`.
	pub fn eq(mut self, column: impl Into<String>, value: impl Display) -> Self {
		self.filters.push((column.into(), format!("eq.{value}")));

		self
	}

	/// Orders rows by `column`.
	pub fn order(mut self, column: impl AsRef<str>, ascending: bool) -> Self {
		let direction = if ascending { "asc" } else { "desc" };

		self.order = Some(format!("{}.{direction}", column.as_ref()));

		self
	}

	/// Caps the number of returned rows.
	pub fn limit(mut self, count: usize) -> Self {
		self.limit = Some(count);

		self
	}

	/// Column (or comma-separated columns) used to detect conflicts during upserts.
	pub fn on_conflict(mut self, columns: impl Into<String>) -> Self {
		self.on_conflict = Some(columns.into());

		self
	}

	/// Fetches `columns` (e.g. `"*"`) as raw JSON rows.
	pub async fn select(&self, columns: &str) -> Result<Vec<serde_json::Value>> {
		self.select_as(columns).await
	}

	/// Fetches `columns` and deserializes each row into `T`.
	pub async fn select_as<T>(&self, columns: &str) -> Result<Vec<T>>
	where
		T: DeserializeOwned,
	{
		const KIND: FlowKind = FlowKind::SupabaseRequest;

		let span = FlowSpan::new(KIND, "select");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.select_url(columns)?;
				let http = self.client.http_client();
				let response = http.execute(http.get(url), ENDPOINT).await?;

				response.error_for_status(ENDPOINT)?.json::<Vec<T>>(ENDPOINT)
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// Inserts `row`, merging with an existing row on conflict.
	pub async fn upsert<T>(&self, row: &T) -> Result<()>
	where
		T: ?Sized + Serialize,
	{
		const KIND: FlowKind = FlowKind::SupabaseRequest;

		let span = FlowSpan::new(KIND, "upsert");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let body = serde_json::to_vec(row)
					.map_err(|source| TransportError::Encode { endpoint: ENDPOINT, source })?;
				let url = self.upsert_url()?;
				let http = self.client.http_client();
				let request = http
					.post(url)
					.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
					.header("prefer", HeaderValue::from_static(UPSERT_PREFER))
					.body(body);

				http.execute(request, ENDPOINT).await?.error_for_status(ENDPOINT)?;

				Ok::<_, Error>(())
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	fn table_url(&self) -> Result<Url> {
		let mut url = self.client.rest_url()?;

		// http(s) URLs always have path segments.
		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().push(&self.table);
		}

		Ok(url)
	}

	fn select_url(&self, columns: &str) -> Result<Url> {
		let mut url = self.table_url()?;

		{
			let mut pairs = url.query_pairs_mut();

			pairs.append_pair("select", columns);

			for (column, filter) in &self.filters {
				pairs.append_pair(column, filter);
			}
			if let Some(order) = &self.order {
				pairs.append_pair("order", order);
			}
			if let Some(limit) = self.limit {
				pairs.append_pair("limit", &limit.to_string());
			}
		}

		Ok(url)
	}

	fn upsert_url(&self) -> Result<Url> {
		let mut url = self.table_url()?;

		if let Some(columns) = &self.on_conflict {
			url.query_pairs_mut().append_pair("on_conflict", columns);
		}

		Ok(url)
	}
}
