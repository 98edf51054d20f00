//! Cursor-driven account search.
//!
//! The first request carries the query text with a `limit` clause and
//! `openCursor=true`. Every later request carries only the `cursorId` handed back by
//! the previous page, forwarded byte for byte. An empty `nextCursor` ends the
//! retrieval. Pages are fetched strictly one after another because the service-side
//! cursor advances on each call.
//!
//! [`AccountsClient::search_all`] never discards fetched pages: when a later page
//! fails, the accounts gathered so far are returned together with the error in a
//! [`SearchOutcome`].

// self
use crate::{
	_prelude::*,
	api::{Account, ApiMethod},
	client::AccountsClient,
	http::{RequestParams, Transport},
	obs,
};

/// Largest page size the service reliably honors.
pub const MAX_BATCH_SIZE: u32 = 100;
/// Smallest page size sent.
pub const MIN_BATCH_SIZE: u32 = 1;

/// Clamps a caller-supplied page size into `MIN_BATCH_SIZE..=MAX_BATCH_SIZE`.
pub fn clamp_batch_size(requested: i64) -> u32 {
	requested.clamp(MIN_BATCH_SIZE.into(), MAX_BATCH_SIZE.into()) as u32
}

/// Search expression plus the effective page size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
	text: String,
	batch_size: u32,
}
impl Query {
	/// Builds a query; `batch_size` is clamped with [`clamp_batch_size`].
	pub fn new(text: impl Into<String>, batch_size: i64) -> Self {
		Self { text: text.into(), batch_size: clamp_batch_size(batch_size) }
	}

	/// Query text as supplied.
	pub fn text(&self) -> &str {
		&self.text
	}

	/// Effective page size.
	pub fn batch_size(&self) -> u32 {
		self.batch_size
	}

	/// Parameters of the request that opens the cursor.
	pub fn first_page_params(&self) -> RequestParams {
		RequestParams::new()
			.with("query", format!("{} limit {}", self.text, self.batch_size))
			.with("openCursor", "true")
	}
}

/// Opaque service-issued pagination handle; empty means exhausted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>")]
pub struct Cursor(String);
impl Cursor {
	/// Returns `true` when no further page exists.
	pub fn is_exhausted(&self) -> bool {
		self.0.is_empty()
	}

	/// Raw handle.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Parameters of the request that follows this cursor.
	pub fn next_page_params(&self) -> RequestParams {
		RequestParams::new().with("cursorId", self.0.as_str())
	}
}
impl From<Option<String>> for Cursor {
	fn from(handle: Option<String>) -> Self {
		Self(handle.unwrap_or_default())
	}
}
impl From<String> for Cursor {
	fn from(handle: String) -> Self {
		Self(handle)
	}
}

/// One decoded `accounts.search` page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
	/// Records in the order the service returned them.
	#[serde(default, rename = "results")]
	pub accounts: Vec<Account>,
	/// Total matches for the whole query.
	#[serde(default)]
	pub total_count: u64,
	/// Handle for the next page.
	#[serde(default)]
	pub next_cursor: Cursor,
}

/// Running counters handed to the progress callback after each page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
	/// Records accumulated so far.
	pub fetched: usize,
	/// Total reported by the service.
	pub total: u64,
}

/// Result of a bulk retrieval, complete or not.
#[derive(Debug)]
pub struct SearchOutcome {
	/// Records accumulated before completion or failure.
	pub accounts: Vec<Account>,
	/// Latest total count known; `0` when the first call failed without one.
	pub total_count: u64,
	/// Failure that stopped the retrieval, if any.
	pub error: Option<Error>,
}
impl SearchOutcome {
	/// Returns `true` when the cursor was exhausted without error.
	pub fn is_complete(&self) -> bool {
		self.error.is_none()
	}

	/// Discards partial data on failure.
	pub fn into_result(self) -> Result<Vec<Account>> {
		match self.error {
			Some(e) => Err(e),
			None => Ok(self.accounts),
		}
	}
}

impl<T> AccountsClient<T>
where
	T: ?Sized + Transport,
{
	/// Fetches a single page of at most `batch_size` records.
	///
	/// The cursor opened for the page is not followed; the returned page never
	/// carries one.
	pub async fn search(&self, query: &str, batch_size: i64) -> Result<ResultPage> {
		let query = Query::new(query, batch_size);
		let mut page = self.fetch_page(query.first_page_params(), "search").await?;

		page.next_cursor = Cursor::default();

		Ok(page)
	}

	/// Retrieves every record matching `query`.
	pub async fn search_all(&self, query: &str, batch_size: i64) -> SearchOutcome {
		self.search_all_with_progress(query, batch_size, |_| {}).await
	}

	/// Retrieves every record matching `query`, reporting progress after each page.
	///
	/// `progress` runs synchronously after a page is decoded and before the next one
	/// is requested.
	pub async fn search_all_with_progress<P>(
		&self,
		query: &str,
		batch_size: i64,
		mut progress: P,
	) -> SearchOutcome
	where
		P: FnMut(Progress),
	{
		let query = Query::new(query, batch_size);
		let mut accounts = Vec::new();
		let mut total_count = None::<u64>;
		let mut params = query.first_page_params();

		loop {
			let page = match self.fetch_page(params, "search_all").await {
				Ok(page) => page,
				Err(e) => {
					let total_count = match &e {
						Error::Api { total_count: Some(reported), .. } => *reported,
						_ => total_count.unwrap_or_default(),
					};

					obs::event!(
						warn,
						fetched = accounts.len(),
						total_count,
						error = %e,
						"Search stopped before the cursor was exhausted."
					);

					return SearchOutcome { accounts, total_count, error: Some(e) };
				},
			};

			match total_count {
				Some(previous) if previous != page.total_count => {
					obs::event!(
						warn,
						previous,
						current = page.total_count,
						"Total count changed between pages."
					);
				},
				_ => {},
			}

			total_count = Some(page.total_count);
			accounts.extend(page.accounts);
			obs::record_search_page();
			obs::event!(
				debug,
				fetched = accounts.len(),
				total_count = page.total_count,
				"Search page received."
			);
			progress(Progress { fetched: accounts.len(), total: page.total_count });

			if page.next_cursor.is_exhausted() {
				break;
			}

			params = page.next_cursor.next_page_params();
		}

		let total_count = total_count.unwrap_or_default();

		if accounts.len() as u64 != total_count {
			obs::event!(
				warn,
				fetched = accounts.len(),
				total_count,
				"Cursor exhausted with a record count different from the total."
			);
		}

		SearchOutcome { accounts, total_count, error: None }
	}

	async fn fetch_page(&self, params: RequestParams, stage: &'static str) -> Result<ResultPage> {
		const METHOD: ApiMethod = ApiMethod::Search;

		self.observe(METHOD, stage, self.call(METHOD, params)).await
	}
}
