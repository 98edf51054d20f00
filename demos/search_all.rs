//! Walks a cursor-paged account search against a local mock of the service, printing
//! progress after every page.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use gigya_client::{client::ReqwestAccountsClient, config::ClientConfig};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let first_page = server
		.mock_async(|when, then| {
			when.method(POST).path("/accounts.search").form_urlencoded_tuple("openCursor", "true");
			then.status(200).body(
				json!({
					"errorCode": 0,
					"statusReason": "OK",
					"results": [{ "UID": "uid-1" }, { "UID": "uid-2" }],
					"totalCount": 3,
					"nextCursor": "demo-cursor",
				})
				.to_string(),
			);
		})
		.await;
	let last_page = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/accounts.search")
				.form_urlencoded_tuple("cursorId", "demo-cursor");
			then.status(200).body(
				json!({
					"errorCode": 0,
					"statusReason": "OK",
					"results": [{ "UID": "uid-3" }],
					"totalCount": 3,
					"nextCursor": "",
				})
				.to_string(),
			);
		})
		.await;
	let config = ClientConfig::builder()
		.api_key("4_demoApiKey")
		.user_key("demoUserKey")
		.secret("ZGVtby1zZWNyZXQ=")
		.base_url(Url::parse(&server.base_url())?)
		.build()?;
	let client = ReqwestAccountsClient::new(config)?;
	let outcome = client
		.search_all_with_progress("SELECT UID FROM accounts", 2, |progress| {
			println!("Fetched {} of {} accounts.", progress.fetched, progress.total);
		})
		.await;

	first_page.assert_async().await;
	last_page.assert_async().await;

	for account in outcome.into_result()? {
		println!("Account {}.", account.uid().unwrap_or("<none>"));
	}

	Ok(())
}
