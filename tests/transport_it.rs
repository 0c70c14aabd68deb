// std
use std::{
	io,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
#[cfg(feature = "reqwest")] use httpmock::prelude::*;
// self
#[cfg(feature = "reqwest")] use agrimarket_client::client::ReqwestApiClient;
use agrimarket_client::{
	api::DashboardKind,
	auth::{Credential, Slot},
	client::ApiClient,
	config::ClientConfig,
	error::TransportError,
	ext::{NoFallback, SkeletonDashboards},
	http::{HttpTransport, PreparedRequest, TransportFuture},
	resolver::RetryPolicy,
	session::Session,
	store::MemoryStore,
};

/// Transport that never obtains a response.
#[derive(Default)]
struct DroppedConnection {
	calls: AtomicUsize,
}
impl HttpTransport for DroppedConnection {
	fn execute(&self, _request: PreparedRequest) -> TransportFuture<'_> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async {
			Err(TransportError::Io(io::Error::new(io::ErrorKind::ConnectionReset, "peer reset")))
		})
	}
}

fn config(base: &str) -> ClientConfig {
	ClientConfig::builder(base)
		.retry(RetryPolicy::no_retry())
		.timeout(Duration::from_millis(250))
		.build()
		.expect("Test base URL should be valid.")
}

#[tokio::test]
async fn dropped_connection_surfaces_as_transport_error() {
	let store = Arc::new(MemoryStore::seeded(Slot::Durable, Credential::new("kept")));
	let client = ApiClient::<DroppedConnection>::with_transport(
		config("https://market.example/api/"),
		Session::new(store.clone()),
		DroppedConnection::default(),
	);
	let err = client.get("products/").await.expect_err("No response means no envelope.");

	assert!(matches!(err, TransportError::Io(_)));
	assert_eq!(client.transport.calls.load(Ordering::SeqCst), 1);
	assert!(store.snapshot(Slot::Durable).is_some(), "Transport failures must not clear storage.");
}

#[tokio::test]
async fn dashboard_fallback_covers_a_dropped_connection() {
	let client = ApiClient::<DroppedConnection>::with_transport(
		config("https://market.example/api/"),
		Session::in_memory(),
		DroppedConnection::default(),
	);
	let envelope = client
		.dashboard_or_fallback(DashboardKind::Legal, &SkeletonDashboards)
		.await
		.expect("A skeleton replaces the missing response.");
	let data = envelope.data().expect("Fallback payload should be served.");

	assert_eq!(data["fallback"], serde_json::json!(true));
	assert_eq!(data["kind"], serde_json::json!("legal"));

	let err = client
		.dashboard_or_fallback(DashboardKind::Legal, &NoFallback)
		.await
		.expect_err("Without a fallback the transport failure surfaces.");

	assert!(matches!(err, TransportError::Io(_)));
	assert_eq!(client.transport.calls.load(Ordering::SeqCst), 2);
}

#[cfg(feature = "reqwest")]
#[tokio::test]
async fn unreachable_host_surfaces_as_transport_error() {
	let client = ReqwestApiClient::new(config("http://127.0.0.1:1/api/"), Session::in_memory())
		.expect("Reqwest client should build.");
	let err = client
		.dashboard(DashboardKind::Farmer)
		.await
		.expect_err("Connection refused means no envelope.");

	assert!(matches!(err, TransportError::Network { .. } | TransportError::Timeout { .. }));
}

#[cfg(feature = "reqwest")]
#[tokio::test]
async fn slow_server_hits_the_configured_timeout() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/orders/");
			then.status(200).delay(Duration::from_secs(2)).body("[]");
		})
		.await;
	let client = ReqwestApiClient::new(config(&server.url("/api")), Session::in_memory())
		.expect("Reqwest client should build.");
	let err = client.list_orders().await.expect_err("The response arrives after the timeout.");

	assert!(matches!(err, TransportError::Timeout { .. }));
}
