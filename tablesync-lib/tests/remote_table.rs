//! Integration tests for tables backed by a remote endpoint.
//!
//! The transport and views endpoint are in-memory fakes; every test runs on
//! a paused clock so debounce and response delays are deterministic.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use serde_json::json;
use tablesync_lib::error::ApiError;
use tablesync_lib::error::Error;
use tablesync_lib::location::HistoryParamStore;
use tablesync_lib::location::ParamStore;
use tablesync_lib::location::UrlParams;
use tablesync_lib::query::Filters;
use tablesync_lib::query::Sort;
use tablesync_lib::remote::ODataProtocol;
use tablesync_lib::remote::RemoteSource;
use tablesync_lib::remote::Transport;
use tablesync_lib::remote::TransportRequest;
use tablesync_lib::remote::TransportResponse;
use tablesync_lib::table::DataTable;
use tablesync_lib::table::Mode;
use tablesync_lib::table::TableConfig;
use tablesync_lib::views::View;
use tablesync_lib::views::ViewsEndpoint;

const ENDPOINT: &str = "https://api.test/orders";

// =============================================================================
// Fakes
// =============================================================================

/// Serves two rows per page, tagged with the request's page and query.
///
/// Requests whose query string mentions `slow` take a second to answer.
#[derive(Default)]
struct FakeTransport {
    requests: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl FakeTransport {
    fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    fn last_params(&self) -> UrlParams {
        let requests = self.requests.lock();
        let url = requests.last().map(String::as_str).unwrap_or_default();
        UrlParams::parse(url.split_once('?').map(|(_, q)| q).unwrap_or_default())
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ApiError> {
        self.requests.lock().push(request.url.clone());
        let delay = if request.url.contains("slow") { 1000 } else { 50 };
        tokio::time::sleep(Duration::from_millis(delay)).await;

        if self.fail.load(Ordering::SeqCst) {
            return Ok(TransportResponse::new(500, "boom"));
        }

        let query = request.url.split_once('?').map(|(_, q)| q).unwrap_or_default();
        let params = UrlParams::parse(query);
        let page = params.get("page").unwrap_or("1").to_string();
        let items: Vec<Value> = (1..=2)
            .map(|i| json!({"id": format!("p{page}-{i}"), "page": page, "query": query}))
            .collect();
        let body = json!({"items": items, "value": items, "total": 45, "@odata.count": 45});
        Ok(TransportResponse::ok(body.to_string()))
    }
}

#[derive(Default)]
struct FakeViews {
    fail: bool,
    slow_create: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeViews {
    fn record(&self, call: String) -> Result<(), Error> {
        self.calls.lock().push(call);
        if self.fail {
            Err(ApiError::http(503, "unavailable").into())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ViewsEndpoint for FakeViews {
    async fn list(&self) -> Result<Vec<View>, Error> {
        self.record("list".to_string())?;
        Ok(vec![View::new("Remote", Filters::new().with("status", "open")).with_id("r1")])
    }

    async fn create(&self, view: &View) -> Result<Option<String>, Error> {
        if self.slow_create {
            wait(100).await;
        }
        self.record(format!("create {}", view.name))?;
        let created = self
            .calls
            .lock()
            .iter()
            .filter(|call| call.starts_with("create"))
            .count();
        Ok(Some(format!("new-{created}")))
    }

    async fn rename(&self, view: &View, name: &str) -> Result<(), Error> {
        self.record(format!("rename {} {}", view.name, name))
    }

    async fn update(&self, view: &View) -> Result<(), Error> {
        self.record(format!("update {}", view.name))
    }

    async fn delete(&self, view: &View) -> Result<(), Error> {
        self.record(format!("delete {}", view.name))
    }
}

fn remote_table(
    transport: &Arc<FakeTransport>,
    source: RemoteSource,
    store: Option<Arc<HistoryParamStore>>,
    views: Option<Arc<FakeViews>>,
) -> DataTable<Value> {
    let mut builder = DataTable::builder()
        .config(TableConfig::default().with_query_field("name"))
        .remote(source)
        .transport(transport.clone());
    if let Some(store) = store {
        builder = builder.param_store(store);
    }
    if let Some(views) = views {
        builder = builder.views_endpoint(views);
    }
    builder.build()
}

fn first_id(table: &DataTable<Value>) -> String {
    table.snapshot().items[0]["id"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

async fn wait(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

// =============================================================================
// Fetching
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_mount_fetches_first_page() {
    let transport = Arc::new(FakeTransport::default());
    let table = remote_table(&transport, RemoteSource::new(ENDPOINT), None, None);
    assert!(table.snapshot().first_load);

    table.mount().await;
    let snapshot = table.snapshot();
    assert_eq!(snapshot.mode, Mode::Remote);
    assert_eq!(snapshot.total, 45);
    assert_eq!(first_id(&table), "p1-1");
    assert!(!snapshot.loading);
    assert!(!snapshot.first_load);
    assert_eq!(snapshot.pagination.label, "1-20 of 45");
    assert_eq!(transport.requests(), vec![format!("{ENDPOINT}?limit=20&page=1")]);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_is_debounced() {
    let transport = Arc::new(FakeTransport::default());
    let table = remote_table(&transport, RemoteSource::new(ENDPOINT), None, None);
    table.mount().await;

    table.set_page(2);
    table.set_page(3);
    table.set_page(4);
    assert!(table.snapshot().loading);

    wait(1000).await;
    assert_eq!(transport.requests().len(), 2);
    assert_eq!(transport.last_params().get("page"), Some("4"));
    assert_eq!(first_id(&table), "p4-1");
    assert!(!table.snapshot().loading);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_request_is_not_applied() {
    let transport = Arc::new(FakeTransport::default());
    let table = remote_table(&transport, RemoteSource::new(ENDPOINT), None, None);
    table.mount().await;

    table.set_query_value("slow");
    wait(400).await;
    assert_eq!(transport.requests().len(), 2);

    table.set_query_value("quick");
    wait(3000).await;

    assert_eq!(transport.requests().len(), 3);
    let snapshot = table.snapshot();
    assert_eq!(snapshot.query_value, "quick");
    let applied = snapshot.items[0]["query"].as_str().unwrap_or_default();
    assert!(applied.contains("quick"));
    assert!(!applied.contains("slow"));
}

#[tokio::test(start_paused = true)]
async fn test_fetch_error_keeps_items() {
    let transport = Arc::new(FakeTransport::default());
    let table = remote_table(&transport, RemoteSource::new(ENDPOINT), None, None);
    table.mount().await;

    transport.fail.store(true, Ordering::SeqCst);
    table.set_page(2);
    wait(1000).await;

    let snapshot = table.snapshot();
    assert!(snapshot.error.as_deref().unwrap_or_default().contains("500"));
    assert!(!snapshot.loading);
    assert_eq!(snapshot.total, 45);
    assert_eq!(first_id(&table), "p1-1");

    transport.fail.store(false, Ordering::SeqCst);
    table.refresh().await;
    let snapshot = table.snapshot();
    assert_eq!(snapshot.error, None);
    assert_eq!(first_id(&table), "p2-1");
}

#[tokio::test(start_paused = true)]
async fn test_odata_request_shape() {
    let transport = Arc::new(FakeTransport::default());
    let source = RemoteSource::new(ENDPOINT).protocol(ODataProtocol);
    let table = remote_table(&transport, source, None, None);
    table.mount().await;

    table.set_filter("status", vec!["open", "pending"]);
    table.set_sort(Some(Sort::desc("price")));
    table.set_page(3);
    wait(1000).await;

    let params = transport.last_params();
    assert_eq!(params.get("$orderby"), Some("price desc"));
    assert_eq!(params.get("$top"), Some("20"));
    assert_eq!(params.get("$skip"), Some("40"));
    assert_eq!(
        params.get("$filter"),
        Some("(status eq 'open' or status eq 'pending')")
    );
    assert_eq!(table.snapshot().total, 45);
}

#[tokio::test(start_paused = true)]
async fn test_url_drives_first_request() {
    let transport = Arc::new(FakeTransport::default());
    let store = Arc::new(HistoryParamStore::parse("page=3&query=acme"));
    let table = remote_table(&transport, RemoteSource::new(ENDPOINT), Some(store.clone()), None);
    table.mount().await;

    let params = transport.last_params();
    assert_eq!(params.get("page"), Some("3"));
    assert_eq!(params.get("filter"), Some("name||$cont||acme"));

    table.set_query_value("");
    wait(1000).await;
    assert_eq!(store.params().to_query_string(), "");
    assert_eq!(transport.last_params().get("page"), Some("1"));
}

#[tokio::test(start_paused = true)]
async fn test_dispose_cancels_in_flight() {
    let transport = Arc::new(FakeTransport::default());
    let table = remote_table(&transport, RemoteSource::new(ENDPOINT), None, None);
    table.mount().await;

    table.set_query_value("slow");
    wait(400).await;
    table.dispose();
    wait(3000).await;

    assert_eq!(first_id(&table), "p1-1");
    assert_eq!(transport.requests().len(), 2);
}

// =============================================================================
// Views
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_views_loaded_and_persisted() {
    let transport = Arc::new(FakeTransport::default());
    let views = Arc::new(FakeViews::default());
    let store = Arc::new(HistoryParamStore::new());
    let table = remote_table(
        &transport,
        RemoteSource::new(ENDPOINT),
        Some(store.clone()),
        Some(views.clone()),
    );
    table.mount().await;
    assert_eq!(table.snapshot().views[1].id.as_deref(), Some("r1"));

    table.set_filter("region", "emea");
    let index = table.create_view("Mine").await;
    assert_eq!(table.snapshot().views[index].id.as_deref(), Some("new-1"));

    wait(1000).await;
    assert_eq!(store.params().get("viewSelected"), Some("new-1"));

    table.rename_view(index, "Mine (EMEA)").await.unwrap();
    table.delete_view(index).await.unwrap();
    assert_eq!(
        *views.calls.lock(),
        vec![
            "list".to_string(),
            "create Mine".to_string(),
            "rename Mine Mine (EMEA)".to_string(),
            "delete Mine (EMEA)".to_string(),
        ]
    );
    assert_eq!(table.snapshot().selected_view, 0);
}

#[tokio::test(start_paused = true)]
async fn test_view_renamed_while_saving_keeps_id() {
    let transport = Arc::new(FakeTransport::default());
    let views = Arc::new(FakeViews {
        slow_create: true,
        ..FakeViews::default()
    });
    let table = remote_table(&transport, RemoteSource::new(ENDPOINT), None, Some(views));
    table.mount().await;

    let (index, renamed) = tokio::join!(table.create_view("Draft"), async {
        wait(10).await;
        table.rename_view(2, "Final").await
    });
    renamed.unwrap();

    let snapshot = table.snapshot();
    assert_eq!(index, 2);
    assert_eq!(snapshot.views[2].name, "Final");
    assert_eq!(snapshot.views[2].id.as_deref(), Some("new-1"));
}

#[tokio::test(start_paused = true)]
async fn test_identical_views_get_their_own_ids() {
    let transport = Arc::new(FakeTransport::default());
    let views = Arc::new(FakeViews::default());
    let table = remote_table(&transport, RemoteSource::new(ENDPOINT), None, Some(views));
    table.mount().await;

    let first = table.create_view("Twin").await;
    let second = table.create_view("Twin").await;

    let snapshot = table.snapshot();
    assert_eq!(snapshot.views[first].id.as_deref(), Some("new-1"));
    assert_eq!(snapshot.views[second].id.as_deref(), Some("new-2"));
}

#[tokio::test(start_paused = true)]
async fn test_view_endpoint_failures_keep_local_state() {
    let transport = Arc::new(FakeTransport::default());
    let views = Arc::new(FakeViews {
        fail: true,
        ..FakeViews::default()
    });
    let table = remote_table(&transport, RemoteSource::new(ENDPOINT), None, Some(views));
    table.mount().await;
    assert_eq!(table.snapshot().views.len(), 1);

    let index = table.create_view("Offline").await;
    table.rename_view(index, "Still offline").await.unwrap();
    let snapshot = table.snapshot();
    assert_eq!(snapshot.views[index].name, "Still offline");
    assert_eq!(snapshot.views[index].id, None);
}
