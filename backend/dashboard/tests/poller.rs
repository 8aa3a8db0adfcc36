use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use statusgate_core::{DatabaseState, StatusReport};
use statusgate_dashboard::{DashboardPoller, PollerOptions, RoundSummary};
use tokio::net::TcpListener;

const KEY: &str = "dashboard-key";
const HOSTS: [&str; 3] = ["pi-02", "pi-03", "pi-01"];

/// Round-robins answers over three hosts, like a load balancer would.
async fn status(
    State(hits): State<Arc<AtomicUsize>>,
    headers: HeaderMap,
) -> Result<Json<StatusReport>, StatusCode> {
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some(KEY) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let n = hits.fetch_add(1, Ordering::SeqCst);
    Ok(Json(StatusReport {
        message: "stub".into(),
        server: HOSTS[n % HOSTS.len()].into(),
        uptime: format!("{n}s"),
        database: Some(DatabaseState::Connected),
        database_error: None,
        security: None,
        timestamp: Utc::now(),
    }))
}

async fn spawn_stub() -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/status", get(status))
        .with_state(hits.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, hits)
}

fn options(addr: SocketAddr, key: Option<&str>) -> PollerOptions {
    PollerOptions {
        base_url: format!("http://{addr}"),
        api_key: key.map(String::from),
        fan_out: 10,
        interval: Duration::from_millis(50),
        request_timeout: Duration::from_secs(2),
    }
}

#[tokio::test]
async fn fan_out_round_reconciles_by_server() {
    let (addr, hits) = spawn_stub().await;
    let mut poller = DashboardPoller::new(options(addr, Some(KEY))).unwrap();

    let summary = poller.poll_once().await;
    assert_eq!(summary.requested, 10);
    assert_eq!(summary.succeeded, 10);
    assert!(summary.updated >= 3);
    assert_eq!(hits.load(Ordering::SeqCst), 10);

    let servers: Vec<_> = poller
        .registry()
        .snapshot()
        .into_iter()
        .map(|r| r.server)
        .collect();
    assert_eq!(servers, ["pi-01", "pi-02", "pi-03"]);

    let table = poller.render(false);
    assert!(table.contains("pi-02"));
    assert!(table.contains("connected"));
}

#[tokio::test]
async fn rejected_requests_are_skipped() {
    let (addr, _) = spawn_stub().await;
    let mut poller = DashboardPoller::new(options(addr, Some("wrong"))).unwrap();

    let summary = poller.poll_once().await;
    assert_eq!(
        summary,
        RoundSummary {
            requested: 10,
            succeeded: 0,
            updated: 0
        }
    );
    assert!(poller.registry().is_empty());
}

#[tokio::test]
async fn run_polls_until_shutdown() {
    let (addr, hits) = spawn_stub().await;
    let mut poller = DashboardPoller::new(options(addr, Some(KEY))).unwrap();

    poller
        .run(tokio::time::sleep(Duration::from_millis(180)))
        .await
        .unwrap();

    assert!(hits.load(Ordering::SeqCst) >= 20);
    assert_eq!(poller.registry().len(), 3);
}
