use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use axum::{Router, http::StatusCode, routing::get};
use gatekeeper::{AppState, InvalidRunPolicy, app};
use poller::{PollerConfig, poll_once, run};
use reqwest::{Client, Url};
use tokio::net::TcpListener;

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    addr
}

async fn start_gatekeeper() -> (Arc<AppState>, SocketAddr) {
    let state = Arc::new(AppState::new(InvalidRunPolicy::Lenient));
    let addr = serve(app(state.clone())).await;
    (state, addr)
}

fn config(addr: SocketAddr, run_number: i64) -> PollerConfig {
    PollerConfig {
        run_number,
        base: Url::parse(&format!("http://{addr}/")).unwrap(),
    }
}

#[tokio::test]
async fn stale_worker_stops_on_first_poll() {
    let (state, addr) = start_gatekeeper().await;
    state.gatekeeper.evaluate(5);

    let polls = run(&Client::new(), &config(addr, 3), || Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(polls, 1);
    assert_eq!(state.gatekeeper.snapshot().latest_run_number, 5);
}

#[tokio::test]
async fn worker_keeps_polling_until_superseded() {
    let (state, addr) = start_gatekeeper().await;

    let worker = tokio::spawn(async move {
        run(&Client::new(), &config(addr, 1), || Duration::from_millis(10)).await
    });

    while state.gatekeeper.snapshot().total_calls < 3 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    state.gatekeeper.evaluate(2);

    let polls = tokio::time::timeout(Duration::from_secs(5), worker)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert!(polls >= 4, "{polls}");
    assert_eq!(u64::from(polls) + 1, state.gatekeeper.snapshot().total_calls);
}

#[tokio::test]
async fn poll_once_reads_decision() {
    let (_state, addr) = start_gatekeeper().await;
    let client = Client::new();
    let url = config(addr, 9).url();

    let first = poll_once(&client, &url).await.unwrap();
    let second = poll_once(&client, &url).await.unwrap();

    assert!(!first.shutdown && !second.shutdown);
    assert_eq!((first.total_calls, second.total_calls), (1, 2));
}

#[tokio::test]
async fn error_status_ends_the_loop() {
    let router = Router::new().route(
        "/",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "broken") }),
    );
    let addr = serve(router).await;

    let err = run(&Client::new(), &config(addr, 1), || Duration::ZERO)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("500"), "{err}");
}

#[tokio::test]
async fn unreachable_gatekeeper_is_an_error() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    assert!(poll_once(&Client::new(), &config(addr, 1).url()).await.is_err());
}
