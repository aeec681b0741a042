//! End-to-end tests for fetching and rendering prayer timings.
//!
//! These tests use mockito to stand in for the AlAdhan API, plus a bare TCP
//! listener that never answers for the timeout and cancellation cases.
//!
//! Run with: `cargo test --test fetch_timings`

use std::{
    io::{Read, Write},
    net::{TcpListener, TcpStream},
    thread,
    time::Duration,
};

use mockito::{Matcher, Server};
use prayer_timings::{
    AppError, Config, FetchState, Listing, TimingsClient, TimingsFetcher, render,
    render::NO_DATA_TEXT, to_12_hour,
};
use serde_json::json;

const ADDRESS: &str = "1906 Nueces St, Austin, TX 78705";

// ============================================================================
// Test Helpers
// ============================================================================

fn timings_body() -> String {
    json!({
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "06:19",
                "Sunrise": "07:34",
                "Dhuhr": "13:12",
                "Asr": "16:28",
                "Sunset": "18:51",
                "Maghrib": "18:51",
                "Isha": "20:02",
                "Imsak": "06:09",
                "Midnight": "00:12",
                "Firstthird": "22:05",
                "Lastthird": "02:20"
            },
            "date": { "readable": "18 Oct 2026" }
        }
    })
    .to_string()
}

fn timings_mock(server: &mut Server, status: usize, body: &str) -> mockito::Mock {
    server
        .mock("GET", "/timingsByAddress")
        .match_query(Matcher::UrlEncoded("address".into(), ADDRESS.into()))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create()
}

fn client_for(server: &Server) -> TimingsClient {
    TimingsClient::new(
        Config::new(ADDRESS)
            .with_endpoint(server.url())
            .with_timeout(Duration::from_secs(5)),
    )
    .expect("Failed to create test client")
}

/// A server that accepts connections and never writes a response
fn silent_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Listener has no address");
    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });
    format!("http://{}", addr)
}

/// A server that answers its first connection late with full timings and
/// every later connection at once with a 503
fn staggered_endpoint(delay: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Listener has no address");
    thread::spawn(move || {
        for (index, stream) in listener.incoming().flatten().enumerate() {
            thread::spawn(move || answer(stream, index == 0, delay));
        }
    });
    format!("http://{}", addr)
}

fn answer(mut stream: TcpStream, slow: bool, delay: Duration) {
    let mut request = [0u8; 4096];
    let _ = stream.read(&mut request);
    let (status, body) = if slow {
        thread::sleep(delay);
        ("200 OK", timings_body())
    } else {
        ("503 Service Unavailable", String::new())
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

// ============================================================================
// Client Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_returns_timings() {
    let mut server = Server::new_async().await;
    let mock = timings_mock(&mut server, 200, &timings_body());

    let timings = client_for(&server).fetch().await.unwrap().expect("timings present");

    assert_eq!(timings.fajr, "06:19");
    assert_eq!(timings.midnight, "00:12");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_reports_http_status() {
    let mut server = Server::new_async().await;
    let _mock = timings_mock(&mut server, 500, "{}");

    match client_for(&server).fetch().await {
        Err(AppError::HttpStatus(code)) => assert_eq!(code, 500),
        other => panic!("Expected HttpStatus error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_degrades_on_missing_timings() {
    let mut server = Server::new_async().await;
    let _empty = timings_mock(&mut server, 200, "{}");

    assert!(client_for(&server).fetch().await.unwrap().is_none());
}

#[tokio::test]
async fn test_fetch_degrades_on_invalid_json() {
    let mut server = Server::new_async().await;
    let _mock = timings_mock(&mut server, 200, "<html>maintenance</html>");

    assert!(client_for(&server).fetch().await.unwrap().is_none());
}

#[tokio::test]
async fn test_fetch_keeps_partial_timings() {
    let mut server = Server::new_async().await;
    let body = json!({
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "06:19",
                "Sunrise": "07:34",
                "Dhuhr": "13:12",
                "Asr": "16:28",
                "Sunset": "18:51",
                "Maghrib": "18:51",
                "Isha": "20:02",
                "Midnight": "00:12"
            }
        }
    });
    let _mock = timings_mock(&mut server, 200, &body.to_string());

    let timings = client_for(&server).fetch().await.unwrap().expect("timings present");

    assert_eq!(timings.isha, "20:02");
    assert_eq!(timings.imsak, "");
}

#[tokio::test]
async fn test_fetch_degrades_on_non_object_timings() {
    let mut server = Server::new_async().await;
    let body = json!({ "code": 200, "status": "OK", "data": { "timings": null } });
    let _mock = timings_mock(&mut server, 200, &body.to_string());

    assert!(client_for(&server).fetch().await.unwrap().is_none());
}

#[tokio::test]
async fn test_fetch_times_out() {
    let client = TimingsClient::new(
        Config::new(ADDRESS)
            .with_endpoint(silent_endpoint())
            .with_timeout(Duration::from_millis(200)),
    )
    .unwrap();

    assert!(matches!(client.fetch().await, Err(AppError::Timeout)));
}

#[tokio::test]
async fn test_fetch_reports_connection_failure() {
    // bind then drop to get a port nobody listens on
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let client = TimingsClient::new(
        Config::new(ADDRESS).with_endpoint(format!("http://127.0.0.1:{}", port)),
    )
    .unwrap();

    assert!(matches!(client.fetch().await, Err(AppError::Network(_))));
}

// ============================================================================
// Fetcher Tests
// ============================================================================

#[tokio::test]
async fn test_activation_moves_from_loading_to_success() {
    let mut server = Server::new_async().await;
    let _mock = timings_mock(&mut server, 200, &timings_body());
    let mut fetcher = TimingsFetcher::new(client_for(&server));

    let receiver = fetcher.activate();
    assert_eq!(*receiver.borrow(), FetchState::Loading);

    let state = fetcher.wait_for_completion().await;
    let FetchState::Success(timings) = &state else {
        panic!("Expected Success, got {:?}", state);
    };

    let screen = render(&state, Listing::Displayed);
    for (name, raw) in timings.displayed() {
        let line = format!("{}: {}", name, to_12_hour(raw).unwrap());
        assert!(screen.contains(&line), "missing line {:?} in {:?}", line, screen);
    }
    assert!(screen.contains("Fajr: 6:19 AM"));
    assert!(screen.contains("Midnight: 12:12 AM"));
}

#[tokio::test]
async fn test_activation_moves_from_loading_to_failure() {
    let mut server = Server::new_async().await;
    let _mock = timings_mock(&mut server, 500, "");
    let mut fetcher = TimingsFetcher::new(client_for(&server));

    fetcher.activate();
    match fetcher.wait_for_completion().await {
        FetchState::Failure(reason) => assert!(reason.contains("500"), "reason: {}", reason),
        other => panic!("Expected Failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_body_renders_no_data() {
    let mut server = Server::new_async().await;
    let _mock = timings_mock(&mut server, 200, "{}");
    let mut fetcher = TimingsFetcher::new(client_for(&server));

    fetcher.activate();
    let state = fetcher.wait_for_completion().await;

    assert_eq!(state, FetchState::MissingTimings);
    assert_eq!(render(&state, Listing::Displayed), NO_DATA_TEXT);
}

#[tokio::test]
async fn test_timeout_is_a_failure() {
    let client = TimingsClient::new(
        Config::new(ADDRESS)
            .with_endpoint(silent_endpoint())
            .with_timeout(Duration::from_millis(200)),
    )
    .unwrap();
    let mut fetcher = TimingsFetcher::new(client);

    fetcher.activate();
    assert_eq!(
        fetcher.wait_for_completion().await,
        FetchState::Failure("timeout".to_string())
    );
}

#[tokio::test]
async fn test_deactivate_cancels_without_touching_state() {
    let client = TimingsClient::new(Config::new(ADDRESS).with_endpoint(silent_endpoint())).unwrap();
    let mut fetcher = TimingsFetcher::new(client);

    fetcher.activate();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(fetcher.is_in_flight());

    fetcher.deactivate();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!fetcher.is_in_flight());
    assert_eq!(fetcher.state(), FetchState::Loading);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reactivation_supersedes_in_flight_fetch() {
    let delay = Duration::from_millis(300);
    let client = TimingsClient::new(Config::new(ADDRESS).with_endpoint(staggered_endpoint(delay))).unwrap();
    let mut fetcher = TimingsFetcher::new(client);

    // first activation reaches the server and waits on the slow success
    fetcher.activate();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(fetcher.is_in_flight());

    let mut receiver = fetcher.activate();
    let state = receiver
        .wait_for(FetchState::is_terminal)
        .await
        .expect("fetcher still alive")
        .clone();
    assert_eq!(state, FetchState::Failure("HTTP error! status: 503".to_string()));

    // the superseded success would have arrived by now
    tokio::time::sleep(delay * 2).await;
    assert_eq!(fetcher.state(), state);
}

#[tokio::test]
async fn test_reactivation_after_failure_starts_loading_again() {
    let mut server = Server::new_async().await;
    let mock = timings_mock(&mut server, 503, "").expect(2);
    let mut fetcher = TimingsFetcher::new(client_for(&server));

    fetcher.activate();
    assert!(matches!(fetcher.wait_for_completion().await, FetchState::Failure(_)));

    let receiver = fetcher.activate();
    assert_eq!(*receiver.borrow(), FetchState::Loading);
    match fetcher.wait_for_completion().await {
        FetchState::Failure(reason) => assert!(reason.contains("503")),
        other => panic!("Expected Failure, got {:?}", other),
    }
    mock.assert_async().await;
}
