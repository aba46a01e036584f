use email_indexer::config::{INDEX_NAME, SearchConfig};
use email_indexer::models::{EmailPage, EmailRecord};
use email_indexer::routes::emails::search_emails;
use email_indexer::search::{SearchClient, SearchError};
use email_indexer::test_support::TestRocketBuilder;
use rocket::http::Status;
use rocket::routes;
use serde_json::Value;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

fn search_config(base_url: &str) -> SearchConfig {
    SearchConfig {
        base_url: base_url.to_string(),
        username: "admin".into(),
        password: "secret".into(),
        index: INDEX_NAME.into(),
        request_timeout: Duration::from_secs(5),
    }
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let read = socket.read(&mut chunk).await.unwrap();
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);

        let Some(header_end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buffer[..header_end]).to_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buffer.len() >= header_end + 4 + content_length {
            break;
        }
    }

    String::from_utf8_lossy(&buffer).into_owned()
}

/// Serve exactly one canned response and hand back the raw request.
async fn one_shot_index(status_line: &'static str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let body = body.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{address}/api"), handle)
}

#[tokio::test]
async fn search_route_pages_through_index_hits() {
    let hits = r#"{
        "hits": {
            "total": {"value": 12},
            "hits": [
                {"_source": {"message_id": "<11@x>", "subject": "forecast q3", "date": ""}},
                {"_source": {"message_id": "<12@x>", "subject": "forecast q4", "date": null}}
            ]
        }
    }"#;
    let (base_url, server) = one_shot_index("200 OK", hits).await;
    let search = SearchClient::new(search_config(&base_url)).unwrap();

    let client = TestRocketBuilder::new()
        .manage_search_client(search)
        .mount_routes(routes![search_emails])
        .async_client()
        .await;

    let response = client
        .get("/emails/search?query=forecast&page=2&limit=10")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let page: EmailPage<EmailRecord> = response.into_json().await.expect("page payload");
    assert_eq!(page.total, 12);
    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 2);
    assert!(!page.has_next);
    assert!(page.has_prev);
    assert_eq!(page.emails.len(), 2);
    assert_eq!(page.emails[0].date.as_deref(), Some(""));
    assert_eq!(page.emails[1].date, None);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/emails_prueba/_search "));
    let lowered = request.to_lowercase();
    assert!(lowered.contains("authorization: basic ywrtaw46c2vjcmv0"));
    assert!(request.contains(r#""subject":"forecast""#));
    assert!(request.contains(r#""from":10"#));
    assert!(request.contains(r#""size":10"#));
}

#[tokio::test]
async fn search_route_reports_index_failure_as_bad_gateway() {
    let (base_url, server) = one_shot_index("500 Internal Server Error", r#"{"error":"boom"}"#).await;
    let search = SearchClient::new(search_config(&base_url)).unwrap();

    let client = TestRocketBuilder::new()
        .manage_search_client(search)
        .mount_routes(routes![search_emails])
        .async_client()
        .await;

    let response = client.get("/emails/search?query=anything").dispatch().await;
    assert_eq!(response.status(), Status::BadGateway);

    let body: Value = response.into_json().await.expect("error payload");
    assert_eq!(body["error"], "SearchError");
    server.await.unwrap();
}

#[tokio::test]
async fn search_route_rejects_empty_query_and_large_limit() {
    // Nothing listens here; validation must fail before any request.
    let search = SearchClient::new(search_config("http://127.0.0.1:9/api")).unwrap();
    let client = TestRocketBuilder::new()
        .manage_search_client(search)
        .mount_routes(routes![search_emails])
        .async_client()
        .await;

    let response = client.get("/emails/search").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);

    let response = client.get("/emails/search?query=").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);

    let response = client
        .get("/emails/search?query=forecast&limit=101")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.expect("error payload");
    assert_eq!(body["details"]["max_limit"], 100);
    assert_eq!(body["details"]["requested_limit"], 101);
}

#[tokio::test]
async fn search_route_rejects_page_whose_offset_overflows() {
    let search = SearchClient::new(search_config("http://127.0.0.1:9/api")).unwrap();
    let client = TestRocketBuilder::new()
        .manage_search_client(search)
        .mount_routes(routes![search_emails])
        .async_client()
        .await;

    let response = client
        .get("/emails/search?query=x&page=9223372036854775807&limit=100")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.expect("error payload");
    assert_eq!(body["error"], "BadRequest");
}

#[tokio::test]
async fn index_document_accepts_created() {
    let (base_url, server) = one_shot_index("201 Created", r#"{"id":"abc"}"#).await;
    let search = SearchClient::new(search_config(&base_url)).unwrap();

    let record = EmailRecord {
        message_id: "<1@x>".into(),
        subject: "Hi".into(),
        date: Some(String::new()),
        ..EmailRecord::default()
    };
    search.index_document(&record).await.unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/emails_prueba/_doc "));
    assert!(request.contains(r#""message_id":"<1@x>""#));
    assert!(request.contains(r#""date":"""#));
}

#[tokio::test]
async fn index_document_accepts_ok() {
    let (base_url, server) = one_shot_index("200 OK", r#"{"id":"def"}"#).await;
    let search = SearchClient::new(search_config(&base_url)).unwrap();

    let record = EmailRecord {
        message_id: "<2@x>".into(),
        subject: "Updated".into(),
        ..EmailRecord::default()
    };
    search.index_document(&record).await.unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/emails_prueba/_doc "));
    assert!(request.contains(r#""message_id":"<2@x>""#));
}

#[tokio::test]
async fn index_document_sends_absent_date_as_null() {
    let (base_url, server) = one_shot_index("201 Created", r#"{"id":"ghi"}"#).await;
    let search = SearchClient::new(search_config(&base_url)).unwrap();

    let record = EmailRecord {
        message_id: "<3@x>".into(),
        date: None,
        ..EmailRecord::default()
    };
    search.index_document(&record).await.unwrap();

    let request = server.await.unwrap();
    assert!(request.contains(r#""date":null"#));
    assert!(!request.contains(r#""date":"""#));
}

#[tokio::test]
async fn index_document_surfaces_rejection() {
    let (base_url, server) = one_shot_index("400 Bad Request", r#"{"error":"bad doc"}"#).await;
    let search = SearchClient::new(search_config(&base_url)).unwrap();

    let err = search
        .index_document(&EmailRecord::default())
        .await
        .unwrap_err();
    match err {
        SearchError::Status { status, body } => {
            assert_eq!(status.as_u16(), 400);
            assert!(body.contains("bad doc"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    server.await.unwrap();
}
