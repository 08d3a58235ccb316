use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use vmfleet_client::{ClientError, Credentials, HttpClient, RemoteApi};

/// Serve exactly one canned HTTP response and hand back the raw request
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (format!("http://{addr}/api/vms/"), handle)
}

/// Read request headers plus a `Content-Length` body
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn creds() -> Credentials {
    Credentials::new("admin@internal", "secret")
}

#[tokio::test]
async fn test_post_action_sends_auth_and_xml() {
    let (base, server) = serve_once(
        "200 OK",
        "<action><status><state>complete</state></status></action>",
    )
    .await;

    let client = HttpClient::new(&base, creds()).unwrap();
    let doc = client.post_action("101", "start").await.unwrap();
    assert_eq!(doc.text("action.status.state"), "complete");

    let request = server.await.unwrap();
    let lower = request.to_lowercase();
    assert!(request.starts_with("POST /api/vms/101/start HTTP/1.1"));
    assert!(lower.contains("content-type: application/xml"));
    // base64("admin@internal:secret")
    assert!(request.contains("Basic YWRtaW5AaW50ZXJuYWw6c2VjcmV0"));
    assert!(request.ends_with("<action/>"));
}

#[tokio::test]
async fn test_url_shaped_id_stays_on_api_host() {
    let (base, server) = serve_once(
        "200 OK",
        "<action><status><state>complete</state></status></action>",
    )
    .await;

    let client = HttpClient::new(&base, creds()).unwrap();
    client
        .post_action("//127.0.0.1:1/steal?x", "start")
        .await
        .unwrap();

    // the id arrives percent-encoded on the same server
    let request = server.await.unwrap();
    assert!(
        request.starts_with("POST /api/vms/%2F%2F127.0.0.1:1%2Fsteal%3Fx/start HTTP/1.1"),
        "{request}"
    );
}

#[tokio::test]
async fn test_fetch_vm() {
    let (base, server) = serve_once(
        "200 OK",
        r#"<vm id="101"><name>web1</name><status><state>up</state></status></vm>"#,
    )
    .await;

    let client = HttpClient::new(&base, creds()).unwrap();
    let doc = client.fetch("101").await.unwrap();
    assert_eq!(doc.text("vm.status.state"), "up");

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/vms/101 HTTP/1.1"));
}

#[tokio::test]
async fn test_error_status_uses_fault_detail() {
    let (base, server) = serve_once(
        "409 Conflict",
        "<fault><reason>Operation Failed</reason><detail>[VM is locked]</detail></fault>",
    )
    .await;

    let client = HttpClient::new(&base, creds()).unwrap();
    let err = client.post_action("7", "stop").await.unwrap_err();
    server.await.unwrap();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "[VM is locked]");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let (base, server) = serve_once("200 OK", "<vm><status>").await;

    let client = HttpClient::new(&base, creds()).unwrap();
    let err = client.fetch("9").await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, ClientError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    // bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpClient::new(format!("http://{addr}/api/vms/"), creds()).unwrap();
    let err = client.fetch("1").await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
}
