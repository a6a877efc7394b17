use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use keepsake_llm::{AnthropicClient, ChatMessage, LlmError, MessagesRequest};

/// One-shot HTTP server that answers every connection with the given status
/// line and body, then closes.
async fn spawn_canned_server(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 8192];
        let _ = socket.read(&mut request).await;

        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_rate_limited_stream_request_fails_with_no_events() {
    let base_url = spawn_canned_server(
        "429 Too Many Requests",
        r#"{"type":"error","error":{"type":"rate_limit_error","message":"Too many requests"}}"#,
    )
    .await;

    let client = AnthropicClient::new("test-key")
        .unwrap()
        .with_base_url(base_url);
    let request = MessagesRequest::new("test-model", vec![ChatMessage::user("Hello")]);

    // The status check fails the call before any stream exists, so the
    // caller sees exactly one error and zero delta or done events.
    let err = client
        .messages_stream(&request)
        .await
        .err()
        .expect("non-success status must fail the request");

    assert!(err.is_rate_limited());
    assert!(!err.is_payment_required());
    match err {
        LlmError::Upstream { status, message } => {
            assert_eq!(status.as_u16(), 429);
            assert!(message.contains("rate_limit_error"));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_payment_required_stream_request_fails_with_no_events() {
    let base_url = spawn_canned_server(
        "402 Payment Required",
        r#"{"type":"error","error":{"type":"billing_error","message":"Insufficient credits"}}"#,
    )
    .await;

    let client = AnthropicClient::new("test-key")
        .unwrap()
        .with_base_url(base_url);
    let request = MessagesRequest::new("test-model", vec![ChatMessage::user("Hello")]);

    let err = client
        .messages_stream(&request)
        .await
        .err()
        .expect("non-success status must fail the request");

    assert!(err.is_payment_required());
    assert!(!err.is_rate_limited());
}
