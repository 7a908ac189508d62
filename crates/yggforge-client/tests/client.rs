//! Integration tests for `YggdrasilClient`.
//!
//! The local backend runs against a real `MemoryAuthority`. The HTTP
//! backend runs against a tiny canned server on a loopback socket, so
//! these tests pin down response handling without needing the full
//! `yggforge` server (its own tests drive the client end to end).

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use yggforge_client::{ClientError, YggdrasilClient};
use yggforge_protocol::{
    AuthRequest, FORBIDDEN_OPERATION, InvalidateRequest, Profile,
    RefreshRequest, SignoutRequest, ValidateRequest, derive_from_name,
};
use yggforge_session::{AuthError, MemoryAuthority};

// =========================================================================
// Helpers
// =========================================================================

const USER: &str = "steve@example.com";
const PASS: &str = "hunter2";

fn local_client() -> YggdrasilClient {
    let authority = MemoryAuthority::default();
    let user_id = authority.register_user(USER, PASS).expect("register");
    authority.register_profile(user_id, "Steve").expect("profile");
    YggdrasilClient::local(Arc::new(authority))
}

fn login(client_token: Option<&str>, request_user: bool) -> AuthRequest {
    AuthRequest {
        agent: None,
        username: USER.into(),
        password: PASS.into(),
        client_token: client_token.map(str::to_string),
        request_user,
    }
}

fn validate(access_token: &str) -> ValidateRequest {
    ValidateRequest {
        access_token: access_token.into(),
        client_token: None,
    }
}

/// Serves exactly one request with a fixed status line and body, then
/// returns the base URL to point a client at.
async fn canned_server(status: &'static str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        read_request(&mut stream).await;

        let head = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).await.expect("write head");
        // Dribble the body out in small pieces to force several reads.
        for chunk in body.chunks(64 * 1024) {
            stream.write_all(chunk).await.expect("write body");
            stream.flush().await.expect("flush");
        }
        stream.shutdown().await.ok();
    });

    format!("http://{addr}")
}

/// Reads one request (headers plus `Content-Length` body) off the socket.
async fn read_request(stream: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.expect("read");
        assert!(n > 0, "client hung up mid-request");
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= end + 4 + length {
            return;
        }
    }
}

// =========================================================================
// Local backend
// =========================================================================

#[tokio::test]
async fn test_local_full_flow() {
    let client = local_client();
    assert!(!client.is_http());

    let first = client
        .authenticate(&login(Some("launcher"), true))
        .await
        .expect("login");
    assert_eq!(first.client_token, "launcher");
    let profile = first.selected_profile.as_ref().expect("profile");
    assert_eq!(profile.name, "Steve");
    assert_eq!(profile.id, derive_from_name("Steve").to_string());
    assert!(first.user.is_some());

    let second = client
        .refresh(&RefreshRequest {
            access_token: first.access_token.clone(),
            client_token: Some("launcher".into()),
            request_user: false,
            selected_profile: None,
        })
        .await
        .expect("refresh");
    assert!(second.user.is_none());
    assert!(!client.validate(&validate(&first.access_token)).await.expect("v1"));
    assert!(client.validate(&validate(&second.access_token)).await.expect("v2"));

    client
        .invalidate(&InvalidateRequest {
            access_token: second.access_token.clone(),
            client_token: "launcher".into(),
        })
        .await
        .expect("invalidate");
    assert!(!client.validate(&validate(&second.access_token)).await.expect("v3"));
}

#[tokio::test]
async fn test_local_bad_password_surfaces_auth_error() {
    let client = local_client();
    let mut req = login(None, false);
    req.password = "HUNTER2".into();

    let err = client.authenticate(&req).await.expect_err("wrong password");

    assert!(matches!(err, ClientError::Auth(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_local_refresh_with_selected_profile_is_rejected() {
    let client = local_client();
    let session = client.authenticate(&login(None, false)).await.expect("login");

    let err = client
        .refresh(&RefreshRequest {
            access_token: session.access_token.clone(),
            client_token: None,
            request_user: false,
            selected_profile: Some(Profile {
                id: derive_from_name("Alex").to_string(),
                name: "Alex".into(),
                properties: vec![],
            }),
        })
        .await
        .expect_err("bound token");

    assert!(matches!(err, ClientError::Protocol(_)));
    // The rejected refresh must not have consumed the token.
    assert!(client.validate(&validate(&session.access_token)).await.expect("v"));
}

#[tokio::test]
async fn test_local_sign_out_ends_every_session() {
    let client = local_client();
    let a = client.authenticate(&login(None, false)).await.expect("a");
    let b = client.authenticate(&login(None, false)).await.expect("b");

    client
        .sign_out(&SignoutRequest {
            username: USER.into(),
            password: PASS.into(),
        })
        .await
        .expect("sign out");

    assert!(!client.validate(&validate(&a.access_token)).await.expect("a"));
    assert!(!client.validate(&validate(&b.access_token)).await.expect("b"));
}

// =========================================================================
// HTTP backend
// =========================================================================

#[tokio::test]
async fn test_http_reads_bodies_larger_than_one_read() {
    // A 2 MiB client token makes the body far larger than any single
    // socket read.
    let client_token = "c".repeat(2 * 1024 * 1024);
    let body = serde_json::to_vec(&serde_json::json!({
        "accessToken": "at",
        "clientToken": client_token.clone(),
    }))
    .expect("encode");
    let base = canned_server("200 OK", body).await;
    let client = YggdrasilClient::http(base).expect("client");

    let resp = client.authenticate(&login(None, false)).await.expect("login");

    assert_eq!(resp.access_token, "at");
    assert_eq!(resp.client_token.len(), client_token.len());
}

#[tokio::test]
async fn test_http_validate_forbidden_is_false() {
    let body = br#"{"error":"ForbiddenOperationException","errorMessage":"Invalid token."}"#;
    let base = canned_server("403 Forbidden", body.to_vec()).await;
    let client = YggdrasilClient::http(base).expect("client");

    let valid = client.validate(&validate("nope")).await.expect("validate");

    assert!(!valid);
}

#[tokio::test]
async fn test_http_validate_no_content_is_true() {
    let base = canned_server("204 No Content", Vec::new()).await;
    let client = YggdrasilClient::http(base).expect("client");

    let valid = client.validate(&validate("at")).await.expect("validate");

    assert!(valid);
}

#[tokio::test]
async fn test_http_forbidden_login_is_api_error() {
    let body = br#"{"error":"ForbiddenOperationException","errorMessage":"Invalid credentials. Invalid username or password."}"#;
    let base = canned_server("403 Forbidden", body.to_vec()).await;
    let client = YggdrasilClient::http(base).expect("client");

    let err = client
        .authenticate(&login(None, false))
        .await
        .expect_err("forbidden");

    assert_eq!(err.kind(), Some(FORBIDDEN_OPERATION));
    match err {
        ClientError::Api { status, message, .. } => {
            assert_eq!(status.as_u16(), 403);
            assert_eq!(message, "Invalid credentials. Invalid username or password.");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_malformed_success_body_is_protocol_error() {
    let base = canned_server("200 OK", b"{\"accessToken\":".to_vec()).await;
    let client = YggdrasilClient::http(base).expect("client");

    let err = client
        .authenticate(&login(None, false))
        .await
        .expect_err("truncated json");

    assert!(matches!(err, ClientError::Protocol(_)));
}

#[tokio::test]
async fn test_http_unreachable_server_is_network_error() {
    // Grab a free port, then close it so nothing is listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let client = YggdrasilClient::http(format!("http://{addr}")).expect("client");

    let err = client.validate(&validate("at")).await.expect_err("refused");

    assert!(matches!(err, ClientError::Network(_)));
}
