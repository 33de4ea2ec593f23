#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` against an in-process fake router.
//
// The fake speaks just enough of the API framing for these tests: all words
// fit in a single-byte length prefix.

use std::time::Duration;

use secrecy::SecretString;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use vocer_api::routeros::Endpoint;
use vocer_api::{ApiClient, Error};

const TIMEOUT: Duration = Duration::from_secs(5);

// ── Fake router plumbing ────────────────────────────────────────────

async fn read_sentence(stream: &mut TcpStream) -> Vec<String> {
    let mut words = Vec::new();
    loop {
        let len = stream.read_u8().await.unwrap() as usize;
        if len == 0 {
            return words;
        }
        assert!(len < 0x80, "fake router only handles short words");
        let mut buf = vec![0u8; len];
        stream.read_exact(&mut buf).await.unwrap();
        words.push(String::from_utf8(buf).unwrap());
    }
}

async fn write_sentence(stream: &mut TcpStream, words: &[&str]) {
    let mut buf = Vec::new();
    for word in words {
        assert!(word.len() < 0x80);
        buf.push(word.len() as u8);
        buf.extend_from_slice(word.as_bytes());
    }
    buf.push(0x00);
    stream.write_all(&buf).await.unwrap();
}

async fn listen() -> (TcpListener, Endpoint) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let endpoint = Endpoint {
        host: "127.0.0.1".into(),
        port,
    };
    (listener, endpoint)
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_and_add_user() {
    let (listener, endpoint) = listen().await;

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let login = read_sentence(&mut stream).await;
        assert_eq!(login[0], "/login");
        assert!(login.contains(&"=name=admin".to_string()));
        assert!(login.contains(&"=password=hunter2".to_string()));
        write_sentence(&mut stream, &["!done"]).await;

        let add = read_sentence(&mut stream).await;
        assert_eq!(add[0], "/ip/hotspot/user/add");
        assert!(add.contains(&"=name=4RABCDEF".to_string()));
        assert!(add.contains(&"=password=4RABCDEF".to_string()));
        assert!(add.contains(&"=profile=4Rb-24Jam".to_string()));
        assert!(add.contains(&"=comment=vc-Telegram".to_string()));
        write_sentence(&mut stream, &["!done"]).await;
    });

    let mut client = ApiClient::connect(&endpoint, "admin", &secret("hunter2"), TIMEOUT)
        .await
        .unwrap();
    client
        .add_hotspot_user("4RABCDEF", "4RABCDEF", "4Rb-24Jam", "vc-Telegram")
        .await
        .unwrap();
    client.close().await;

    server.await.unwrap();
}

#[tokio::test]
async fn test_login_trap_is_authentication_error() {
    let (listener, endpoint) = listen().await;

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_sentence(&mut stream).await;
        write_sentence(&mut stream, &["!trap", "=message=invalid user name or password"]).await;
        write_sentence(&mut stream, &["!done"]).await;
    });

    let result = ApiClient::connect(&endpoint, "admin", &secret("wrong"), TIMEOUT).await;

    match result {
        Err(Error::Authentication { message }) => {
            assert!(message.contains("invalid user name"));
        }
        other => panic!("expected Authentication error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_duplicate_user_trap() {
    let (listener, endpoint) = listen().await;

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_sentence(&mut stream).await;
        write_sentence(&mut stream, &["!done"]).await;

        read_sentence(&mut stream).await;
        write_sentence(
            &mut stream,
            &["!trap", "=message=failure: already have user with this name"],
        )
        .await;
        write_sentence(&mut stream, &["!done"]).await;
    });

    let mut client = ApiClient::connect(&endpoint, "admin", &secret("hunter2"), TIMEOUT)
        .await
        .unwrap();
    let err = client
        .add_hotspot_user("4RABCDEF", "4RABCDEF", "4Rb-24Jam", "vc-Telegram")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Trap { .. }), "got {err:?}");
    assert!(err.is_conflict());
    client.close().await;
}

#[tokio::test]
async fn test_connection_refused() {
    // bind then drop to get a port with nothing listening
    let (listener, endpoint) = listen().await;
    drop(listener);

    let result = ApiClient::connect(&endpoint, "admin", &secret("x"), TIMEOUT).await;

    match result {
        Err(Error::Connect { endpoint: ep, .. }) => {
            assert_eq!(ep, endpoint.to_string());
        }
        other => panic!("expected Connect error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_fatal_reply_kills_session() {
    let (listener, endpoint) = listen().await;

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_sentence(&mut stream).await;
        write_sentence(&mut stream, &["!fatal", "session limit reached"]).await;
    });

    let result = ApiClient::connect(&endpoint, "admin", &secret("x"), TIMEOUT).await;
    assert!(
        matches!(result, Err(Error::Fatal { ref message }) if message.contains("session limit")),
        "got {:?}",
        result.err()
    );
}
