// RouterOS API session
//
// Wraps a `tokio::net::TcpStream` with sentence framing and the post-6.43
// plaintext login. One session per provisioning request; callers must
// `close()` when done (best-effort, failures ignored).

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::Error;
use crate::routeros::endpoint::Endpoint;
use crate::routeros::proto::{self, Sentence};

/// An authenticated connection to a router's API service.
pub struct ApiClient {
    stream: TcpStream,
    endpoint: String,
}

impl ApiClient {
    /// Dial the router and log in.
    ///
    /// The timeout bounds the TCP dial only; command round-trips are
    /// unbounded, matching the behavior of the API service itself.
    pub async fn connect(
        endpoint: &Endpoint,
        username: &str,
        password: &SecretString,
        connect_timeout: Duration,
    ) -> Result<Self, Error> {
        debug!(%endpoint, "dialing router");

        let dial = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
        let stream = tokio::time::timeout(connect_timeout, dial)
            .await
            .map_err(|_| Error::Connect {
                endpoint: endpoint.to_string(),
                reason: format!("connect timed out after {}s", connect_timeout.as_secs()),
            })?
            .map_err(|e| Error::Connect {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let mut client = Self {
            stream,
            endpoint: endpoint.to_string(),
        };
        client.login(username, password).await?;
        Ok(client)
    }

    /// The `host:port` this session was dialed against.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn login(&mut self, username: &str, password: &SecretString) -> Result<(), Error> {
        let name = format!("=name={username}");
        let pass = format!("=password={}", password.expose_secret());
        let replies = self
            .command(&["/login", &name, &pass])
            .await
            .map_err(|e| match e {
                Error::Trap { message } => Error::Authentication { message },
                other => other,
            })?;

        // A =ret= challenge means the router expects the pre-6.43 MD5 login,
        // which this client does not speak.
        if replies.iter().any(|s| s.attribute("ret").is_some()) {
            return Err(Error::Authentication {
                message: "router requires the pre-6.43 challenge login".into(),
            });
        }

        debug!(endpoint = %self.endpoint, "logged in");
        Ok(())
    }

    /// Run one command sentence and collect replies until `!done`.
    ///
    /// Returns the `!re` data sentences plus the terminal `!done` (whose
    /// attributes matter for `/login`). A `!trap` anywhere in the reply
    /// stream becomes `Error::Trap` (after draining through `!done`);
    /// `!fatal` ends the session immediately.
    pub async fn command(&mut self, words: &[&str]) -> Result<Vec<Sentence>, Error> {
        self.write_sentence(words).await?;

        let mut data = Vec::new();
        let mut trap: Option<String> = None;

        loop {
            let sentence = self.read_sentence().await?;
            match sentence.reply_tag() {
                Some("!re") => data.push(sentence),
                Some("!done") => {
                    data.push(sentence);
                    break;
                }
                Some("!trap") => {
                    let message = sentence
                        .attribute("message")
                        .unwrap_or("unspecified trap")
                        .to_owned();
                    // keep the first trap; the router still sends !done
                    trap.get_or_insert(message);
                }
                Some("!fatal") => {
                    let message = sentence.words.get(1).cloned().unwrap_or_default();
                    return Err(Error::Fatal { message });
                }
                other => {
                    return Err(Error::Protocol(format!(
                        "unexpected reply tag {other:?}"
                    )));
                }
            }
        }

        match trap {
            Some(message) => Err(Error::Trap { message }),
            None => Ok(data),
        }
    }

    /// Create one hotspot user record.
    pub async fn add_hotspot_user(
        &mut self,
        name: &str,
        password: &str,
        profile: &str,
        comment: &str,
    ) -> Result<(), Error> {
        debug!(user = name, profile, "adding hotspot user");
        self.command(&[
            "/ip/hotspot/user/add",
            &format!("=name={name}"),
            &format!("=password={password}"),
            &format!("=profile={profile}"),
            &format!("=comment={comment}"),
        ])
        .await?;
        Ok(())
    }

    /// Shut the session down. Failures are ignored; the router drops the
    /// login with the TCP connection.
    pub async fn close(mut self) {
        let _ = self.stream.shutdown().await;
    }

    // ── Framing ─────────────────────────────────────────────────────

    async fn write_sentence(&mut self, words: &[&str]) -> Result<(), Error> {
        let mut buf = Vec::new();
        for word in words {
            let bytes = word.as_bytes();
            let len = u32::try_from(bytes.len())
                .map_err(|_| Error::Protocol(format!("word too long: {} bytes", bytes.len())))?;
            buf.extend_from_slice(&proto::encode_length(len));
            buf.extend_from_slice(bytes);
        }
        buf.push(0x00); // sentence terminator
        self.stream.write_all(&buf).await?;
        Ok(())
    }

    async fn read_sentence(&mut self) -> Result<Sentence, Error> {
        let mut words = Vec::new();
        loop {
            match self.read_word().await? {
                Some(word) => words.push(word),
                None => {
                    if words.is_empty() {
                        // empty keepalive sentence, keep reading
                        continue;
                    }
                    return Ok(Sentence { words });
                }
            }
        }
    }

    /// Read one word; `None` is the zero-length sentence terminator.
    #[allow(clippy::as_conversions)]
    async fn read_word(&mut self) -> Result<Option<String>, Error> {
        let first = self.stream.read_u8().await?;
        let cont = proto::continuation_bytes(first)?;
        let mut rest = vec![0u8; cont];
        if cont > 0 {
            self.stream.read_exact(&mut rest).await?;
        }
        let len = proto::decode_length(first, &rest);
        if len == 0 {
            return Ok(None);
        }

        let mut body = vec![0u8; len as usize];
        self.stream.read_exact(&mut body).await?;
        Ok(Some(String::from_utf8_lossy(&body).into_owned()))
    }
}
