// Router endpoint parsing
//
// Config carries the router address as a single string. Accepted forms:
// `host`, `host:port`, and `[v6addr]:port`. A bare IPv6 literal (more than
// one colon, no brackets) is taken as a host with the default port.

use std::fmt;

use crate::error::Error;

/// A resolved `host` + `port` pair for the RouterOS API service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Parse `host`, `host:port`, or `[v6addr]:port`, falling back to
    /// `default_port` when no port is given.
    pub fn parse(input: &str, default_port: u16) -> Result<Self, Error> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::InvalidEndpoint {
                input: input.into(),
                reason: "empty host".into(),
            });
        }

        if let Some(rest) = input.strip_prefix('[') {
            let Some((host, suffix)) = rest.split_once(']') else {
                return Err(Error::InvalidEndpoint {
                    input: input.into(),
                    reason: "unclosed '[' in IPv6 address".into(),
                });
            };
            if host.is_empty() {
                return Err(Error::InvalidEndpoint {
                    input: input.into(),
                    reason: "empty host".into(),
                });
            }
            let port = if suffix.is_empty() {
                default_port
            } else if let Some(raw) = suffix.strip_prefix(':') {
                parse_port(input, raw)?
            } else {
                return Err(Error::InvalidEndpoint {
                    input: input.into(),
                    reason: format!("expected ':' after ']', got '{suffix}'"),
                });
            };
            return Ok(Self { host: host.into(), port });
        }

        match input.matches(':').count() {
            0 => Ok(Self {
                host: input.into(),
                port: default_port,
            }),
            1 => {
                // split_once cannot fail here, one ':' is present
                let (host, port) = input.split_once(':').unwrap_or((input, ""));
                if host.is_empty() {
                    return Err(Error::InvalidEndpoint {
                        input: input.into(),
                        reason: "empty host".into(),
                    });
                }
                Ok(Self {
                    host: host.into(),
                    port: parse_port(input, port)?,
                })
            }
            // bare IPv6 literal
            _ => Ok(Self {
                host: input.into(),
                port: default_port,
            }),
        }
    }
}

fn parse_port(input: &str, raw: &str) -> Result<u16, Error> {
    let port: u16 = raw.parse().map_err(|_| Error::InvalidEndpoint {
        input: input.into(),
        reason: format!("invalid port '{raw}' (expected 1-65535)"),
    })?;
    if port == 0 {
        return Err(Error::InvalidEndpoint {
            input: input.into(),
            reason: "port 0 is not usable".into(),
        });
    }
    Ok(port)
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
