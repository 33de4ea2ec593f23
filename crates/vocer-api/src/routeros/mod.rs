// RouterOS API client modules
//
// Hand-written client for the RouterOS binary API (the protocol behind
// /ip/hotspot/user and friends, default TCP port 8728). Framing lives in
// `proto`, address parsing in `endpoint`, and the session itself in `client`.

pub mod client;
pub mod endpoint;
pub mod proto;

pub use client::ApiClient;
pub use endpoint::Endpoint;
pub use proto::Sentence;

/// Default port of the plaintext RouterOS API service.
pub const DEFAULT_API_PORT: u16 = 8728;
