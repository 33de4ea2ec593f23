// Device provisioning
//
// Turns a validated (code, quantity) request into a batch of hotspot users
// on the router. One session per request, opened here and closed on every
// path; item failures are isolated and never abort the rest of the batch.

use std::time::Duration;

use secrecy::SecretString;
use tracing::{debug, warn};

use vocer_api::routeros::Endpoint;
use vocer_api::ApiClient;

use crate::catalog::Catalog;
use crate::credential::{self, Credential};
use crate::error::CoreError;

/// Comment attached to every bot-issued hotspot user record.
pub const USER_COMMENT: &str = "vc-Telegram";

/// One open session on the provisioning target.
///
/// `close` consumes the session; the provisioning loop calls it exactly once
/// after the batch, on success and failure alike.
pub trait DeviceSession {
    fn add_user(
        &mut self,
        name: &str,
        password: &str,
        profile: &str,
        comment: &str,
    ) -> impl Future<Output = Result<(), vocer_api::Error>>;

    fn close(self) -> impl Future<Output = ()>;
}

/// Opens sessions on the provisioning target.
///
/// The seam the tests mock: a connector that counts `connect`/`add`/`close`
/// calls stands in for the router.
pub trait DeviceConnector {
    type Session: DeviceSession;

    fn connect(&self) -> impl Future<Output = Result<Self::Session, vocer_api::Error>>;

    /// Human-readable target address for error text.
    fn endpoint(&self) -> String;
}

/// One requested voucher's result: the generated credential plus the error
/// detail if the router rejected it.
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    pub credential: Credential,
    pub error: Option<String>,
}

impl ProvisionOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Parse a user-supplied quantity, distinguishing "not a number" from
/// "not positive".
pub fn parse_quantity(input: &str) -> Result<u32, CoreError> {
    let n: i64 = input.trim().parse().map_err(|_| CoreError::QuantityNotNumeric {
        input: input.into(),
    })?;
    if n <= 0 {
        return Err(CoreError::QuantityNotPositive);
    }
    u32::try_from(n).map_err(|_| CoreError::QuantityNotNumeric {
        input: input.into(),
    })
}

/// Batch provisioning client.
pub struct Provisioner<C> {
    catalog: Catalog,
    connector: C,
}

impl<C: DeviceConnector> Provisioner<C> {
    pub fn new(catalog: Catalog, connector: C) -> Self {
        Self { catalog, connector }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Provision `quantity` vouchers of type `code`.
    ///
    /// Unknown codes and a zero quantity fail before any device call.
    /// A session-acquisition failure is request-fatal (`Err`, no partial
    /// results). Otherwise the result has exactly `quantity` outcomes in
    /// generation order, with per-item rejections recorded inline.
    pub async fn provision(
        &self,
        code: &str,
        quantity: u32,
    ) -> Result<Vec<ProvisionOutcome>, CoreError> {
        let voucher = self
            .catalog
            .get(code)
            .ok_or_else(|| CoreError::UnknownCode { code: code.into() })?;
        if quantity == 0 {
            return Err(CoreError::QuantityNotPositive);
        }

        let mut session = self
            .connector
            .connect()
            .await
            .map_err(|e| CoreError::from_connect(self.connector.endpoint(), e))?;

        debug!(code, quantity, profile = %voucher.profile, "provisioning batch");

        #[allow(clippy::as_conversions)]
        let mut outcomes = Vec::with_capacity(quantity as usize);
        for _ in 0..quantity {
            let credential = credential::generate(&voucher.prefix);
            let error = match session
                .add_user(
                    &credential.username,
                    &credential.password,
                    &voucher.profile,
                    USER_COMMENT,
                )
                .await
            {
                Ok(()) => None,
                Err(e) => {
                    warn!(user = %credential.username, error = %e, "voucher creation failed");
                    Some(e.to_string())
                }
            };
            outcomes.push(ProvisionOutcome { credential, error });
        }

        session.close().await;
        Ok(outcomes)
    }
}

// ── Production connector ────────────────────────────────────────────

/// `DeviceConnector` backed by the RouterOS API client.
pub struct RouterConnector {
    endpoint: Endpoint,
    username: String,
    password: SecretString,
    connect_timeout: Duration,
}

impl RouterConnector {
    pub fn new(
        endpoint: Endpoint,
        username: String,
        password: SecretString,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            endpoint,
            username,
            password,
            connect_timeout,
        }
    }
}

impl DeviceConnector for RouterConnector {
    type Session = ApiClient;

    async fn connect(&self) -> Result<ApiClient, vocer_api::Error> {
        ApiClient::connect(
            &self.endpoint,
            &self.username,
            &self.password,
            self.connect_timeout,
        )
        .await
    }

    fn endpoint(&self) -> String {
        self.endpoint.to_string()
    }
}

impl DeviceSession for ApiClient {
    async fn add_user(
        &mut self,
        name: &str,
        password: &str,
        profile: &str,
        comment: &str,
    ) -> Result<(), vocer_api::Error> {
        self.add_hotspot_user(name, password, profile, comment).await
    }

    async fn close(self) {
        ApiClient::close(self).await;
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod testutil {
    //! Mock connector shared by the provisioning and engine tests.

    use std::sync::{Arc, Mutex};

    use super::{DeviceConnector, DeviceSession};

    #[derive(Debug, Default)]
    pub struct Calls {
        pub connects: usize,
        pub adds: Vec<(String, String)>, // (username, profile)
        pub closes: usize,
    }

    #[derive(Clone, Default)]
    pub struct MockConnector {
        pub fail_connect: bool,
        /// 0-based indices of add calls that should be rejected.
        pub fail_adds: Vec<usize>,
        pub calls: Arc<Mutex<Calls>>,
    }

    impl MockConnector {
        pub fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
            self.calls.lock().expect("calls mutex")
        }
    }

    pub struct MockSession {
        fail_adds: Vec<usize>,
        seen: usize,
        calls: Arc<Mutex<Calls>>,
    }

    impl DeviceConnector for MockConnector {
        type Session = MockSession;

        async fn connect(&self) -> Result<MockSession, vocer_api::Error> {
            self.calls().connects += 1;
            if self.fail_connect {
                return Err(vocer_api::Error::Connect {
                    endpoint: self.endpoint(),
                    reason: "connection refused".into(),
                });
            }
            Ok(MockSession {
                fail_adds: self.fail_adds.clone(),
                seen: 0,
                calls: Arc::clone(&self.calls),
            })
        }

        fn endpoint(&self) -> String {
            "192.0.2.1:8728".into()
        }
    }

    impl DeviceSession for MockSession {
        async fn add_user(
            &mut self,
            name: &str,
            _password: &str,
            profile: &str,
            _comment: &str,
        ) -> Result<(), vocer_api::Error> {
            let index = self.seen;
            self.seen += 1;
            self.calls
                .lock()
                .expect("calls mutex")
                .adds
                .push((name.to_owned(), profile.to_owned()));
            if self.fail_adds.contains(&index) {
                return Err(vocer_api::Error::Trap {
                    message: "failure: already have user with this name".into(),
                });
            }
            Ok(())
        }

        async fn close(self) {
            self.calls.lock().expect("calls mutex").closes += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::testutil::MockConnector;
    use super::*;
    use crate::catalog::VoucherType;

    fn catalog() -> Catalog {
        Catalog::new([VoucherType {
            code: "4r".into(),
            prefix: "4R".into(),
            profile: "4Rb-24Jam".into(),
            price: "Rp4.000".into(),
        }])
        .unwrap()
    }

    #[tokio::test]
    async fn batch_size_matches_quantity() {
        let connector = MockConnector::default();
        let provisioner = Provisioner::new(catalog(), connector.clone());

        for n in 1..=4u32 {
            let outcomes = provisioner.provision("4r", n).await.unwrap();
            assert_eq!(outcomes.len(), n as usize);
            assert!(outcomes.iter().all(ProvisionOutcome::is_success));
        }

        let calls = connector.calls();
        assert_eq!(calls.connects, 4);
        assert_eq!(calls.closes, 4);
        assert_eq!(calls.adds.len(), 1 + 2 + 3 + 4);
        assert!(calls.adds.iter().all(|(user, profile)| {
            user.starts_with("4R") && profile == "4Rb-24Jam"
        }));
    }

    #[tokio::test]
    async fn unknown_code_makes_no_device_calls() {
        let connector = MockConnector::default();
        let provisioner = Provisioner::new(catalog(), connector.clone());

        let err = provisioner.provision("9z", 3).await.unwrap_err();
        assert!(matches!(err, CoreError::UnknownCode { ref code } if code == "9z"));

        let calls = connector.calls();
        assert_eq!(calls.connects, 0);
        assert_eq!(calls.adds.len(), 0);
        assert_eq!(calls.closes, 0);
    }

    #[tokio::test]
    async fn connect_failure_is_request_fatal_with_no_adds() {
        let connector = MockConnector {
            fail_connect: true,
            ..MockConnector::default()
        };
        let provisioner = Provisioner::new(catalog(), connector.clone());

        let err = provisioner.provision("4r", 4).await.unwrap_err();
        assert!(
            matches!(err, CoreError::Connection { ref endpoint, .. } if endpoint == "192.0.2.1:8728")
        );

        let calls = connector.calls();
        assert_eq!(calls.adds.len(), 0);
        assert_eq!(calls.closes, 0, "no session to close");
    }

    #[tokio::test]
    async fn item_failure_does_not_abort_siblings() {
        let connector = MockConnector {
            fail_adds: vec![1],
            ..MockConnector::default()
        };
        let provisioner = Provisioner::new(catalog(), connector.clone());

        let outcomes = provisioner.provision("4r", 3).await.unwrap();
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_success());
        assert!(!outcomes[1].is_success());
        assert!(outcomes[2].is_success());
        assert!(
            outcomes[1]
                .error
                .as_deref()
                .unwrap()
                .contains("already have user")
        );

        let calls = connector.calls();
        assert_eq!(calls.adds.len(), 3);
        assert_eq!(calls.closes, 1, "session closed exactly once");
    }

    #[tokio::test]
    async fn zero_quantity_rejected_before_connect() {
        let connector = MockConnector::default();
        let provisioner = Provisioner::new(catalog(), connector.clone());

        let err = provisioner.provision("4r", 0).await.unwrap_err();
        assert!(matches!(err, CoreError::QuantityNotPositive));
        assert_eq!(connector.calls().connects, 0);
    }

    #[test]
    fn quantity_parsing() {
        assert_eq!(parse_quantity("3").unwrap(), 3);
        assert_eq!(parse_quantity(" 12 ").unwrap(), 12);
        assert!(matches!(
            parse_quantity("abc"),
            Err(CoreError::QuantityNotNumeric { .. })
        ));
        assert!(matches!(
            parse_quantity("0"),
            Err(CoreError::QuantityNotPositive)
        ));
        assert!(matches!(
            parse_quantity("-1"),
            Err(CoreError::QuantityNotPositive)
        ));
    }
}
