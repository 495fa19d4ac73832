//! The Openprovider implementation of [`Solver`].
use crate::error::Error;
use crate::openprovider::{self, Operation, RecordType, ZoneClient};
use crate::secrets::{
    ClusterConfig, DynSecretStore, KubeSecretStore, SecretStore, SecretStoreError,
};
use crate::solver::{ChallengeRequest, ProviderConfig, Shutdown, Solver};
use secrecy::SecretString;
use std::sync::Arc;

pub const SOLVER_NAME: &str = "openprovider-solver";

/// TTL, in seconds, of the TXT records the solver creates.
pub const TXT_RECORD_TTL: u32 = 200;

/// Presents DNS-01 challenges as TXT records in Openprovider hosted zones.
///
/// The API key is read from the secret referenced by each issuer's config on every call.
pub struct OpenproviderSolver {
    zones: ZoneClient,
    secrets: Option<DynSecretStore>,
}

impl OpenproviderSolver {
    /// A solver that still needs [`Solver::initialize`] before it can serve challenges.
    #[must_use]
    pub fn new(zones: ZoneClient) -> Self {
        Self {
            zones,
            secrets: None,
        }
    }

    /// A ready-to-use solver reading API keys from `secrets`.
    #[must_use]
    pub fn with_secret_store(zones: ZoneClient, secrets: DynSecretStore) -> Self {
        Self {
            zones,
            secrets: Some(secrets),
        }
    }

    async fn update(&self, ch: &ChallengeRequest, operation: Operation) -> Result<(), Error> {
        let secrets = self
            .secrets
            .as_ref()
            .ok_or_else(|| Error::Config("solver used before initialization".into()))?;
        let cfg = ProviderConfig::decode(ch.config.as_ref())?;
        let api_key = api_key_from_secret(secrets.as_ref(), &cfg, &ch.resource_namespace).await?;

        let update = openprovider::build(
            &ch.resolved_fqdn,
            &ch.resolved_zone,
            TXT_RECORD_TTL,
            RecordType::Txt,
            &ch.key,
            operation,
        );
        self.zones.update_zone(&api_key, &update).await
    }
}

#[async_trait::async_trait]
impl Solver for OpenproviderSolver {
    fn name(&self) -> &'static str {
        SOLVER_NAME
    }

    fn initialize(&mut self, cluster: &ClusterConfig, _shutdown: Shutdown) -> Result<(), Error> {
        let store = KubeSecretStore::new(cluster)?;
        tracing::debug!(server = %cluster.server, "secret store client ready");
        self.secrets = Some(Arc::new(store));
        Ok(())
    }

    async fn present(&self, ch: &ChallengeRequest) -> Result<(), Error> {
        tracing::info!(
            fqdn = %ch.resolved_fqdn,
            zone = %ch.resolved_zone,
            "presenting TXT record"
        );
        self.update(ch, Operation::Add).await
    }

    async fn cleanup(&self, ch: &ChallengeRequest) -> Result<(), Error> {
        tracing::info!(
            fqdn = %ch.resolved_fqdn,
            zone = %ch.resolved_zone,
            "cleaning up TXT record"
        );
        self.update(ch, Operation::Remove).await
    }
}

/// Resolve the API key referenced by `cfg` from the secret store. Surrounding whitespace (e.g. a
/// trailing newline from `kubectl create secret --from-file`) is dropped.
async fn api_key_from_secret(
    store: &(dyn SecretStore + Send + Sync),
    cfg: &ProviderConfig,
    namespace: &str,
) -> Result<SecretString, Error> {
    let selector = &cfg.api_key_secret_ref;
    if selector.name.is_empty() {
        return Err(SecretStoreError::NotFound {
            namespace: namespace.to_string(),
            name: selector.name.clone(),
        }
        .into());
    }

    let mut data = store.get(namespace, &selector.name).await?;
    let raw = data.remove(&selector.key).ok_or_else(|| Error::SecretKey {
        key: selector.key.clone(),
        namespace: namespace.to_string(),
        name: selector.name.clone(),
    })?;
    let api_key = String::from_utf8(raw).map_err(|_| SecretStoreError::InvalidData {
        namespace: namespace.to_string(),
        name: selector.name.clone(),
        reason: format!("field \"{}\" is not UTF-8", selector.key),
    })?;
    Ok(SecretString::from(api_key.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openprovider::ZoneUpdateRequest;
    use crate::secrets::{InMemorySecretStore, SecretData};
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use wiremock::{matchers, Mock, MockServer, Request, Respond, ResponseTemplate};

    fn challenge() -> ChallengeRequest {
        ChallengeRequest {
            resolved_fqdn: "_acme-challenge.example.com.".to_string(),
            resolved_zone: "example.com".to_string(),
            key: "abc123".to_string(),
            resource_namespace: "default".to_string(),
            config: Some(json!({ "apiKeySecretRef": { "name": "op-creds", "key": "api-key" } })),
            ..ChallengeRequest::default()
        }
    }

    fn test_solver(base_url: &str) -> OpenproviderSolver {
        let secrets =
            InMemorySecretStore::default().with_field("default", "op-creds", "api-key", "TOKEN\n");
        OpenproviderSolver::with_secret_store(
            ZoneClient::new(base_url, Duration::from_secs(5)).unwrap(),
            Arc::new(secrets),
        )
    }

    /// A stand-in for the zone API that applies Add/Remove sets to a record set.
    #[derive(Clone, Default)]
    struct FakeZone {
        records: Arc<Mutex<HashSet<(String, String)>>>,
    }

    impl FakeZone {
        fn contains(&self, name: &str, value: &str) -> bool {
            self.records
                .lock()
                .unwrap()
                .contains(&(name.to_string(), value.to_string()))
        }
    }

    impl Respond for FakeZone {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let Ok(update) = serde_json::from_slice::<ZoneUpdateRequest>(&request.body) else {
                return ResponseTemplate::new(400);
            };
            let mut records = self.records.lock().unwrap();
            for r in update.records.add {
                records.insert((r.name, r.value));
            }
            for r in update.records.remove {
                records.remove(&(r.name, r.value));
            }
            ResponseTemplate::new(200)
        }
    }

    #[tokio::test]
    async fn present_adds_txt_record() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("PUT"))
            .and(matchers::path("/v1beta/dns/zones/example.com"))
            .and(matchers::header("Authorization", "Bearer TOKEN"))
            .and(matchers::body_json(json!({
                "Name": "example.com",
                "records": {
                    "Add": [{
                        "Name": "_acme-challenge.example.com.",
                        "Prio": 0,
                        "Ttl": 200,
                        "type": "txt",
                        "Value": "abc123",
                    }],
                },
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        test_solver(&mock_server.uri())
            .present(&challenge())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn present_surfaces_provider_status() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("PUT"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = test_solver(&mock_server.uri())
            .present(&challenge())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProviderApi { status: 403 }));
    }

    #[tokio::test]
    async fn cleanup_removes_only_matching_value() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("PUT"))
            .and(matchers::path("/v1beta/dns/zones/example.com"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        test_solver(&mock_server.uri())
            .cleanup(&challenge())
            .await
            .unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(
            body["records"]["Remove"],
            json!([{
                "Name": "_acme-challenge.example.com.",
                "Prio": 0,
                "Ttl": 200,
                "type": "txt",
                "Value": "abc123",
            }])
        );
        assert!(body["records"].get("Add").is_none());
        assert!(body["records"].get("Replace").is_none());
    }

    #[tokio::test]
    async fn present_then_cleanup_leaves_no_record() {
        let mock_server = MockServer::start().await;
        let zone = FakeZone::default();
        Mock::given(matchers::method("PUT"))
            .and(matchers::path("/v1beta/dns/zones/example.com"))
            .respond_with(zone.clone())
            .mount(&mock_server)
            .await;

        let solver = test_solver(&mock_server.uri());
        let mut other = challenge();
        other.key = "def456".to_string();

        solver.present(&challenge()).await.unwrap();
        // Repeating present is not an error.
        solver.present(&challenge()).await.unwrap();
        solver.present(&other).await.unwrap();
        assert!(zone.contains("_acme-challenge.example.com.", "abc123"));

        solver.cleanup(&challenge()).await.unwrap();
        assert!(!zone.contains("_acme-challenge.example.com.", "abc123"));
        assert!(zone.contains("_acme-challenge.example.com.", "def456"));
    }

    /// Hands out a different API key on every read, counting the reads.
    #[derive(Default)]
    struct RotatingSecretStore {
        reads: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl SecretStore for RotatingSecretStore {
        async fn get(&self, _: &str, _: &str) -> Result<SecretData, SecretStoreError> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(SecretData::from([(
                "api-key".to_string(),
                format!("TOKEN-{n}").into_bytes(),
            )]))
        }
    }

    #[tokio::test]
    async fn api_key_is_fetched_on_every_call() {
        let mock_server = MockServer::start().await;
        for token in ["TOKEN-1", "TOKEN-2"] {
            Mock::given(matchers::method("PUT"))
                .and(matchers::header("Authorization", format!("Bearer {token}").as_str()))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(&mock_server)
                .await;
        }
        let secrets = Arc::new(RotatingSecretStore::default());
        let solver = OpenproviderSolver::with_secret_store(
            ZoneClient::new(&mock_server.uri(), Duration::from_secs(5)).unwrap(),
            secrets.clone(),
        );

        solver.present(&challenge()).await.unwrap();
        solver.present(&challenge()).await.unwrap();

        assert_eq!(secrets.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_secret_fails_lookup() {
        let mock_server = MockServer::start().await;
        let mut ch = challenge();
        ch.config = Some(json!({ "apiKeySecretRef": { "name": "nope", "key": "api-key" } }));

        let err = test_solver(&mock_server.uri())
            .present(&ch)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::SecretLookup(SecretStoreError::NotFound { .. })
        ));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_secret_field_fails() {
        let mock_server = MockServer::start().await;
        let mut ch = challenge();
        ch.config = Some(json!({ "apiKeySecretRef": { "name": "op-creds", "key": "token" } }));

        let err = test_solver(&mock_server.uri())
            .cleanup(&ch)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SecretKey { ref key, .. } if key == "token"));
    }

    #[tokio::test]
    async fn absent_config_fails_at_secret_lookup() {
        let mock_server = MockServer::start().await;
        let mut ch = challenge();
        ch.config = None;

        let err = test_solver(&mock_server.uri())
            .present(&ch)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SecretLookup(_)));
    }

    #[tokio::test]
    async fn malformed_config_fails_decode() {
        let mock_server = MockServer::start().await;
        let mut ch = challenge();
        ch.config = Some(json!({ "apiKeySecretRef": 42 }));

        let err = test_solver(&mock_server.uri())
            .present(&ch)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn uninitialized_solver_is_a_config_error() {
        let zones = ZoneClient::new("http://unused", Duration::from_secs(5)).unwrap();
        let solver = OpenproviderSolver::new(zones);
        let err = solver.present(&challenge()).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(solver.name(), "openprovider-solver");
    }

    #[test]
    fn initialize_builds_secret_store() {
        let zones = ZoneClient::new("http://unused", Duration::from_secs(5)).unwrap();
        let mut solver = OpenproviderSolver::new(zones);
        let cluster = ClusterConfig {
            server: "https://10.0.0.1:443".to_string(),
            token: SecretString::from("sa-token".to_string()),
            ca_cert: None,
            insecure_skip_tls_verify: false,
        };
        let (_tx, rx) = tokio::sync::watch::channel(false);

        solver.initialize(&cluster, rx).unwrap();
        assert!(solver.secrets.is_some());
    }
}
