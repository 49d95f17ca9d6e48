#![cfg(feature = "walrus")]

use {
    assert_matches::assert_matches,
    std::{
        collections::{BTreeMap, HashMap},
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    },
    waltodo_sdk::walrus::*,
};

/// How a scripted call should fail.
#[derive(Clone, Copy, Debug)]
enum Fault {
    Reset,
    RateLimited,
    Malformed,
}

impl Fault {
    fn into_error(self) -> WalrusError {
        match self {
            Fault::Reset => WalrusError::Network("ECONNRESET".to_string()),
            Fault::RateLimited => WalrusError::ApiError {
                status_code: 429,
                message: "Too Many Requests".to_string(),
            },
            Fault::Malformed => WalrusError::InvalidInput("malformed blob id".to_string()),
        }
    }
}

/// In-memory storage network and ledger. Reads, info and metadata lookups
/// fail the configured number of times before they start to succeed.
struct ScriptedNetwork {
    blob: Vec<u8>,
    read_failures: usize,
    read_fault: Fault,
    read_calls: AtomicUsize,
    info_failures: usize,
    info_fault: Fault,
    info_calls: AtomicUsize,
    metadata_failures: usize,
    metadata_calls: AtomicUsize,
    info: BlobInfo,
    metadata: Option<BlobMetadataEnvelope>,
    providers: Result<Vec<StorageProvider>, Fault>,
    attestations: HashMap<String, Result<bool, Fault>>,
}

impl ScriptedNetwork {
    /// Blob `"hello"`, certified in epoch 41, owned by `user123`, held by one
    /// provider that attests.
    fn healthy() -> Self {
        Self {
            blob: b"hello".to_vec(),
            read_failures: 0,
            read_fault: Fault::Reset,
            read_calls: AtomicUsize::new(0),
            info_failures: 0,
            info_fault: Fault::RateLimited,
            info_calls: AtomicUsize::new(0),
            metadata_failures: 0,
            metadata_calls: AtomicUsize::new(0),
            info: BlobInfo {
                registered_epoch: 40,
                certified_epoch: Some(41),
                size: "5".to_string(),
                metadata: None,
            },
            metadata: Some(envelope(&[("owner", "user123"), ("tags", "a,b")])),
            providers: Ok(vec![provider("n1")]),
            attestations: HashMap::from([("n1".to_string(), Ok(true))]),
        }
    }

    fn reads(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    fn info_lookups(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    fn metadata_lookups(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }
}

impl BlobNetwork for ScriptedNetwork {
    async fn read_blob(&self, _endpoint: &str, _blob_id: &str) -> Result<Vec<u8>, WalrusError> {
        let call = self.read_calls.fetch_add(1, Ordering::SeqCst);

        if call < self.read_failures {
            return Err(self.read_fault.into_error());
        }

        Ok(self.blob.clone())
    }

    async fn get_blob_info(&self, _endpoint: &str, _blob_id: &str) -> Result<BlobInfo, WalrusError> {
        let call = self.info_calls.fetch_add(1, Ordering::SeqCst);

        if call < self.info_failures {
            return Err(self.info_fault.into_error());
        }

        Ok(self.info.clone())
    }

    async fn get_blob_metadata(
        &self,
        _endpoint: &str,
        _blob_id: &str,
    ) -> Result<Option<BlobMetadataEnvelope>, WalrusError> {
        let call = self.metadata_calls.fetch_add(1, Ordering::SeqCst);

        if call < self.metadata_failures {
            return Err(Fault::Reset.into_error());
        }

        Ok(self.metadata.clone())
    }

    async fn get_storage_providers(
        &self,
        _endpoint: &str,
        _blob_id: &str,
    ) -> Result<Vec<StorageProvider>, WalrusError> {
        self.providers.clone().map_err(Fault::into_error)
    }

    async fn verify_proof_of_availability(
        &self,
        provider: &StorageProvider,
        _blob_id: &str,
    ) -> Result<bool, WalrusError> {
        match self.attestations.get(&provider.node_id) {
            Some(Ok(attested)) => Ok(*attested),
            Some(Err(fault)) => Err(fault.into_error()),
            None => Err(WalrusError::Network("unknown provider".to_string())),
        }
    }
}

fn envelope(pairs: &[(&str, &str)]) -> BlobMetadataEnvelope {
    BlobMetadataEnvelope::V1(BlobMetadataV1 {
        encoding_type: EncodingType::RedStuff,
        unencoded_length: 5,
        hashes: vec![HashPair {
            primary_hash: "p".to_string(),
            secondary_hash: "s".to_string(),
        }],
        attributes: attributes(pairs),
    })
}

fn attributes(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn provider(node_id: &str) -> StorageProvider {
    StorageProvider {
        node_id: node_id.to_string(),
        url: format!("https://{node_id}.example"),
        name: None,
    }
}

fn manager(network: ScriptedNetwork) -> BlobVerificationManager<ScriptedNetwork> {
    BlobVerificationManager::new(network, vec!["https://aggregator.example".to_string()])
}

fn options() -> VerificationOptions {
    VerificationOptions::new().with_base_delay(Duration::from_millis(1))
}

#[tokio::test]
async fn test_scenario_healthy_blob() {
    let manager = manager(ScriptedNetwork::healthy());
    let expected = attributes(&[("owner", "user123")]);

    let result = manager
        .verify_blob(
            "b1",
            b"hello",
            &expected,
            &options().with_verify_attributes(true),
        )
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.poa_complete);
    assert_eq!(result.providers, 1);
    assert_eq!(result.details.size_bytes, 5);
    assert_eq!(result.details.certified_epoch, Some(41));
    assert_eq!(manager.network().reads(), 1);
}

#[tokio::test]
async fn test_retry_exhaustion_raises_verification_failed() {
    let network = ScriptedNetwork {
        read_failures: usize::MAX,
        ..ScriptedNetwork::healthy()
    };
    let manager = BlobVerificationManager::new(
        network,
        vec!["https://a.example".to_string(), "https://b.example".to_string()],
    );

    let err = manager
        .verify_blob("b1", b"hello", &BTreeMap::new(), &options().with_max_retries(2))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "WALRUS_VERIFICATION_FAILED");
    assert!(err.to_string().contains("verification failed after"));
    assert_matches!(err, VerificationError::Exhausted { step: "read", attempts: 3, .. });

    // Three attempts, each walking both endpoints.
    assert_eq!(manager.network().reads(), 6);
    // Nothing after the read ran.
    assert_eq!(manager.network().info_lookups(), 0);
}

#[tokio::test]
async fn test_zero_retries_reads_once() {
    let network = ScriptedNetwork {
        read_failures: usize::MAX,
        ..ScriptedNetwork::healthy()
    };
    let manager = manager(network);

    let err = manager
        .verify_blob("b1", b"hello", &BTreeMap::new(), &options().with_max_retries(0))
        .await
        .unwrap_err();

    assert_matches!(err, VerificationError::Exhausted { attempts: 1, .. });
    assert_eq!(manager.network().reads(), 1);
}

#[tokio::test]
async fn test_repeated_verification_is_stable() {
    let manager = manager(ScriptedNetwork::healthy());
    let expected = attributes(&[("owner", "user123"), ("tags", "a,b")]);
    let options = options()
        .with_verify_attributes(true)
        .with_require_certification(true);

    let mut results = vec![];
    for _ in 0..3 {
        results.push(
            manager
                .verify_blob("b1", b"hello", &expected, &options)
                .await
                .unwrap(),
        );
    }

    assert!(results.iter().all(|r| r.success && r.details.certified));
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn test_transient_read_failure_recovers() {
    let network = ScriptedNetwork {
        read_failures: 1,
        ..ScriptedNetwork::healthy()
    };
    let manager = manager(network);

    let result = manager
        .verify_blob("b1", b"hello", &BTreeMap::new(), &options())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(manager.network().reads(), 2);
}

#[tokio::test]
async fn test_non_retryable_read_is_not_retried() {
    let network = ScriptedNetwork {
        read_failures: usize::MAX,
        read_fault: Fault::Malformed,
        ..ScriptedNetwork::healthy()
    };
    let manager = manager(network);

    let err = manager
        .verify_blob("b1", b"hello", &BTreeMap::new(), &options())
        .await
        .unwrap_err();

    assert_matches!(
        err,
        VerificationError::Exhausted {
            attempts: 1,
            source: WalrusError::InvalidInput(_),
            ..
        }
    );
    assert_eq!(manager.network().reads(), 1);
}

#[tokio::test]
async fn test_attribute_mismatches_are_all_listed() {
    let network = ScriptedNetwork {
        metadata: Some(envelope(&[("owner", "other")])),
        ..ScriptedNetwork::healthy()
    };
    let manager = manager(network);
    let expected = attributes(&[("owner", "user123"), ("tags", "a,b")]);

    let err = manager
        .verify_blob(
            "b1",
            b"hello",
            &expected,
            &options().with_verify_attributes(true),
        )
        .await
        .unwrap_err();

    let message = err.to_string();

    assert_eq!(err.code(), "WALRUS_METADATA_MISMATCH");
    assert!(message.starts_with("Metadata verification failed:"));
    assert!(message.contains("owner: expected \"user123\", got \"other\""));
    assert!(message.contains("tags: expected \"a,b\", got <missing>"));
}

#[tokio::test]
async fn test_absent_metadata_fails_attribute_check() {
    let network = ScriptedNetwork {
        metadata: None,
        ..ScriptedNetwork::healthy()
    };
    let manager = manager(network);
    let expected = attributes(&[("owner", "user123"), ("tags", "a,b")]);

    let err = manager
        .verify_blob(
            "b1",
            b"hello",
            &expected,
            &options().with_verify_attributes(true),
        )
        .await
        .unwrap_err();

    assert_matches!(err, VerificationError::MetadataMismatch { findings } if findings.len() == 2);
}

#[tokio::test]
async fn test_ledger_attributes_are_checked() {
    let network = ScriptedNetwork {
        metadata: None,
        info: BlobInfo {
            metadata: Some(envelope(&[("owner", "user123")])),
            ..ScriptedNetwork::healthy().info
        },
        ..ScriptedNetwork::healthy()
    };
    let manager = manager(network);

    let result = manager
        .verify_blob(
            "b1",
            b"hello",
            &attributes(&[("owner", "user123")]),
            &options().with_verify_attributes(true),
        )
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.details.attributes_checked);
}

#[tokio::test]
async fn test_attributes_ignored_unless_requested() {
    let manager = manager(ScriptedNetwork::healthy());

    let result = manager
        .verify_blob(
            "b1",
            b"hello",
            &attributes(&[("owner", "someone-else")]),
            &options(),
        )
        .await
        .unwrap();

    assert!(result.success);
    assert!(!result.details.attributes_checked);
}

#[tokio::test]
async fn test_certification_gate_is_independent_of_result() {
    let uncertified = || ScriptedNetwork {
        info: BlobInfo {
            certified_epoch: None,
            ..ScriptedNetwork::healthy().info
        },
        ..ScriptedNetwork::healthy()
    };

    let err = manager(uncertified())
        .verify_blob(
            "b1",
            b"hello",
            &BTreeMap::new(),
            &options().with_require_certification(true),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), "WALRUS_CERTIFICATION_MISSING");
    assert_matches!(
        err,
        VerificationError::NotCertified(CertificationError::NotCertified { registered_epoch: 40, .. })
    );

    let result = manager(uncertified())
        .verify_blob(
            "b1",
            b"hello",
            &BTreeMap::new(),
            &options().with_require_certification(false),
        )
        .await
        .unwrap();

    assert!(result.success);
    assert!(!result.details.certified);
}

#[tokio::test]
async fn test_no_providers_degrades_availability() {
    let network = ScriptedNetwork {
        providers: Ok(vec![]),
        ..ScriptedNetwork::healthy()
    };

    let result = manager(network)
        .verify_blob("b1", b"hello", &BTreeMap::new(), &VerificationOptions::default())
        .await
        .unwrap();

    assert!(result.success);
    assert!(!result.poa_complete);
    assert_eq!(result.providers, 0);
}

#[tokio::test]
async fn test_failing_attestations_degrade_availability() {
    let network = ScriptedNetwork {
        providers: Ok(vec![provider("n1"), provider("n2")]),
        attestations: HashMap::from([
            ("n1".to_string(), Err(Fault::Reset)),
            ("n2".to_string(), Err(Fault::Reset)),
        ]),
        ..ScriptedNetwork::healthy()
    };

    let result = manager(network)
        .verify_blob("b1", b"hello", &BTreeMap::new(), &VerificationOptions::default())
        .await
        .unwrap();

    assert!(result.success);
    assert!(!result.poa_complete);
    assert_eq!(result.providers, 0);
}

#[tokio::test]
async fn test_provider_lookup_failure_means_zero_providers() {
    let network = ScriptedNetwork {
        providers: Err(Fault::Reset),
        ..ScriptedNetwork::healthy()
    };

    let result = manager(network)
        .verify_blob("b1", b"hello", &BTreeMap::new(), &options())
        .await
        .unwrap();

    assert!(result.success);
    assert!(!result.poa_complete);
    assert_eq!(result.providers, 0);
}

#[tokio::test]
async fn test_partial_attestation_counts_responders() {
    let network = ScriptedNetwork {
        providers: Ok(vec![provider("n1"), provider("n2"), provider("n3")]),
        attestations: HashMap::from([
            ("n1".to_string(), Ok(true)),
            ("n2".to_string(), Err(Fault::Reset)),
            ("n3".to_string(), Ok(true)),
        ]),
        ..ScriptedNetwork::healthy()
    };

    let result = manager(network)
        .verify_blob("b1", b"hello", &BTreeMap::new(), &options())
        .await
        .unwrap();

    assert!(result.success);
    assert!(!result.poa_complete);
    assert_eq!(result.providers, 2);
}

#[tokio::test]
async fn test_content_mismatch_is_reported_not_raised() {
    let manager = manager(ScriptedNetwork::healthy());

    let result = manager
        .verify_blob("b1", b"goodbye", &BTreeMap::new(), &options())
        .await
        .unwrap();

    assert!(!result.success);
    assert!(!result.details.content_matches);
    assert!(result.details.certified);
}

#[tokio::test]
async fn test_content_and_attribute_findings_are_merged() {
    let network = ScriptedNetwork {
        metadata: Some(envelope(&[("owner", "other")])),
        ..ScriptedNetwork::healthy()
    };

    let err = manager(network)
        .verify_blob(
            "b1",
            b"goodbye",
            &attributes(&[("owner", "user123")]),
            &options().with_verify_attributes(true),
        )
        .await
        .unwrap_err();

    let message = err.to_string();

    assert!(message.contains("owner: expected \"user123\", got \"other\""));
    assert!(message.contains("content: expected 7 bytes, got 5 bytes"));
}

#[tokio::test]
async fn test_concurrent_verifications_share_a_manager() {
    let manager = manager(ScriptedNetwork::healthy());
    let empty = BTreeMap::new();
    let options = options();

    let (first, second) = tokio::join!(
        manager.verify_blob("b1", b"hello", &empty, &options),
        manager.verify_blob("b1", b"hello", &empty, &options),
    );

    assert_eq!(first.unwrap(), second.unwrap());
    assert_eq!(manager.network().reads(), 2);
}

#[tokio::test]
async fn test_rate_limited_info_recovers() {
    let network = ScriptedNetwork {
        info_failures: 1,
        ..ScriptedNetwork::healthy()
    };
    let manager = manager(network);

    let result = manager
        .verify_blob("b1", b"hello", &BTreeMap::new(), &options())
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.details.certified);
    assert_eq!(manager.network().info_lookups(), 2);
    assert_eq!(manager.network().reads(), 1);
}

#[tokio::test]
async fn test_read_and_info_have_separate_budgets() {
    // Each step uses its whole budget of two retries and still succeeds.
    let network = ScriptedNetwork {
        read_failures: 2,
        info_failures: 2,
        ..ScriptedNetwork::healthy()
    };
    let manager = manager(network);

    let result = manager
        .verify_blob("b1", b"hello", &BTreeMap::new(), &options().with_max_retries(2))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(manager.network().reads(), 3);
    assert_eq!(manager.network().info_lookups(), 3);
}

#[tokio::test]
async fn test_info_exhaustion_names_the_step() {
    let network = ScriptedNetwork {
        read_failures: 2,
        info_failures: usize::MAX,
        ..ScriptedNetwork::healthy()
    };
    let manager = manager(network);

    let err = manager
        .verify_blob("b1", b"hello", &BTreeMap::new(), &options().with_max_retries(2))
        .await
        .unwrap_err();

    assert_matches!(
        err,
        VerificationError::Exhausted {
            step: "info",
            attempts: 3,
            source: WalrusError::ApiError { status_code: 429, .. },
        }
    );
    assert_eq!(manager.network().metadata_lookups(), 0);
}

#[tokio::test]
async fn test_metadata_exhaustion_names_the_step() {
    let network = ScriptedNetwork {
        metadata_failures: usize::MAX,
        ..ScriptedNetwork::healthy()
    };
    let manager = manager(network);

    let err = manager
        .verify_blob("b1", b"hello", &BTreeMap::new(), &options().with_max_retries(1))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "WALRUS_VERIFICATION_FAILED");
    assert_matches!(err, VerificationError::Exhausted { step: "metadata", attempts: 2, .. });
    assert_eq!(manager.network().metadata_lookups(), 2);
    assert_eq!(manager.network().info_lookups(), 1);
}

#[tokio::test]
async fn test_malformed_ledger_metadata_counts_as_absent() {
    let info: BlobInfo = serde_json::from_value(serde_json::json!({
        "registeredEpoch": 1,
        "certifiedEpoch": 2,
        "size": "5",
        "metadata": { "kind": "V1", "garbage": true }
    }))
    .unwrap();

    let broken = || ScriptedNetwork {
        info: info.clone(),
        metadata: None,
        ..ScriptedNetwork::healthy()
    };
    let expected = attributes(&[("owner", "user123"), ("tags", "a,b")]);

    let result = manager(broken())
        .verify_blob("b1", b"hello", &expected, &options())
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.details.certified);

    let err = manager(broken())
        .verify_blob(
            "b1",
            b"hello",
            &expected,
            &options().with_verify_attributes(true),
        )
        .await
        .unwrap_err();

    assert_matches!(
        err,
        VerificationError::MetadataMismatch { findings } if findings
            == vec![
                "owner: expected \"user123\", got <missing>".to_string(),
                "tags: expected \"a,b\", got <missing>".to_string(),
            ]
    );
}
