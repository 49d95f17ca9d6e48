//! Post-write verification of a blob.
//!
//! [`BlobVerificationManager::verify_blob`] runs a fixed pipeline once per
//! call, never revisiting a step:
//!
//! 1. read the blob back (retried),
//! 2. compare the bytes,
//! 3. fetch the ledger record (retried),
//! 4. fetch the storage network metadata (retried),
//! 5. reconcile attributes if asked to,
//! 6. gate on certification if asked to,
//! 7. probe providers for proofs of availability,
//! 8. assemble the [`VerificationResult`].

use {
    crate::walrus::{
        availability,
        certification,
        client::WalrusClient,
        error::VerificationError,
        models::*,
        network::BlobNetwork,
        reconcile::{reconcile, ExpectedAttributes},
        retry::{RetryError, RetryExecutor},
    },
    log::{info, warn},
    std::collections::BTreeMap,
};

/// Verifies blobs against a [`BlobNetwork`]. Holds no per-call state, so one
/// manager can run any number of verifications concurrently.
#[derive(Clone, Debug)]
pub struct BlobVerificationManager<N> {
    network: N,
    endpoints: Vec<String>,
}

impl BlobVerificationManager<WalrusClient> {
    /// Verify through the client's aggregators, primary first.
    pub fn from_client(client: WalrusClient) -> Self {
        let endpoints = client.endpoints();

        Self::new(client, endpoints)
    }
}

impl<N: BlobNetwork> BlobVerificationManager<N> {
    /// `endpoints` are the candidate gateway base URLs, in order of
    /// preference.
    pub fn new(network: N, endpoints: Vec<String>) -> Self {
        Self { network, endpoints }
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Prove that `blob_id` holds `expected_bytes` and, depending on
    /// `options`, carries `expected_attributes` and is certified.
    ///
    /// Soft findings (content mismatch, missing certification when not
    /// required, incomplete availability) are reported in the result. Hard
    /// failures are returned as [`VerificationError`].
    pub async fn verify_blob(
        &self,
        blob_id: &str,
        expected_bytes: &[u8],
        expected_attributes: &ExpectedAttributes,
        options: &VerificationOptions,
    ) -> Result<VerificationResult, VerificationError> {
        let executor = RetryExecutor::from_options(options);
        let network = &self.network;

        let bytes = executor
            .execute(&self.endpoints, "read", move |endpoint: String| async move {
                network.read_blob(&endpoint, blob_id).await
            })
            .await
            .map_err(exhausted("read"))?;

        let content_matches = bytes == expected_bytes;

        if !content_matches {
            warn!("Blob {blob_id} read back different bytes than were written");
        }

        let info = executor
            .execute(&self.endpoints, "info", move |endpoint: String| async move {
                network.get_blob_info(&endpoint, blob_id).await
            })
            .await
            .map_err(exhausted("info"))?;

        let metadata = executor
            .execute(&self.endpoints, "metadata", move |endpoint: String| async move {
                network.get_blob_metadata(&endpoint, blob_id).await
            })
            .await
            .map_err(exhausted("metadata"))?;

        if options.verify_attributes {
            let actual = merged_attributes(&info, metadata.as_ref());
            let mismatches = reconcile(expected_attributes, actual.as_ref());

            if !mismatches.is_empty() {
                let mut findings = mismatches
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>();

                if !content_matches {
                    findings.push(content_finding(expected_bytes, &bytes));
                }

                return Err(VerificationError::MetadataMismatch { findings });
            }
        }

        certification::enforce(blob_id, &info, options.require_certification)?;

        let certified = certification::is_certified(&info);

        let providers = match executor
            .try_endpoints(
                &self.endpoints,
                "providers",
                &move |endpoint: String| async move {
                    network.get_storage_providers(&endpoint, blob_id).await
                },
            )
            .await
        {
            Ok(providers) => providers,
            Err(e) => {
                warn!("Provider lookup for blob {blob_id} failed, probing nobody: {e}");

                vec![]
            }
        };

        let report = availability::probe(network, &providers, blob_id, options.timeout()).await;

        let result = VerificationResult {
            success: content_matches,
            details: VerificationDetails {
                certified,
                size_bytes: info.size_bytes().unwrap_or(bytes.len() as u64),
                content_matches,
                registered_epoch: info.registered_epoch,
                certified_epoch: info.certified_epoch,
                attributes_checked: options.verify_attributes,
            },
            poa_complete: report.poa_complete,
            providers: report.responded,
        };

        info!(
            "Verified blob {blob_id}: success={}, certified={}, poa_complete={}, providers={}",
            result.success, result.details.certified, result.poa_complete, result.providers
        );

        Ok(result)
    }
}

fn exhausted(step: &'static str) -> impl Fn(RetryError) -> VerificationError {
    move |RetryError { attempts, error }: RetryError| VerificationError::Exhausted {
        step,
        attempts,
        source: error,
    }
}

/// Attributes from the storage network overlaid with the ledger's. `None` if
/// neither side has a readable envelope.
fn merged_attributes(
    info: &BlobInfo,
    metadata: Option<&BlobMetadataEnvelope>,
) -> Option<BTreeMap<String, String>> {
    let ledger = info.metadata.as_ref().and_then(|m| m.attributes());
    let network = metadata.and_then(|m| m.attributes());

    if ledger.is_none() && network.is_none() {
        return None;
    }

    let mut merged = network.cloned().unwrap_or_default();
    merged.extend(ledger.cloned().unwrap_or_default());

    Some(merged)
}

fn content_finding(expected: &[u8], actual: &[u8]) -> String {
    if expected.len() == actual.len() {
        format!(
            "content: expected {} bytes, got {} bytes with different content",
            expected.len(),
            actual.len()
        )
    } else {
        format!(
            "content: expected {} bytes, got {} bytes",
            expected.len(),
            actual.len()
        )
    }
}
