use {
    crate::walrus::{error::WalrusError, models::StorageProvider, network::BlobNetwork},
    futures_util::future::join_all,
    log::{debug, warn},
    std::time::Duration,
};

/// Answer of a single provider to a proof-of-availability request.
#[derive(Debug)]
pub enum Attestation {
    /// The provider confirmed it holds the blob.
    Attested,
    /// The provider answered but did not confirm.
    Declined,
    /// The provider could not be asked.
    Failed(WalrusError),
}

/// Aggregate of all provider answers for one blob.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// Every asked provider attested and there was at least one.
    pub poa_complete: bool,
    /// Providers that attested.
    pub responded: usize,
    /// Providers that declined or failed.
    pub failed: usize,
}

impl ProbeReport {
    pub fn from_attestations(attestations: &[Attestation]) -> Self {
        let responded = attestations
            .iter()
            .filter(|a| matches!(a, Attestation::Attested))
            .count();
        let failed = attestations.len() - responded;

        Self {
            poa_complete: responded > 0 && failed == 0,
            responded,
            failed,
        }
    }
}

/// Ask every provider for a proof of availability, concurrently. Never fails:
/// per-provider errors degrade to [`Attestation::Failed`].
pub async fn probe<N: BlobNetwork>(
    network: &N,
    providers: &[StorageProvider],
    blob_id: &str,
    timeout: Duration,
) -> ProbeReport {
    let attestations = join_all(
        providers
            .iter()
            .map(|provider| attest(network, provider, blob_id, timeout)),
    )
    .await;

    let report = ProbeReport::from_attestations(&attestations);

    debug!(
        "Availability of blob {blob_id}: {}/{} providers attested",
        report.responded,
        providers.len()
    );

    report
}

async fn attest<N: BlobNetwork>(
    network: &N,
    provider: &StorageProvider,
    blob_id: &str,
    timeout: Duration,
) -> Attestation {
    let request = network.verify_proof_of_availability(provider, blob_id);

    let result = if timeout.is_zero() {
        request.await
    } else {
        tokio::time::timeout(timeout, request)
            .await
            .unwrap_or(Err(WalrusError::Timeout(timeout)))
    };

    match result {
        Ok(true) => Attestation::Attested,
        Ok(false) => {
            debug!("Provider {} declined to attest {blob_id}", provider.node_id);

            Attestation::Declined
        }
        Err(e) => {
            warn!("Provider {} failed to attest {blob_id}: {e}", provider.node_id);

            Attestation::Failed(e)
        }
    }
}
