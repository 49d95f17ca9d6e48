use {
    crate::walrus::{error::WalrusError, models::*},
    std::future::Future,
};

/// Read-only capabilities the verification pipeline needs from the storage
/// network and the ledger.
///
/// Calls that go through a storage gateway take the `endpoint` base URL the
/// [`crate::walrus::RetryExecutor`] picked for the current attempt, so that
/// fallback endpoints can be substituted without the implementor knowing.
///
/// Implementations must be safe to call concurrently: many verifications may
/// share one network handle.
pub trait BlobNetwork: Send + Sync {
    /// Fetch the raw bytes of a blob.
    fn read_blob(
        &self,
        endpoint: &str,
        blob_id: &str,
    ) -> impl Future<Output = Result<Vec<u8>, WalrusError>> + Send;

    /// Fetch the ledger record for a blob.
    fn get_blob_info(
        &self,
        endpoint: &str,
        blob_id: &str,
    ) -> impl Future<Output = Result<BlobInfo, WalrusError>> + Send;

    /// Fetch the storage network's metadata envelope. `None` when the network
    /// holds no metadata for the blob.
    fn get_blob_metadata(
        &self,
        endpoint: &str,
        blob_id: &str,
    ) -> impl Future<Output = Result<Option<BlobMetadataEnvelope>, WalrusError>> + Send;

    /// Best-effort provider directory lookup. An empty list is not an error.
    fn get_storage_providers(
        &self,
        endpoint: &str,
        blob_id: &str,
    ) -> impl Future<Output = Result<Vec<StorageProvider>, WalrusError>> + Send;

    /// Ask a single provider whether it currently holds the blob.
    fn verify_proof_of_availability(
        &self,
        provider: &StorageProvider,
        blob_id: &str,
    ) -> impl Future<Output = Result<bool, WalrusError>> + Send;
}
