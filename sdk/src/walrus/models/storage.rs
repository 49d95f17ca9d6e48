use serde::{Deserialize, Serialize};

/// Publisher response to a blob upload. Exactly one of the two fields is set.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    /// The blob was registered and certified by this upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newly_created: Option<NewlyCreated>,
    /// The blob was already stored and certified before this upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub already_certified: Option<AlreadyCertified>,
}

impl StorageInfo {
    /// Blob ID of whichever variant the publisher returned.
    pub fn blob_id(&self) -> Option<&str> {
        match (&self.newly_created, &self.already_certified) {
            (Some(created), _) => Some(&created.blob_object.blob_id),
            (None, Some(certified)) => Some(&certified.blob_id),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewlyCreated {
    pub blob_object: BlobObject,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlreadyCertified {
    pub blob_id: String,
    pub end_epoch: u64,
}

/// Represents a blob object in the Walrus network
#[derive(Debug, Deserialize, Serialize)]
pub struct BlobObject {
    #[serde(rename = "blobId")]
    pub blob_id: String,
    pub id: String,
    pub storage: BlobStorage,
}

/// Storage information for a blob
#[derive(Debug, Deserialize, Serialize)]
pub struct BlobStorage {
    #[serde(rename = "endEpoch")]
    pub end_epoch: u64,
}
