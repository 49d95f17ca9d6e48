use {
    serde::{Deserialize, Deserializer, Serialize},
    std::collections::BTreeMap,
};

/// Ledger view of a blob. Re-fetched on every verification, never cached.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobInfo {
    /// Epoch in which the storage reservation was recorded.
    pub registered_epoch: u64,
    /// Epoch in which the blob was certified. `None` until certification.
    #[serde(default)]
    pub certified_epoch: Option<u64>,
    /// Byte length as a decimal string.
    pub size: String,
    /// An envelope that does not decode is kept as
    /// [`BlobMetadataEnvelope::Unsupported`] rather than failing the record.
    #[serde(default, deserialize_with = "lenient_envelope")]
    pub metadata: Option<BlobMetadataEnvelope>,
}

impl BlobInfo {
    /// Parsed [`BlobInfo::size`], `None` if the ledger reported garbage.
    pub fn size_bytes(&self) -> Option<u64> {
        self.size.trim().parse().ok()
    }
}

fn lenient_envelope<'de, D>(deserializer: D) -> Result<Option<BlobMetadataEnvelope>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(value.map(|value| {
        serde_json::from_value(value).unwrap_or(BlobMetadataEnvelope::Unsupported)
    }))
}

/// Versioned metadata wrapper. Unknown versions deserialize into
/// [`BlobMetadataEnvelope::Unsupported`] and expose no attributes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind")]
pub enum BlobMetadataEnvelope {
    V1(BlobMetadataV1),
    #[serde(other)]
    Unsupported,
}

impl BlobMetadataEnvelope {
    pub fn attributes(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            BlobMetadataEnvelope::V1(v1) => Some(&v1.attributes),
            BlobMetadataEnvelope::Unsupported => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobMetadataV1 {
    pub encoding_type: EncodingType,
    pub unencoded_length: u64,
    #[serde(default)]
    pub hashes: Vec<HashPair>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Erasure coding scheme the blob was encoded with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum EncodingType {
    RedStuff,
    RS2,
    #[serde(other)]
    Unknown,
}

/// Content integrity hashes for one sliver pair.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashPair {
    pub primary_hash: String,
    pub secondary_hash: String,
}

/// A storage node that can be asked to attest possession of a blob.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageProvider {
    pub node_id: String,
    /// Base URL of the node's public API.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
