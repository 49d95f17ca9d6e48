use crate::walrus::{error::CertificationError, models::BlobInfo};

/// Certified means the ledger recorded a certification epoch. The value of
/// the epoch does not matter, epoch `0` counts.
pub fn is_certified(info: &BlobInfo) -> bool {
    info.certified_epoch.is_some()
}

/// Gate on certification. A no-op unless `require_certification` is set.
pub fn enforce(
    blob_id: &str,
    info: &BlobInfo,
    require_certification: bool,
) -> Result<(), CertificationError> {
    if !require_certification || is_certified(info) {
        return Ok(());
    }

    Err(CertificationError::NotCertified {
        blob_id: blob_id.to_string(),
        registered_epoch: info.registered_epoch,
    })
}
