use {std::time::Duration, thiserror::Error};

/// Errors raised by the storage network and ledger collaborators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WalrusError {
    /// Connection reset, refused or otherwise broken before a response arrived.
    #[error("Network error: {0}")]
    Network(String),
    /// A single attempt ran past its deadline.
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    /// The remote answered with a non-success HTTP status.
    #[error("API error {status_code}: {message}")]
    ApiError { status_code: u16, message: String },
    /// The response could not be decoded.
    #[error("Failed to parse response: {0}")]
    Parse(String),
    /// The request itself is malformed and will never succeed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl WalrusError {
    /// Transient faults are worth another attempt. Rate limiting (429) and
    /// server-side failures (5xx) are transient, as are broken connections and
    /// timeouts. Everything else points at the request and is final.
    pub fn is_retryable(&self) -> bool {
        match self {
            WalrusError::Network(_) | WalrusError::Timeout(_) => true,
            WalrusError::ApiError { status_code, .. } => {
                *status_code == 429 || (500..600).contains(status_code)
            }
            WalrusError::Parse(_) | WalrusError::InvalidInput(_) => false,
        }
    }
}

impl From<reqwest::Error> for WalrusError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            return WalrusError::InvalidInput(e.to_string());
        }

        if let Some(status) = e.status() {
            return WalrusError::ApiError {
                status_code: status.as_u16(),
                message: e.to_string(),
            };
        }

        if e.is_decode() {
            return WalrusError::Parse(e.to_string());
        }

        WalrusError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for WalrusError {
    fn from(e: serde_json::Error) -> Self {
        WalrusError::Parse(e.to_string())
    }
}

/// Certification was required but the ledger has not recorded it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CertificationError {
    #[error("Blob {blob_id} is not certified (registered in epoch {registered_epoch})")]
    NotCertified {
        blob_id: String,
        registered_epoch: u64,
    },
}

/// Hard verification failures surfaced to callers. Each variant maps to a
/// stable [`VerificationError::code`] so that tooling can branch on it.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("{step} verification failed after {attempts} attempts: {source}")]
    Exhausted {
        step: &'static str,
        attempts: u32,
        #[source]
        source: WalrusError,
    },
    #[error("Metadata verification failed:\n{}", .findings.join("\n"))]
    MetadataMismatch { findings: Vec<String> },
    #[error("{0}")]
    NotCertified(#[from] CertificationError),
}

impl VerificationError {
    pub const VERIFICATION_FAILED: &'static str = "WALRUS_VERIFICATION_FAILED";
    pub const METADATA_MISMATCH: &'static str = "WALRUS_METADATA_MISMATCH";
    pub const CERTIFICATION_MISSING: &'static str = "WALRUS_CERTIFICATION_MISSING";

    pub fn code(&self) -> &'static str {
        match self {
            VerificationError::Exhausted { .. } => Self::VERIFICATION_FAILED,
            VerificationError::MetadataMismatch { .. } => Self::METADATA_MISMATCH,
            VerificationError::NotCertified(_) => Self::CERTIFICATION_MISSING,
        }
    }
}
