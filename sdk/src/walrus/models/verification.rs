use {
    serde::{Deserialize, Serialize},
    std::time::Duration,
};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Per-call knobs for [`crate::walrus::BlobVerificationManager::verify_blob`].
/// Unrecognized keys are ignored on deserialization.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerificationOptions {
    /// Retries after the first attempt. Zero means a single attempt.
    pub max_retries: u32,
    /// Delay before the first retry, doubled for every retry after that.
    #[serde(rename = "baseDelay")]
    pub base_delay_ms: u64,
    /// Upper bound for a single network call.
    #[serde(rename = "timeout")]
    pub timeout_ms: u64,
    pub require_certification: bool,
    pub verify_attributes: bool,
}

impl Default for VerificationOptions {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            require_certification: false,
            verify_attributes: false,
        }
    }
}

impl VerificationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_require_certification(mut self, require: bool) -> Self {
        self.require_certification = require;
        self
    }

    pub fn with_verify_attributes(mut self, verify: bool) -> Self {
        self.verify_attributes = verify;
        self
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Outcome of a verification run that did not hit a hard failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub success: bool,
    pub details: VerificationDetails,
    /// At least one provider attested and every asked provider attested.
    pub poa_complete: bool,
    /// Providers that attested possession.
    pub providers: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationDetails {
    pub certified: bool,
    pub size_bytes: u64,
    /// Read-back bytes equal the expected bytes.
    pub content_matches: bool,
    pub registered_epoch: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certified_epoch: Option<u64>,
    pub attributes_checked: bool,
}
