//! Retry with endpoint fallback.
//!
//! Two loops compose here. [`RetryExecutor::try_endpoints`] walks the
//! candidate endpoints once, in order, and is what a single attempt means.
//! [`RetryExecutor::execute`] repeats that attempt on an exponential backoff
//! schedule until it succeeds, fails with a non-retryable error or runs out of
//! budget.

use {
    crate::walrus::{error::WalrusError, models::VerificationOptions},
    log::{debug, warn},
    std::{
        future::Future,
        sync::atomic::{AtomicU32, Ordering},
        time::Duration,
    },
    thiserror::Error,
    tokio_retry::RetryIf,
};

/// The last error observed once the executor gave up, unchanged, together
/// with the number of attempts that were made.
#[derive(Debug, Error)]
#[error("{error} (after {attempts} attempts)")]
pub struct RetryError {
    pub attempts: u32,
    #[source]
    pub error: WalrusError,
}

impl RetryError {
    pub fn into_inner(self) -> WalrusError {
        self.error
    }
}

/// Delays between attempts: `base`, `2 * base`, `4 * base`, ... with exactly
/// `max_retries` entries.
pub fn backoff_schedule(base: Duration, max_retries: u32) -> impl Iterator<Item = Duration> {
    (0..max_retries).map(move |n| base.saturating_mul(2u32.saturating_pow(n)))
}

/// Stateless retry driver. One instance can serve concurrent calls.
#[derive(Clone, Debug)]
pub struct RetryExecutor {
    max_retries: u32,
    base_delay: Duration,
    timeout: Duration,
}

impl RetryExecutor {
    /// A zero `timeout` leaves individual calls unbounded.
    pub fn new(max_retries: u32, base_delay: Duration, timeout: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            timeout,
        }
    }

    pub fn from_options(options: &VerificationOptions) -> Self {
        Self::new(options.max_retries, options.base_delay(), options.timeout())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Run `operation` against each endpoint in order until one succeeds.
    ///
    /// A non-retryable error is returned immediately without trying the
    /// remaining endpoints. Otherwise the error of the last endpoint is
    /// returned.
    pub async fn try_endpoints<T, F, Fut>(
        &self,
        endpoints: &[String],
        label: &str,
        operation: &F,
    ) -> Result<T, WalrusError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, WalrusError>>,
    {
        let mut last_error = None;

        for endpoint in endpoints {
            debug!("[{label}] Calling endpoint {endpoint}");

            let result = if self.timeout.is_zero() {
                operation(endpoint.clone()).await
            } else {
                match tokio::time::timeout(self.timeout, operation(endpoint.clone())).await {
                    Ok(result) => result,
                    Err(_) => Err(WalrusError::Timeout(self.timeout)),
                }
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    warn!("[{label}] Endpoint {endpoint} failed: {e}");

                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            WalrusError::InvalidInput(format!("No endpoints configured for '{label}'"))
        }))
    }

    /// Run `operation` with endpoint fallback, retrying retryable failures on
    /// the backoff schedule.
    pub async fn execute<T, F, Fut>(
        &self,
        endpoints: &[String],
        label: &str,
        operation: F,
    ) -> Result<T, RetryError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, WalrusError>>,
    {
        let attempts = AtomicU32::new(0);
        let max_attempts = self.max_attempts();
        let (attempts_ref, operation) = (&attempts, &operation);

        let action = move || {
            let attempt = attempts_ref.fetch_add(1, Ordering::Relaxed) + 1;

            debug!("[{label}] Attempt {attempt}/{max_attempts}");

            self.try_endpoints(endpoints, label, operation)
        };

        let condition = |e: &WalrusError| {
            let retryable = e.is_retryable();

            if retryable && attempts.load(Ordering::Relaxed) < max_attempts {
                warn!("[{label}] Attempt failed, retrying: {e}");
            }

            retryable
        };

        RetryIf::spawn(
            backoff_schedule(self.base_delay, self.max_retries),
            action,
            condition,
        )
        .await
        .map_err(|error| RetryError {
            attempts: attempts.load(Ordering::Relaxed),
            error,
        })
    }
}
