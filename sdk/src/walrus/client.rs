use {
    crate::walrus::{error::WalrusError, models::*, network::BlobNetwork},
    reqwest::{Client, Response, StatusCode},
    serde::Serialize,
    std::path::Path,
};

// Publisher and Aggregator URLs are from <https://github.com/MystenLabs/walrus/blob/232d27ff7b3c2ba08aa4e10729b095f300b46384/docs/book/assets/operators.json>
// Walrus Default API Endpoints
pub const WALRUS_PUBLISHER_URL: &str = "https://publisher.walrus-testnet.walrus.space";
pub const WALRUS_AGGREGATOR_URL: &str = "https://aggregator.walrus-testnet.walrus.space";

/// Builder for WalrusClient configuration
pub struct WalrusClientBuilder {
    client: Client,
    publisher_url: String,
    aggregator_url: String,
    fallback_aggregator_urls: Vec<String>,
}

impl Default for WalrusClientBuilder {
    /// Creates a default WalrusClientBuilder with standard configuration
    fn default() -> Self {
        Self {
            client: Client::new(),
            publisher_url: WALRUS_PUBLISHER_URL.to_string(),
            aggregator_url: WALRUS_AGGREGATOR_URL.to_string(),
            fallback_aggregator_urls: vec![],
        }
    }
}

impl WalrusClientBuilder {
    /// Create a new WalrusClientBuilder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Set a custom publisher URL
    pub fn with_publisher_url(mut self, url: &str) -> Self {
        self.publisher_url = url.to_string();
        self
    }

    /// Set a custom aggregator URL
    pub fn with_aggregator_url(mut self, url: &str) -> Self {
        self.aggregator_url = url.to_string();
        self
    }

    /// Add an aggregator to fall back to when the primary one fails. Fallbacks
    /// are tried in the order they were added.
    pub fn with_fallback_aggregator_url(mut self, url: &str) -> Self {
        self.fallback_aggregator_urls.push(url.to_string());
        self
    }

    /// Build the WalrusClient with the configured settings
    pub fn build(self) -> WalrusClient {
        WalrusClient {
            client: self.client,
            publisher_url: self.publisher_url,
            aggregator_url: self.aggregator_url,
            fallback_aggregator_urls: self.fallback_aggregator_urls,
        }
    }
}

/// Client for interacting with the Walrus decentralized blob storage system
#[derive(Clone, Debug)]
pub struct WalrusClient {
    client: Client,
    publisher_url: String,
    aggregator_url: String,
    fallback_aggregator_urls: Vec<String>,
}

impl Default for WalrusClient {
    /// Creates a default WalrusClient with standard configuration
    fn default() -> Self {
        WalrusClientBuilder::default().build()
    }
}

impl WalrusClient {
    /// Create a new WalrusClient with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a builder to create a customized WalrusClient
    pub fn builder() -> WalrusClientBuilder {
        WalrusClientBuilder::default()
    }

    /// Aggregator base URLs, primary first.
    pub fn endpoints(&self) -> Vec<String> {
        std::iter::once(&self.aggregator_url)
            .chain(&self.fallback_aggregator_urls)
            .cloned()
            .collect()
    }

    /// Upload a file to Walrus
    ///
    /// # Arguments
    /// * `file_path` - Path to the file to upload
    /// * `epochs` - Number of epochs to store the file
    /// * `send_to` - Optional address to which the created Blob object should be sent
    pub async fn upload_file(
        &self,
        file_path: &Path,
        epochs: u64,
        send_to: Option<&str>,
    ) -> Result<StorageInfo, WalrusError> {
        let file_content = tokio::fs::read(file_path).await.map_err(|e| {
            WalrusError::InvalidInput(format!("Failed to read file {}: {e}", file_path.display()))
        })?;

        self.upload_bytes(file_content, epochs, send_to).await
    }

    /// Upload JSON data to Walrus
    ///
    /// # Arguments
    /// * `data` - Data to serialize as JSON and upload
    /// * `epochs` - Number of epochs to store the data
    /// * `send_to` - Optional address to which the created Blob object should be sent
    pub async fn upload_json<T: Serialize>(
        &self,
        data: &T,
        epochs: u64,
        send_to: Option<&str>,
    ) -> Result<StorageInfo, WalrusError> {
        let json_content = serde_json::to_vec(data)
            .map_err(|e| WalrusError::InvalidInput(format!("Failed to serialize data: {e}")))?;

        self.upload_bytes(json_content, epochs, send_to).await
    }

    /// Upload raw bytes to Walrus and return the publisher's storage info.
    pub async fn upload_bytes(
        &self,
        content: Vec<u8>,
        epochs: u64,
        send_to: Option<&str>,
    ) -> Result<StorageInfo, WalrusError> {
        // Construct API URL with query parameters
        let mut url = format!("{}/v1/blobs?epochs={}", base(&self.publisher_url), epochs);
        if let Some(address) = send_to {
            url.push_str(&format!("&send_object_to={}", address));
        }

        let response = self.client.put(&url).body(content).send().await?;
        let response = ensure_success(response).await?;

        Ok(response.json().await?)
    }

    async fn get(&self, url: &str) -> Result<Response, WalrusError> {
        Ok(self.client.get(url).send().await?)
    }
}

impl BlobNetwork for WalrusClient {
    async fn read_blob(&self, endpoint: &str, blob_id: &str) -> Result<Vec<u8>, WalrusError> {
        let url = format!("{}/v1/blobs/{}", base(endpoint), blob_id);
        let response = ensure_success(self.get(&url).await?).await?;

        Ok(response.bytes().await?.to_vec())
    }

    async fn get_blob_info(&self, endpoint: &str, blob_id: &str) -> Result<BlobInfo, WalrusError> {
        let url = format!("{}/v1/blobs/{}/info", base(endpoint), blob_id);
        let response = ensure_success(self.get(&url).await?).await?;

        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }

    async fn get_blob_metadata(
        &self,
        endpoint: &str,
        blob_id: &str,
    ) -> Result<Option<BlobMetadataEnvelope>, WalrusError> {
        let url = format!("{}/v1/blobs/{}/metadata", base(endpoint), blob_id);
        let response = self.get(&url).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = ensure_success(response).await?.bytes().await?;

        // Undecodable metadata is treated the same as missing metadata.
        Ok(serde_json::from_slice(&body).ok())
    }

    async fn get_storage_providers(
        &self,
        endpoint: &str,
        blob_id: &str,
    ) -> Result<Vec<StorageProvider>, WalrusError> {
        let url = format!("{}/v1/blobs/{}/providers", base(endpoint), blob_id);
        let response = ensure_success(self.get(&url).await?).await?;

        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }

    async fn verify_proof_of_availability(
        &self,
        provider: &StorageProvider,
        blob_id: &str,
    ) -> Result<bool, WalrusError> {
        let url = format!("{}/v1/blobs/{}/metadata", base(&provider.url), blob_id);
        let response = self.client.head(&url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(WalrusError::ApiError {
                status_code: status.as_u16(),
                message: format!("Provider {} rejected availability check", provider.node_id),
            }),
        }
    }
}

fn base(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// Turn a non-success response into [`WalrusError::ApiError`] carrying the
/// response body.
async fn ensure_success(response: Response) -> Result<Response, WalrusError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();

    Err(WalrusError::ApiError {
        status_code: status.as_u16(),
        message,
    })
}
