pub(crate) use {
    crate::error::WaltodoCliError,
    anyhow::{anyhow, Result as AnyResult},
    clap::{builder::ValueParser, Args, Parser, Subcommand},
    colored::Colorize,
    serde::{Deserialize, Serialize},
    std::{
        path::PathBuf,
        sync::atomic::{AtomicBool, Ordering},
    },
    waltodo_sdk::walrus::VerificationOptions,
};
use {
    log::warn,
    waltodo_sdk::walrus::{WalrusClient, WALRUS_AGGREGATOR_URL, WALRUS_PUBLISHER_URL},
};

// Where to find config file.
pub(crate) const CLI_CONF_PATH: &str = "~/.waltodo/conf.toml";

/// Set by `--json`. Suppresses decorated output in favour of JSON on stdout.
pub(crate) static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// Struct holding the config structure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CliConf {
    #[serde(default)]
    pub(crate) walrus: WalrusConf,
    #[serde(default)]
    pub(crate) verification: VerificationOptions,
}

impl CliConf {
    pub(crate) async fn load_from_path(path: &PathBuf) -> AnyResult<Self> {
        let conf = tokio::fs::read_to_string(path).await?;

        Ok(toml::from_str(&conf)?)
    }

    /// Load the configuration, falling back to defaults. A file that exists
    /// but cannot be read is reported rather than silently ignored.
    pub(crate) async fn load_or_default(path: &PathBuf) -> Self {
        match Self::load_from_path(path).await {
            Ok(conf) => conf,
            Err(e) => {
                if Self::exists(path).await {
                    warn!(
                        "Ignoring unreadable configuration at {}: {e}",
                        path.display()
                    );
                }

                Self::default()
            }
        }
    }

    pub(crate) async fn exists(path: &PathBuf) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    pub(crate) async fn save(&self, path: &PathBuf) -> AnyResult<()> {
        let parent_folder = path
            .parent()
            .ok_or_else(|| anyhow!("Configuration path {} has no parent", path.display()))?;
        let conf = toml::to_string_pretty(&self)?;

        tokio::fs::create_dir_all(parent_folder).await?;
        tokio::fs::write(path, conf).await?;

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct WalrusConf {
    #[serde(default = "default_publisher_url")]
    pub(crate) publisher_url: String,
    #[serde(default = "default_aggregator_url")]
    pub(crate) aggregator_url: String,
    #[serde(default)]
    pub(crate) fallback_aggregator_urls: Vec<String>,
    #[serde(default = "default_epochs")]
    pub(crate) epochs: u64,
}

impl Default for WalrusConf {
    fn default() -> Self {
        Self {
            publisher_url: default_publisher_url(),
            aggregator_url: default_aggregator_url(),
            fallback_aggregator_urls: vec![],
            epochs: default_epochs(),
        }
    }
}

impl WalrusConf {
    /// Build a [`WalrusClient`] talking to the configured publisher and
    /// aggregators.
    pub(crate) fn client(&self) -> WalrusClient {
        self.fallback_aggregator_urls
            .iter()
            .fold(
                WalrusClient::builder()
                    .with_publisher_url(&self.publisher_url)
                    .with_aggregator_url(&self.aggregator_url),
                |builder, url| builder.with_fallback_aggregator_url(url),
            )
            .build()
    }
}

// == Used by clap ==

/// Expands `~/` to the user's home directory in path arguments.
pub(crate) fn expand_tilde(path: &str) -> AnyResult<PathBuf> {
    if let Some(path) = path.strip_prefix("~/") {
        match home::home_dir() {
            Some(home) => return Ok(home.join(path)),
            None => return Err(anyhow!("Could not find home directory")),
        }
    }

    Ok(path.into())
}

// == Used by serde ==

fn default_publisher_url() -> String {
    WALRUS_PUBLISHER_URL.to_string()
}

fn default_aggregator_url() -> String {
    WALRUS_AGGREGATOR_URL.to_string()
}

fn default_epochs() -> u64 {
    5
}
