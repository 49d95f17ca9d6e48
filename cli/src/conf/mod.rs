use crate::{
    command_title,
    display::{is_json_mode, json_output},
    loading,
    prelude::*,
};

#[derive(Args, Clone, Debug, Default)]
pub(crate) struct ConfCommand {
    #[arg(
        long = "walrus.publisher-url",
        help = "Set the Walrus publisher URL",
        value_name = "URL"
    )]
    walrus_publisher_url: Option<reqwest::Url>,
    #[arg(
        long = "walrus.aggregator-url",
        help = "Set the primary Walrus aggregator URL",
        value_name = "URL"
    )]
    walrus_aggregator_url: Option<reqwest::Url>,
    /// Replaces the configured list when given at least once.
    #[arg(
        long = "walrus.fallback-aggregator-url",
        help = "Set a fallback aggregator URL, can be repeated",
        value_name = "URL"
    )]
    walrus_fallback_aggregator_urls: Vec<reqwest::Url>,
    #[arg(
        long = "walrus.epochs",
        help = "Set the default storage duration in epochs",
        value_name = "EPOCHS"
    )]
    walrus_epochs: Option<u64>,
    #[arg(
        long = "verification.max-retries",
        help = "Set the number of retries per network step",
        value_name = "N"
    )]
    verification_max_retries: Option<u32>,
    #[arg(
        long = "verification.base-delay",
        help = "Set the backoff before the first retry in milliseconds",
        value_name = "MS"
    )]
    verification_base_delay_ms: Option<u64>,
    #[arg(
        long = "verification.timeout",
        help = "Set the timeout for a single network call in milliseconds",
        value_name = "MS"
    )]
    verification_timeout_ms: Option<u64>,
    #[arg(
        long = "verification.require-certification",
        help = "Whether verification fails for uncertified blobs",
        value_name = "BOOL"
    )]
    verification_require_certification: Option<bool>,
    #[arg(
        long = "verification.verify-attributes",
        help = "Whether verification checks expected attributes",
        value_name = "BOOL"
    )]
    verification_verify_attributes: Option<bool>,
    /// Hidden argument used for testing to set the path of the configuration
    /// file.
    #[arg(
        long = "conf-path",
        hide = true,
        default_value = CLI_CONF_PATH,
        value_parser = ValueParser::from(expand_tilde)
    )]
    conf_path: PathBuf,
}

impl ConfCommand {
    fn is_empty(&self) -> bool {
        self.walrus_publisher_url.is_none()
            && self.walrus_aggregator_url.is_none()
            && self.walrus_fallback_aggregator_urls.is_empty()
            && self.walrus_epochs.is_none()
            && self.verification_max_retries.is_none()
            && self.verification_base_delay_ms.is_none()
            && self.verification_timeout_ms.is_none()
            && self.verification_require_certification.is_none()
            && self.verification_verify_attributes.is_none()
    }

    fn apply(self, conf: &mut CliConf) {
        let walrus = &mut conf.walrus;

        if let Some(url) = self.walrus_publisher_url {
            walrus.publisher_url = url.to_string();
        }

        if let Some(url) = self.walrus_aggregator_url {
            walrus.aggregator_url = url.to_string();
        }

        if !self.walrus_fallback_aggregator_urls.is_empty() {
            walrus.fallback_aggregator_urls = self
                .walrus_fallback_aggregator_urls
                .iter()
                .map(ToString::to_string)
                .collect();
        }

        walrus.epochs = self.walrus_epochs.unwrap_or(walrus.epochs);

        let verification = &mut conf.verification;

        verification.max_retries = self
            .verification_max_retries
            .unwrap_or(verification.max_retries);
        verification.base_delay_ms = self
            .verification_base_delay_ms
            .unwrap_or(verification.base_delay_ms);
        verification.timeout_ms = self
            .verification_timeout_ms
            .unwrap_or(verification.timeout_ms);
        verification.require_certification = self
            .verification_require_certification
            .unwrap_or(verification.require_certification);
        verification.verify_attributes = self
            .verification_verify_attributes
            .unwrap_or(verification.verify_attributes);
    }
}

/// Handle the provided conf command. The [ConfCommand] instance is passed from
/// [crate::main].
pub(crate) async fn handle(command: ConfCommand) -> AnyResult<(), WaltodoCliError> {
    let conf_path = command.conf_path.clone();

    // Without any flags we just want to display the current configuration.
    if command.is_empty() {
        let conf = CliConf::load_or_default(&conf_path).await;

        command_title!("Current Waltodo CLI Configuration");

        if !is_json_mode() {
            println!("{conf:#?}");
        }

        return json_output(&conf);
    }

    // Saving over a file we could not parse would drop whatever it held.
    let mut conf = match CliConf::load_from_path(&conf_path).await {
        Ok(conf) => conf,
        Err(e) if CliConf::exists(&conf_path).await => {
            return Err(WaltodoCliError::Any(anyhow!(
                "Refusing to overwrite unreadable configuration at {}: {e}",
                conf_path.display()
            )));
        }
        Err(_) => CliConf::default(),
    };

    command_title!("Updating Waltodo CLI Configuration");

    let conf_handle = loading!("Updating configuration...");

    command.apply(&mut conf);

    match conf.save(&conf_path).await {
        Ok(()) => {
            conf_handle.success();

            json_output(&conf)
        }
        Err(e) => {
            conf_handle.error();

            Err(WaltodoCliError::Any(e))
        }
    }
}
