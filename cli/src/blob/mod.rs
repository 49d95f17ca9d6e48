mod blob_store;
mod blob_verify;

use {crate::prelude::*, blob_store::*, blob_verify::*};

#[derive(Subcommand)]
pub(crate) enum BlobCommand {
    #[command(about = "Upload a file to Walrus and print its blob ID")]
    Store {
        /// The file to upload.
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Storage duration. Defaults to the configured number of epochs.
        #[arg(long = "epochs", short = 'e', help = "Number of epochs to store the blob for")]
        epochs: Option<u64>,
        #[arg(
            long = "send-to",
            help = "Address that should receive the created Blob object",
            value_name = "ADDRESS"
        )]
        send_to: Option<String>,
        #[arg(long = "verify", help = "Verify the blob right after uploading it")]
        verify: bool,
        #[command(flatten)]
        verification: VerificationArgs,
        #[command(flatten)]
        conf: ConfPathArg,
    },

    #[command(about = "Verify that a blob holds the expected content")]
    Verify {
        /// The blob ID returned at upload time.
        #[arg(value_name = "BLOB_ID")]
        blob_id: String,
        #[arg(
            long = "file",
            short = 'f',
            help = "File with the bytes the blob is expected to hold",
            value_name = "FILE"
        )]
        file: PathBuf,
        #[arg(
            long = "attr",
            short = 'a',
            help = "Expected attribute, can be repeated",
            value_name = "KEY=VALUE",
            value_parser = ValueParser::from(parse_attribute)
        )]
        attributes: Vec<(String, String)>,
        #[command(flatten)]
        verification: VerificationArgs,
        #[command(flatten)]
        conf: ConfPathArg,
    },
}

/// Flags that override the configured [`VerificationOptions`].
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct VerificationArgs {
    #[arg(
        long = "require-certification",
        help = "Fail unless the blob is certified on-chain"
    )]
    require_certification: bool,
    #[arg(
        long = "verify-attributes",
        help = "Fail unless the blob carries every expected attribute"
    )]
    verify_attributes: bool,
    #[arg(long = "max-retries", help = "Retries per network step", value_name = "N")]
    max_retries: Option<u32>,
    #[arg(
        long = "base-delay",
        help = "Backoff before the first retry in milliseconds",
        value_name = "MS"
    )]
    base_delay_ms: Option<u64>,
    #[arg(
        long = "timeout",
        help = "Timeout for a single network call in milliseconds",
        value_name = "MS"
    )]
    timeout_ms: Option<u64>,
}

impl VerificationArgs {
    pub(crate) fn apply(&self, mut options: VerificationOptions) -> VerificationOptions {
        options.require_certification |= self.require_certification;
        options.verify_attributes |= self.verify_attributes;
        options.max_retries = self.max_retries.unwrap_or(options.max_retries);
        options.base_delay_ms = self.base_delay_ms.unwrap_or(options.base_delay_ms);
        options.timeout_ms = self.timeout_ms.unwrap_or(options.timeout_ms);

        options
    }
}

/// Hidden argument used for testing to set the path of the configuration
/// file.
#[derive(Args, Clone, Debug)]
pub(crate) struct ConfPathArg {
    #[arg(
        long = "conf-path",
        hide = true,
        default_value = CLI_CONF_PATH,
        value_parser = ValueParser::from(expand_tilde)
    )]
    pub(crate) conf_path: PathBuf,
}

/// Parse `KEY=VALUE`. The value may itself contain `=`.
fn parse_attribute(raw: &str) -> AnyResult<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(anyhow!("Expected KEY=VALUE, got '{raw}'")),
    }
}

/// Handle the provided blob command. The [BlobCommand] instance is passed from
/// [crate::main].
pub(crate) async fn handle(command: BlobCommand) -> AnyResult<(), WaltodoCliError> {
    match command {
        // == `$ waltodo blob store` ==
        BlobCommand::Store {
            file,
            epochs,
            send_to,
            verify,
            verification,
            conf,
        } => store_blob(file, epochs, send_to, verify, verification, conf.conf_path).await,

        // == `$ waltodo blob verify` ==
        BlobCommand::Verify {
            blob_id,
            file,
            attributes,
            verification,
            conf,
        } => {
            verify_blob(
                blob_id,
                file,
                attributes.into_iter().collect(),
                verification,
                conf.conf_path,
            )
            .await
            .map(|_| ())
        }
    }
}
