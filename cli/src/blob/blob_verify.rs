use {
    super::VerificationArgs,
    crate::{
        command_title,
        display::json_output,
        item,
        loading,
        notify_error,
        notify_success,
        prelude::*,
    },
    waltodo_sdk::walrus::{
        BlobVerificationManager,
        ExpectedAttributes,
        VerificationResult,
        WalrusClient,
    },
};

/// Verify that `blob_id` holds the content of `file`.
pub(crate) async fn verify_blob(
    blob_id: String,
    file: PathBuf,
    attributes: ExpectedAttributes,
    verification: VerificationArgs,
    conf_path: PathBuf,
) -> AnyResult<VerificationResult, WaltodoCliError> {
    command_title!("Verifying blob '{blob_id}'");

    let conf = CliConf::load_or_default(&conf_path).await;

    let expected = tokio::fs::read(&file)
        .await
        .map_err(WaltodoCliError::IoError)?;
    let options = verification.apply(conf.verification);

    let result = run_verification(
        conf.walrus.client(),
        &blob_id,
        &expected,
        &attributes,
        &options,
    )
    .await?;

    json_output(&result)?;

    Ok(result)
}

/// Run the verification pipeline and print a summary of the result.
pub(crate) async fn run_verification(
    client: WalrusClient,
    blob_id: &str,
    expected: &[u8],
    attributes: &ExpectedAttributes,
    options: &VerificationOptions,
) -> AnyResult<VerificationResult, WaltodoCliError> {
    let manager = BlobVerificationManager::from_client(client);

    let verify_handle = loading!("Verifying blob...");

    let result = match manager
        .verify_blob(blob_id, expected, attributes, options)
        .await
    {
        Ok(result) => {
            verify_handle.success();

            result
        }
        Err(e) => {
            verify_handle.error();

            return Err(WaltodoCliError::Verification(e));
        }
    };

    if result.success {
        notify_success!(
            "Blob {blob_id} holds the expected {} bytes",
            result.details.size_bytes
        );
    } else {
        notify_error!("Blob {blob_id} does not hold the expected content");
    }

    item!("Certified: {}", yes_no(result.details.certified));
    item!(
        "Proof of availability: {} ({} providers attested)",
        yes_no(result.poa_complete),
        result.providers
    );

    if options.verify_attributes {
        item!("Attributes: {} checked", attributes.len());
    }

    Ok(result)
}

fn yes_no(value: bool) -> colored::ColoredString {
    if value {
        "yes".green()
    } else {
        "no".yellow()
    }
}
