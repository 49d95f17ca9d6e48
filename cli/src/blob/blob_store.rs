use {
    super::{blob_verify::run_verification, VerificationArgs},
    crate::{command_title, display::json_output, loading, notify_success, prelude::*},
    log::debug,
    serde_json::json,
    waltodo_sdk::walrus::ExpectedAttributes,
};

/// Upload `file` to Walrus, optionally verifying it straight away.
pub(crate) async fn store_blob(
    file: PathBuf,
    epochs: Option<u64>,
    send_to: Option<String>,
    verify: bool,
    verification: VerificationArgs,
    conf_path: PathBuf,
) -> AnyResult<(), WaltodoCliError> {
    command_title!("Storing '{}' on Walrus", file.display());

    let conf = CliConf::load_or_default(&conf_path).await;

    let content = tokio::fs::read(&file)
        .await
        .map_err(WaltodoCliError::IoError)?;
    let epochs = epochs.unwrap_or(conf.walrus.epochs);
    let client = conf.walrus.client();

    let len = content.len();
    let upload_handle = loading!("Uploading {len} bytes for {epochs} epochs...");

    let storage_info = match client
        .upload_bytes(content.clone(), epochs, send_to.as_deref())
        .await
    {
        Ok(storage_info) => {
            upload_handle.success();

            storage_info
        }
        Err(e) => {
            upload_handle.error();

            return Err(WaltodoCliError::Walrus(e));
        }
    };

    let blob_id = storage_info
        .blob_id()
        .map(str::to_string)
        .ok_or_else(|| {
            WaltodoCliError::Any(anyhow!("Publisher response did not contain a blob ID"))
        })?;

    debug!("Publisher answered with {storage_info:?}");

    notify_success!("Stored blob {}", blob_id.truecolor(100, 100, 100));

    let verification = if verify {
        let options = verification.apply(conf.verification);

        Some(
            run_verification(
                client,
                &blob_id,
                &content,
                &ExpectedAttributes::new(),
                &options,
            )
            .await?,
        )
    } else {
        None
    };

    json_output(&json!({
        "blob_id": blob_id,
        "storage": storage_info,
        "verification": verification,
    }))?;

    Ok(())
}
