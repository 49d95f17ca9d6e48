mod blob;
mod conf;
mod display;
mod error;
mod prelude;

use crate::prelude::*;

#[derive(Parser)]
#[command(version, about = "Waltodo CLI")]
struct Cli {
    #[arg(
        long = "json",
        global = true,
        help = "Print machine-readable JSON instead of decorated output"
    )]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(subcommand, about = "Store and verify Walrus blobs")]
    Blob(blob::BlobCommand),
    #[command(about = "Show or update the Waltodo CLI configuration")]
    Conf(conf::ConfCommand),
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Customize parsing error handling.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // These 2 are "not real errors" that are used to stop the execution
            // to display the CLI help or version.
            match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    println!("{}", e);

                    std::process::exit(0);
                }
                _ => (),
            }

            eprintln!(
                "{ballot} {error}",
                ballot = "✘".red().bold(),
                error = WaltodoCliError::SyntaxError(e)
            );

            std::process::exit(1);
        }
    };

    JSON_MODE.store(cli.json, Ordering::Relaxed);

    // Send each sub-command to the respective handler.
    let result = match cli.command {
        Command::Blob(blob) => blob::handle(blob).await,
        Command::Conf(conf) => conf::handle(conf).await,
    };

    // Handle any errors that occurred during command execution.
    if let Err(e) = result {
        match render_error(&e, JSON_MODE.load(Ordering::Relaxed)) {
            ErrorReport::Stdout(json) => println!("{json}"),
            ErrorReport::Stderr(text) => eprintln!("{text}"),
        }

        std::process::exit(1);
    }
}

/// Where and how a failed command is reported.
#[derive(Debug, PartialEq, Eq)]
enum ErrorReport {
    /// `{"error":{"code","message"}}` for machine consumers.
    Stdout(String),
    /// Decorated text for humans.
    Stderr(String),
}

fn render_error(e: &WaltodoCliError, json: bool) -> ErrorReport {
    if !json {
        return ErrorReport::Stderr(format!("{ballot} {e}", ballot = "✘".red().bold()));
    }

    let message = match e {
        WaltodoCliError::Verification(inner) => inner.to_string(),
        other => other.to_string(),
    };

    ErrorReport::Stdout(
        serde_json::json!({ "error": { "code": e.code(), "message": message } }).to_string(),
    )
}
