use {
    crate::{display::*, prelude::*},
    thiserror::Error,
    waltodo_sdk::walrus::{VerificationError, WalrusError},
};

/// Custom error definitions for the Waltodo CLI. Takes care of displaying
/// a pretty summary in the console.
#[derive(Debug, Error)]
pub(crate) enum WaltodoCliError {
    #[error("{error}{separator}\n{0}", error = "Syntax Error".red().bold(), separator = separator())]
    SyntaxError(clap::error::Error),
    #[error("{error}{separator}\n{0}", error = "IO Error".red().bold(), separator = separator())]
    IoError(std::io::Error),
    #[error("{error}{separator}\n{0}", error = "Walrus Error".red().bold(), separator = separator())]
    Walrus(WalrusError),
    #[error(
        "{error} {code}{separator}\n{0}",
        error = "Verification Error".red().bold(),
        code = .0.code().truecolor(100, 100, 100),
        separator = separator()
    )]
    Verification(VerificationError),
    #[error("{error}{separator}\n{0}", error = "Error".red().bold(), separator = separator())]
    Any(anyhow::Error),
}

impl WaltodoCliError {
    /// Stable error code for machine consumers, if there is one.
    pub(crate) fn code(&self) -> Option<&'static str> {
        match self {
            WaltodoCliError::Verification(e) => Some(e.code()),
            _ => None,
        }
    }
}
