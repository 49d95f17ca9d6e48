//! Walrus client module provides integration with the Walrus decentralized blob storage system.
//!
//! This module allows for:
//! - Uploading files, bytes and JSON data to the Walrus network
//! - Verifying that an uploaded blob landed intact, carries the expected
//!   attributes, is certified on-chain and is held by storage providers

mod availability;
mod certification;
mod client;
mod error;
mod models;
mod network;
mod reconcile;
mod retry;
mod verification;

// Re-exports
pub use {
    availability::{probe, Attestation, ProbeReport},
    certification::{enforce as enforce_certification, is_certified},
    client::*,
    error::*,
    models::*,
    network::BlobNetwork,
    reconcile::{reconcile, ExpectedAttributes, Mismatch},
    retry::{backoff_schedule, RetryError, RetryExecutor},
    verification::BlobVerificationManager,
};
