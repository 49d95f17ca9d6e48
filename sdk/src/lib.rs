//! Waltodo SDK. Stores todo payloads as Walrus blobs and proves, after every
//! write, that they landed correctly and durably.

/// Walrus client and the blob verification pipeline.
#[cfg(feature = "walrus")]
pub mod walrus;
