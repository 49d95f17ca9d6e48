mod blob;
mod storage;
mod verification;

// Public exports
pub use {blob::*, storage::*, verification::*};
