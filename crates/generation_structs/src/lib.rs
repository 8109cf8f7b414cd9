//! Common structs for 3D generation jobs shared across crates.

mod asset;
mod fingerprint;
mod job;
mod options;

pub use asset::*;
pub use fingerprint::*;
pub use job::*;
pub use options::*;
