//! Credential sinks
//!
//! Destinations for a newly minted key pair:
//!
//! - [`FileSink`]: JSON file, atomic replace, owner-only permissions
//! - [`ProfileSink`]: local AWS CLI profile via `aws configure set`
//! - [`CircleCiSink`]: CircleCI context environment variables
//! - [`MemorySink`]: in-process, for tests

pub mod circleci;
pub mod file;
pub mod memory;
pub mod profile;

pub use circleci::{CircleCiSink, CircleCiSinkConfig};
pub use file::{DEFAULT_FILE_NAME, FileSink, FileSinkConfig};
pub use memory::MemorySink;
pub use profile::{ProfileSink, ProfileSinkConfig};
