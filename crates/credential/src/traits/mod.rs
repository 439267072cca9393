//! Collaborator traits the rotation engine drives
//!
//! - [`KeyStore`]: the identity's key set (list / delete / create)
//! - [`CredentialSink`]: a destination for a newly minted key pair

mod sink;
mod store;

pub use sink::CredentialSink;
pub use store::KeyStore;

#[cfg(test)]
pub use sink::MockCredentialSink;
#[cfg(test)]
pub use store::MockKeyStore;
