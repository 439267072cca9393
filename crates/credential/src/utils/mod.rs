//! Utility modules

pub mod secret_string;
pub mod time;

pub use secret_string::SecretString;
pub use time::age_in_days;
