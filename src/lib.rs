pub mod cmd;
pub mod error;
pub mod keyring;
pub mod registry;
pub mod ty;

pub use error::AcryptError;
