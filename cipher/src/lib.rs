mod error;
pub use error::CipherError;

pub use rand::{DefaultRand, Rand, SeedRand};

pub mod multicrypt;
pub use multicrypt::MultiCrypt;

pub mod rsa;

pub trait Encrypt {
    // 写入ciphertext之前不清空
    fn encrypt(&self, plaintext: &[u8], ciphertext: &mut Vec<u8>) -> Result<(), CipherError>;
}

pub trait Decrypt {
    // 写入plaintext之前不清空
    fn decrypt(&self, ciphertext: &[u8], plaintext: &mut Vec<u8>) -> Result<(), CipherError>;
}

/// Symmetric text cipher used to keep private key material at rest.
///
/// Implementations must satisfy `unwrap(wrap(x, k), k) == x` for every non-empty `x` and `k`,
/// and report a wrong `key` as [`CipherError::WrongPassphrase`].
pub trait KeyWrap {
    fn wrap(&self, plaintext: &str, key: &str) -> Result<String, CipherError>;

    fn unwrap(&self, ciphertext: &str, key: &str) -> Result<String, CipherError>;
}

impl<T: KeyWrap + ?Sized> KeyWrap for &T {
    fn wrap(&self, plaintext: &str, key: &str) -> Result<String, CipherError> {
        (**self).wrap(plaintext, key)
    }

    fn unwrap(&self, ciphertext: &str, key: &str) -> Result<String, CipherError> {
        (**self).unwrap(ciphertext, key)
    }
}
