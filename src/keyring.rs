//! Private keys at rest: `(d, n)` as a JSON array, wrapped by a passphrase cipher and stored
//! with the public key in the registry.

use cipher::rsa::{KeyGenerator, KeyPair, PrivateKey, PublicKey};
use cipher::{CipherError, KeyWrap, Rand};

use crate::error::AcryptError;
use crate::registry::{validate_username, RegistryStore, UserRecord};
use crate::ty::KeyTuple;

#[derive(Clone, Debug, Default)]
pub struct KeyProtector<W> {
    wrapper: W,
}

pub struct Keyring<S, W> {
    store: S,
    protector: KeyProtector<W>,
}

fn check_passphrase(passphrase: &str) -> Result<(), AcryptError> {
    if passphrase.is_empty() {
        Err(AcryptError::InvalidInput(
            "the passphrase can not be empty".to_string(),
        ))
    } else {
        Ok(())
    }
}

impl<W: KeyWrap> KeyProtector<W> {
    pub fn new(wrapper: W) -> Self {
        Self { wrapper }
    }

    pub fn protect(&self, key: &PrivateKey, passphrase: &str) -> Result<String, AcryptError> {
        check_passphrase(passphrase)?;
        let serialized = KeyTuple::from(key).to_json()?;
        Ok(self.wrapper.wrap(&serialized, passphrase)?)
    }

    /// `WrongPassphrase` and `Corrupt` come back as [`AcryptError::Cipher`]
    pub fn reveal(&self, blob: &str, passphrase: &str) -> Result<PrivateKey, AcryptError> {
        check_passphrase(passphrase)?;
        let serialized = self.wrapper.unwrap(blob, passphrase)?;

        let key = KeyTuple::from_json(&serialized)
            .map_err(|e| CipherError::Corrupt(format!("the unwrapped text is not a key: {e}")))?
            .into_private_key();
        key.is_valid()
            .map_err(|e| CipherError::Corrupt(e.to_string()))?;

        Ok(key)
    }
}

impl<S: RegistryStore, W: KeyWrap> Keyring<S, W> {
    pub fn new(store: S, wrapper: W) -> Self {
        Self {
            store,
            protector: KeyProtector::new(wrapper),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn protector(&self) -> &KeyProtector<W> {
        &self.protector
    }

    pub fn register(
        &mut self,
        username: &str,
        public_key: &PublicKey,
        wrapped_private_key: &str,
    ) -> Result<(), AcryptError> {
        let mut registry = self.store.load()?;
        registry.insert(
            username,
            UserRecord {
                public_key: KeyTuple::from(public_key),
                encrypted_private_key: wrapped_private_key.to_string(),
            },
        )?;
        self.store.save(&registry)?;

        log::info!("registered the user `{username}`");
        Ok(())
    }

    pub fn lookup(&self, username: &str) -> Result<UserRecord, AcryptError> {
        self.store.load()?.get(username).cloned()
    }

    pub fn public_key(&self, username: &str) -> Result<PublicKey, AcryptError> {
        Ok(self.lookup(username)?.public_key.into_public_key())
    }

    pub fn list_usernames(&self) -> Result<Vec<String>, AcryptError> {
        Ok(self.store.load()?.usernames())
    }

    /// generate a key pair for `username`, keep the private half wrapped with `passphrase`
    pub fn enroll<R: Rand>(
        &mut self,
        username: &str,
        passphrase: &str,
        generator: &KeyGenerator,
        rng: &mut R,
    ) -> Result<PublicKey, AcryptError> {
        validate_username(username)?;
        check_passphrase(passphrase)?;
        // 生成密钥之前检查, 大密钥生成较慢
        if self.store.load()?.contains(username) {
            return Err(AcryptError::DuplicateUser(username.to_string()));
        }

        let (pk, sk) = generator.generate(rng)?.into_keys();
        let blob = self.protector.protect(&sk, passphrase)?;
        self.register(username, &pk, &blob)?;

        Ok(pk)
    }

    pub fn unlock(&self, username: &str, passphrase: &str) -> Result<KeyPair, AcryptError> {
        let record = self.lookup(username)?;
        let sk = self
            .protector
            .reveal(&record.encrypted_private_key, passphrase)?;

        KeyPair::from_keys(record.public_key.into_public_key(), sk)
            .map_err(|_| AcryptError::KeyMismatch(username.to_string()))
    }
}
