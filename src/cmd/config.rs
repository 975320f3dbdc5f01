use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use cipher::rsa::{KeyGenerator, DEFAULT_IV};
use config::Config;
use serde::{Deserialize, Serialize};

use crate::error::AcryptError;

/// defaults < config file < `ACRYPT__*` environment variables
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct AcryptConfig {
    pub registry: PathBuf,

    // modulus bits of the registered keys
    pub key_bits: usize,

    pub prime_test_rounds: usize,

    pub prime_attempts: usize,

    pub exponent_attempts: usize,

    pub iv: String,

    // length of the generated salt
    pub salt_len: usize,
}

impl Default for AcryptConfig {
    fn default() -> Self {
        let registry = match home::home_dir() {
            Some(mut path) => {
                path.push(".config");
                path.push("acrypt");
                path.push("registry.json");
                path
            }
            None => PathBuf::from("acrypt_registry.json"),
        };

        Self {
            registry,
            key_bits: 1024,
            prime_test_rounds: 19,
            prime_attempts: 1 << 20,
            exponent_attempts: 1 << 16,
            iv: DEFAULT_IV.to_string(),
            salt_len: 16,
        }
    }
}

impl AcryptConfig {
    pub fn load(f: Option<&Path>) -> Result<Self, AcryptError> {
        let default_config = Config::try_from(&AcryptConfig::default())?;

        let mut config = Config::builder().add_source(default_config);
        if let Some(f) = f {
            config = config.add_source(config::File::from(f).required(true));
        }
        config = config.add_source(
            config::Environment::with_prefix("ACRYPT")
                .try_parsing(true)
                .separator("__"),
        );

        let mut acrypt: AcryptConfig = config.build()?.try_deserialize()?;
        acrypt.salt_len = acrypt.salt_len.max(1);

        log::trace!("{:?}", acrypt);
        Ok(acrypt)
    }

    /// load once, later calls return the first result whatever `f` is
    pub fn config_with_file(f: Option<&Path>) -> Result<&'static Self, AcryptError> {
        static CONFIG: OnceLock<AcryptConfig> = OnceLock::new();

        if let Some(c) = CONFIG.get() {
            return Ok(c);
        }

        let c = Self::load(f)?;
        Ok(CONFIG.get_or_init(|| c))
    }

    pub fn key_generator(&self, bits: usize) -> KeyGenerator {
        KeyGenerator::new(bits)
            .test_rounds(self.prime_test_rounds)
            .prime_attempts(self.prime_attempts)
            .exponent_attempts(self.exponent_attempts)
    }
}
