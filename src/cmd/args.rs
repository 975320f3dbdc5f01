use std::ops::Deref;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Args;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Args, Clone, Default)]
pub struct CommonArgs {
    #[arg(long, global = true, value_name = "FILE")]
    #[arg(help = "the config file path, JSON")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_name = "FILE")]
    #[arg(help = "the registry file path, it overrides the one in the config")]
    pub registry: Option<PathBuf>,
}

#[derive(Args, Clone, Default)]
pub struct PassArgs {
    #[arg(long = "pass", value_name = "PASSPHRASE")]
    #[arg(help = "the passphrase, it will be prompted if not specified")]
    pub pass: Option<Passphrase>,
}

#[derive(Zeroize, ZeroizeOnDrop, Clone, Default)]
pub struct Passphrase {
    pass: String,
}

impl PassArgs {
    /// the given passphrase or ask it once
    pub fn passphrase(&mut self) -> anyhow::Result<Passphrase> {
        match self.pass.take() {
            Some(p) => {
                anyhow::ensure!(!p.is_empty(), "passphrase can not empty");
                Ok(p)
            }
            None => Passphrase::read_from_stdio(),
        }
    }

    /// the given passphrase or ask it twice
    pub fn new_passphrase(&mut self) -> anyhow::Result<Passphrase> {
        match self.pass.take() {
            Some(p) => {
                anyhow::ensure!(!p.is_empty(), "passphrase can not empty");
                Ok(p)
            }
            None => Passphrase::read_twice_from_stdio(),
        }
    }
}

impl Passphrase {
    pub fn new(pass: String) -> Self {
        Self { pass }
    }

    fn read_from_stdio() -> anyhow::Result<Self> {
        let pass = rpassword::prompt_password("Input passphrase: ")?;
        anyhow::ensure!(!pass.is_empty(), "passphrase can not empty");
        Ok(Self { pass })
    }

    fn read_twice_from_stdio() -> anyhow::Result<Self> {
        let pass1 = rpassword::prompt_password("Input passphrase: ")?;
        let mut pass2 = rpassword::prompt_password("Input again: ")?;

        let same = pass1 == pass2;
        pass2.zeroize();
        let pass1 = Self { pass: pass1 };
        anyhow::ensure!(same, "passphrase not same between two inputs");
        anyhow::ensure!(!pass1.is_empty(), "passphrase can not empty");
        Ok(pass1)
    }
}

impl Deref for Passphrase {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.pass.as_str()
    }
}

impl FromStr for Passphrase {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_passphrase() {
        let mut args = PassArgs {
            pass: Some("pw".parse().unwrap()),
        };
        assert_eq!(&*args.passphrase().unwrap(), "pw");

        let mut empty = PassArgs {
            pass: Some(Passphrase::new(String::new())),
        };
        assert!(empty.new_passphrase().is_err());
    }
}
