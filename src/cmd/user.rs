use std::io::Write;

use cipher::DefaultRand;
use clap::Args;

use super::args::PassArgs;
use super::Context;
use crate::registry::RegistryStore;
use crate::ty::{KeyTuple, TableShow};

#[derive(Args, Clone)]
#[command(about = "create a key pair for a new user, the private key is kept wrapped with a passphrase")]
pub struct RegisterArgs {
    #[arg(value_name = "USER")]
    user: String,

    #[arg(long, value_name = "BITs")]
    #[arg(help = "the public key modulus bits length, default to the `key_bits` config")]
    bits: Option<usize>,

    #[command(flatten)]
    pass: PassArgs,
}

#[derive(Args, Clone)]
#[command(about = "list the registered users")]
pub struct UsersArgs {}

#[derive(Args, Clone)]
#[command(about = "print the public key of a user")]
pub struct ShowArgs {
    #[arg(value_name = "USER")]
    user: String,
}

#[derive(Args, Clone)]
#[command(about = "print the private key of a user, need the passphrase")]
pub struct RevealArgs {
    #[arg(value_name = "USER")]
    user: String,

    #[command(flatten)]
    pass: PassArgs,
}

struct UserTable(Vec<(String, KeyTuple)>);

impl TableShow for UserTable {
    fn head() -> Vec<&'static str> {
        vec!["user", "bits", "e"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|(user, key)| {
                vec![
                    user.clone(),
                    key.modulus.bits().to_string(),
                    key.exponent.to_string(),
                ]
            })
            .collect()
    }
}

impl RegisterArgs {
    pub fn exe<W: Write>(mut self, ctx: &Context, out: &mut W) -> anyhow::Result<()> {
        let pass = self.pass.new_passphrase()?;
        let generator = ctx
            .config
            .key_generator(self.bits.unwrap_or(ctx.config.key_bits));

        let pk = ctx
            .keyring()
            .enroll(&self.user, &pass, &generator, &mut DefaultRand::default())?;
        writeln!(out, "public key (e, n) = {pk}")?;
        Ok(())
    }
}

impl UsersArgs {
    pub fn exe<W: Write>(self, ctx: &Context, out: &mut W) -> anyhow::Result<()> {
        let ring = ctx.keyring();
        let registry = ring.store().load()?;
        if registry.is_empty() {
            log::info!("no user in `{}`", ring.store().path().display());
            return Ok(());
        }

        let table = UserTable(
            registry
                .iter()
                .map(|(u, r)| (u.to_string(), r.public_key.clone()))
                .collect(),
        );
        out.write_all(table.table().as_bytes())?;
        Ok(())
    }
}

impl ShowArgs {
    pub fn exe<W: Write>(self, ctx: &Context, out: &mut W) -> anyhow::Result<()> {
        let pk = ctx.keyring().public_key(&self.user)?;
        writeln!(out, "{pk}")?;
        Ok(())
    }
}

impl RevealArgs {
    pub fn exe<W: Write>(mut self, ctx: &Context, out: &mut W) -> anyhow::Result<()> {
        let pass = self.pass.passphrase()?;
        let pair = ctx.keyring().unlock(&self.user, &pass)?;
        writeln!(out, "private key (d, n) = {}", pair.private_key())?;
        Ok(())
    }
}
