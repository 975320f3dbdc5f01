use std::io::Write;

use cipher::rsa::{self, PrivateKey, PublicKey};
use cipher::{DefaultRand, Rand};
use clap::Args;

use super::args::PassArgs;
use super::Context;
use crate::ty::KeyTuple;

#[derive(Args, Clone)]
#[group(required = true, multiple = false, id = "recipient")]
pub struct RecipientArgs {
    #[arg(long, group = "recipient", value_name = "USER")]
    #[arg(help = "encrypt to a registered user")]
    to: Option<String>,

    #[arg(long, group = "recipient", value_name = "E,N")]
    #[arg(help = "encrypt to the public key `e,n`")]
    pubkey: Option<KeyTuple>,
}

#[derive(Args, Clone)]
#[group(required = true, multiple = false, id = "owner")]
pub struct OwnerArgs {
    #[arg(long, group = "owner", value_name = "USER")]
    #[arg(help = "decrypt with the private key of a registered user")]
    user: Option<String>,

    #[arg(long, group = "owner", value_name = "D,N")]
    #[arg(help = "decrypt with the private key `d,n`")]
    privkey: Option<KeyTuple>,
}

#[derive(Args, Clone)]
#[command(about = "encrypt a message with a public key")]
pub struct EncryptArgs {
    #[arg(value_name = "MESSAGE")]
    message: String,

    #[command(flatten)]
    recipient: RecipientArgs,

    #[arg(long, value_name = "SALT")]
    #[arg(help = "the salt interleaved into the message, random alphanumeric if not specified")]
    salt: Option<String>,
}

#[derive(Args, Clone)]
#[command(about = "decrypt a message with a private key")]
pub struct DecryptArgs {
    #[arg(value_name = "CIPHERTEXT")]
    ciphertext: String,

    #[command(flatten)]
    owner: OwnerArgs,

    #[command(flatten)]
    pass: PassArgs,
}

impl RecipientArgs {
    fn public_key(&self, ctx: &Context) -> anyhow::Result<PublicKey> {
        match (self.to.as_deref(), self.pubkey.as_ref()) {
            (Some(user), _) => Ok(ctx.keyring().public_key(user)?),
            (None, Some(key)) => Ok(key.clone().into_public_key()),
            (None, None) => anyhow::bail!("need `--to` or `--pubkey`"),
        }
    }
}

impl EncryptArgs {
    pub fn run<R: Rand>(&self, ctx: &Context, rng: &mut R) -> anyhow::Result<String> {
        anyhow::ensure!(!self.message.is_empty(), "message can not empty");

        let salt = match self.salt.as_ref() {
            Some(s) => {
                anyhow::ensure!(!s.is_empty(), "salt can not empty");
                s.clone()
            }
            None => rng.rand_alphanumeric(ctx.config.salt_len),
        };

        let pk = self.recipient.public_key(ctx)?;
        Ok(rsa::encrypt(&self.message, &pk, &salt, &ctx.config.iv)?)
    }

    pub fn exe<W: Write>(self, ctx: &Context, out: &mut W) -> anyhow::Result<()> {
        let cipher = self.run(ctx, &mut DefaultRand::default())?;
        writeln!(out, "{cipher}")?;
        Ok(())
    }
}

impl DecryptArgs {
    fn private_key(&mut self, ctx: &Context) -> anyhow::Result<PrivateKey> {
        if let Some(user) = self.owner.user.as_deref() {
            let pass = self.pass.passphrase()?;
            let pair = ctx.keyring().unlock(user, &pass)?;
            Ok(pair.into_keys().1)
        } else if let Some(key) = self.owner.privkey.as_ref() {
            Ok(key.clone().into_private_key())
        } else {
            anyhow::bail!("need `--user` or `--privkey`")
        }
    }

    pub fn exe<W: Write>(mut self, ctx: &Context, out: &mut W) -> anyhow::Result<()> {
        anyhow::ensure!(!self.ciphertext.trim().is_empty(), "ciphertext can not empty");

        let sk = self.private_key(ctx)?;
        let plain = rsa::decrypt(&self.ciphertext, &sk, &ctx.config.iv)?;
        writeln!(out, "{plain}")?;
        Ok(())
    }
}
