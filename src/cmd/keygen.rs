use std::io::Write;

use cipher::rsa::KeyPair;
use cipher::{DefaultRand, Rand};
use clap::Args;

use super::Context;

#[derive(Args, Clone)]
#[command(about = "generate a RSA key pair and print it, nothing is registered")]
pub struct KeygenArgs {
    #[arg(long, value_name = "BITs")]
    #[arg(help = "the public key modulus bits length, default to the `key_bits` config")]
    bits: Option<usize>,

    #[arg(long = "test", value_name = "ROUNDS")]
    #[arg(help = "Miller-Rabin rounds for each prime, at least 7")]
    test: Option<usize>,
}

impl KeygenArgs {
    pub fn run<R: Rand>(&self, ctx: &Context, rng: &mut R) -> anyhow::Result<KeyPair> {
        let mut generator = ctx
            .config
            .key_generator(self.bits.unwrap_or(ctx.config.key_bits));
        if let Some(rounds) = self.test {
            generator = generator.test_rounds(rounds);
        }

        Ok(generator.generate(rng)?)
    }

    pub fn exe<W: Write>(self, ctx: &Context, out: &mut W) -> anyhow::Result<()> {
        let pair = self.run(ctx, &mut DefaultRand::default())?;
        writeln!(out, "public key (e, n) = {}", pair.public_key())?;
        writeln!(out, "private key (d, n) = {}", pair.private_key())?;
        Ok(())
    }
}
