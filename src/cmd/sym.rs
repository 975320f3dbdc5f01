use std::io::Write;

use cipher::{KeyWrap, MultiCrypt};
use clap::Args;

use super::args::PassArgs;

#[derive(Args, Clone)]
#[command(about = "encrypt or decrypt a text with the MultiCrypt passphrase cipher")]
pub struct SymArgs {
    #[arg(value_name = "TEXT")]
    text: String,

    #[arg(short, long, help = "decrypt the text")]
    decrypt: bool,

    #[command(flatten)]
    pass: PassArgs,
}

impl SymArgs {
    pub fn exe<W: Write>(mut self, out: &mut W) -> anyhow::Result<()> {
        anyhow::ensure!(!self.text.is_empty(), "text can not empty");

        let res = if self.decrypt {
            let pass = self.pass.passphrase()?;
            MultiCrypt.unwrap(&self.text, &pass)?
        } else {
            let pass = self.pass.new_passphrase()?;
            MultiCrypt.wrap(&self.text, &pass)?
        };

        writeln!(out, "{res}")?;
        Ok(())
    }
}
