use std::io::Write;
use std::path::PathBuf;

use cipher::MultiCrypt;
use clap::{Parser, Subcommand};

use crate::keyring::Keyring;
use crate::registry::JsonFileStore;

pub mod args;
use args::CommonArgs;

pub mod config;
use config::AcryptConfig;

mod keygen;
pub use keygen::KeygenArgs;

mod user;
pub use user::{RegisterArgs, RevealArgs, ShowArgs, UsersArgs};

mod message;
pub use message::{DecryptArgs, EncryptArgs};

mod sym;
pub use sym::SymArgs;

#[derive(Parser, Clone)]
#[command(name = "acrypt", version = env!("ACRYPT_VERSION_INFO"))]
#[command(about = "RSA message encryption between registered users")]
pub struct AcryptArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub cmd: AcryptSubArgs,
}

#[derive(Subcommand, Clone)]
pub enum AcryptSubArgs {
    #[command(name = "keygen")]
    Keygen(KeygenArgs),
    #[command(name = "register")]
    Register(RegisterArgs),
    #[command(name = "users")]
    Users(UsersArgs),
    #[command(name = "show")]
    Show(ShowArgs),
    #[command(name = "encrypt")]
    Encrypt(EncryptArgs),
    #[command(name = "decrypt")]
    Decrypt(DecryptArgs),
    #[command(name = "reveal")]
    Reveal(RevealArgs),
    #[command(name = "sym")]
    Sym(SymArgs),
}

/// resolved configuration of one run
pub struct Context {
    pub config: AcryptConfig,
    pub registry: PathBuf,
}

impl Context {
    pub fn new(common: &CommonArgs) -> anyhow::Result<Self> {
        let config = AcryptConfig::config_with_file(common.config.as_deref())?.clone();
        Ok(Self::with_config(config, common.registry.clone()))
    }

    pub fn with_config(config: AcryptConfig, registry: Option<PathBuf>) -> Self {
        let registry = registry.unwrap_or_else(|| config.registry.clone());
        Self { config, registry }
    }

    pub fn keyring(&self) -> Keyring<JsonFileStore, MultiCrypt> {
        Keyring::new(JsonFileStore::new(&self.registry), MultiCrypt)
    }
}

impl AcryptSubArgs {
    pub fn exe<W: Write>(self, ctx: &Context, out: &mut W) -> anyhow::Result<()> {
        match self {
            AcryptSubArgs::Keygen(a) => a.exe(ctx, out),
            AcryptSubArgs::Register(a) => a.exe(ctx, out),
            AcryptSubArgs::Users(a) => a.exe(ctx, out),
            AcryptSubArgs::Show(a) => a.exe(ctx, out),
            AcryptSubArgs::Encrypt(a) => a.exe(ctx, out),
            AcryptSubArgs::Decrypt(a) => a.exe(ctx, out),
            AcryptSubArgs::Reveal(a) => a.exe(ctx, out),
            AcryptSubArgs::Sym(a) => a.exe(out),
        }
    }
}

impl AcryptArgs {
    pub fn exe(self) -> anyhow::Result<()> {
        let ctx = Context::new(&self.common)?;
        log::debug!("registry `{}`", ctx.registry.display());

        let mut out = std::io::stdout().lock();
        self.cmd.exe(&ctx, &mut out)?;
        out.flush()?;
        Ok(())
    }
}
