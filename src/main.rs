use acrypt::cmd::AcryptArgs;
use clap::Parser;
use log::LevelFilter;

fn main() {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(e) = AcryptArgs::parse().exe() {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
