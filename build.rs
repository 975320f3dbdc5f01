use chrono::{DateTime, Local};
use std::{process::Command, time::SystemTime};

fn exe_cmd(cmd: &mut Command) -> anyhow::Result<String> {
    let output = cmd.output()?;
    anyhow::ensure!(output.status.success(), "{}", String::from_utf8(output.stderr)?);
    Ok(String::from_utf8(output.stdout)?)
}

fn main() {
    // 不在git仓库中构建时只记录版本和时间
    let commit = exe_cmd(Command::new("git").args(["log", "-n", "1", "--pretty=format:%h"]))
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let built = DateTime::<Local>::from(SystemTime::now()).format("%Y/%m/%d-%H:%M:%S:%Z");
    if commit.is_empty() {
        println!(
            "cargo:rustc-env=ACRYPT_VERSION_INFO={}-{built}",
            env!("CARGO_PKG_VERSION")
        );
    } else {
        println!(
            "cargo:rustc-env=ACRYPT_VERSION_INFO={}-{commit}-{built}",
            env!("CARGO_PKG_VERSION")
        );
    }
}
