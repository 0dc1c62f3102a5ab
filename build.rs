use chrono::{DateTime, Local};
use std::{process::Command, time::SystemTime};

fn exe_cmd(cmd: &mut Command) -> anyhow::Result<String> {
    let output = cmd.output()?;

    if output.status.success() {
        Ok(String::from_utf8(output.stdout)?)
    } else {
        anyhow::bail!("{}", String::from_utf8_lossy(&output.stderr))
    }
}

// 构建环境中不一定有git仓库, 失败时留空
fn git_info(args: &[&str]) -> String {
    match exe_cmd(Command::new("git").args(args)) {
        Ok(s) => s.trim().to_string(),
        Err(e) => {
            println!("cargo:warning=git {} failed: {e}", args.join(" "));
            String::default()
        }
    }
}

fn main() {
    let git_commit_hash = git_info(&["log", "-n", "1", "--pretty=format:%H"]);
    let git_commit_hash = &git_commit_hash[..8.min(git_commit_hash.len())];
    let git_branch = git_info(&["branch", "--show-current"]);

    println!(
        "cargo:rustc-env=CARDCRYPT_VERSION_INFO={}-{}",
        env!("CARGO_PKG_VERSION"),
        DateTime::<Local>::from(SystemTime::now()).format("%Y/%m/%d-%H:%M:%S:%Z")
    );

    println!(
        "cargo:rustc-env=CARDCRYPT_GIT_INFO={}-{}",
        git_branch, git_commit_hash
    );
}
