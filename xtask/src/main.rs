use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

const WASM_TARGET: &str = "wasm32-unknown-unknown";

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for wavescape")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy (native and wasm), tests, deny, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates, then on the browser host for wasm
    Clippy,
    /// Run all tests
    Test,
    /// Run cargo deny check
    Deny,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the native workspace
    Build,
    /// Build the browser host for wasm32 in release mode
    Wasm,
    /// Run the wave scene headlessly for a few seconds as a smoke test
    Smoke,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            fmt()?;
            clippy()?;
            test()?;
            deny()?;
            doc()?;
        }
        Commands::Fmt => fmt()?,
        Commands::Clippy => clippy()?,
        Commands::Test => test()?,
        Commands::Deny => deny()?,
        Commands::Doc => doc()?,
        Commands::Build => cargo("build", &["build", "--workspace"])?,
        Commands::Wasm => wasm()?,
        Commands::Smoke => cargo(
            "headless simulation",
            &["run", "-p", "wavescape-cli", "--", "simulate", "--seconds", "3"],
        )?,
    }

    Ok(())
}

/// Run `cargo` with `args`, failing if it exits unsuccessfully.
fn cargo(label: &str, args: &[&str]) -> Result<()> {
    println!("==> Running cargo {label}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {label} failed");
    }
    Ok(())
}

fn fmt() -> Result<()> {
    cargo("fmt --check", &["fmt", "--all", "--", "--check"])
}

fn clippy() -> Result<()> {
    cargo(
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )?;
    cargo(
        "clippy (wasm)",
        &["clippy", "-p", "wavescape-web", "--target", WASM_TARGET, "--", "-D", "warnings"],
    )
}

fn test() -> Result<()> {
    cargo("test", &["test", "--workspace"])
}

fn deny() -> Result<()> {
    cargo("deny check", &["deny", "check", "licenses", "bans", "sources"])
}

fn doc() -> Result<()> {
    cargo("doc", &["doc", "--workspace", "--no-deps"])
}

fn wasm() -> Result<()> {
    cargo(
        "build (wasm)",
        &["build", "-p", "wavescape-web", "--target", WASM_TARGET, "--release"],
    )
}
