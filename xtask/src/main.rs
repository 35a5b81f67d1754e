use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(author, version, about = "Project automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run cargo nextest with default configuration
    Nextest {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        release: bool,
    },
    /// Check formatting and run clippy with warnings denied
    Lint,
    /// Review pending insta snapshots
    Snapshots,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Nextest { profile, release } => run_nextest(profile, release),
        Commands::Lint => {
            cargo(&["fmt", "--all", "--check"])?;
            cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])
        }
        Commands::Snapshots => cargo(&["insta", "review"]),
    }
}

fn run_nextest(profile: Option<String>, release: bool) -> Result<()> {
    let mut args = vec!["nextest".to_owned(), "run".to_owned()];
    if let Some(profile) = profile {
        args.push("--profile".into());
        args.push(profile);
    }
    if release {
        args.push("--release".into());
    }
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    cargo(&args)
}

fn cargo(args: &[&str]) -> Result<()> {
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        bail!("cargo {} failed", args.join(" "));
    }
    Ok(())
}
