//! Command line interface.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::app::collect::{CollectOptions, CollectReport, Collector};
use crate::app::submodule::{SubmoduleOutcome, SubmoduleRegistrar};
use crate::domain::model::{CollectionRequest, SubmoduleRequest};
use crate::infra::clipboard::copy_to_clipboard;
use crate::infra::config::Config;

#[derive(Debug, Parser)]
#[command(name = "scriptkit", author, version, about = "Project automation scripts", long_about = None)]
pub struct Cli {
    /// Project root; defaults to the enclosing git work tree.
    #[arg(long, global = true, env = "SCRIPTKIT_ROOT")]
    pub root: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Collect files into a prompt template and write the result
    Collect(CollectArgs),
    /// Manage git submodules
    Submodule {
        #[command(subcommand)]
        command: SubmoduleCommand,
    },
    /// List collection jobs defined in config
    Jobs,
    /// Print shell completions
    Completions { shell: Shell },
}

#[derive(Debug, Subcommand)]
pub enum SubmoduleCommand {
    /// Register a repository as a submodule; with one argument, a `[submodules.<name>]` entry
    Add {
        url_or_name: String,
        path: Option<PathBuf>,
    },
    /// List submodules recorded in .gitmodules
    List,
}

#[derive(Debug, Clone, Default, Args)]
pub struct CollectArgs {
    /// Named job from `[jobs.<name>]`
    pub job: Option<String>,
    /// Directory to scan recursively (repeatable)
    #[arg(short = 'd', long = "dir")]
    pub directories: Vec<PathBuf>,
    /// Glob a file must match (repeatable; none matches everything)
    #[arg(short = 'i', long = "include")]
    pub includes: Vec<String>,
    /// Glob excluding files (repeatable)
    #[arg(short = 'e', long = "exclude")]
    pub excludes: Vec<String>,
    /// File to include regardless of patterns (repeatable)
    #[arg(short = 'f', long = "file")]
    pub files: Vec<PathBuf>,
    /// Template file
    #[arg(short = 't', long)]
    pub template: Option<PathBuf>,
    /// Template variable as KEY=VALUE (repeatable)
    #[arg(long = "var", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,
    /// Output file
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
    /// Create the output directory if it is missing
    #[arg(long)]
    pub mkdir: bool,
    /// Also copy the rendered prompt to the clipboard
    #[arg(long)]
    pub copy: bool,
    /// Render without writing the output file
    #[arg(long)]
    pub dry_run: bool,
    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

impl CollectArgs {
    /// Merge the flags over an optional configured job.
    pub fn into_request(self, base: Option<CollectionRequest>) -> Result<CollectionRequest> {
        let mut request = base.unwrap_or_default();
        request.directories.extend(self.directories);
        request.includes.extend(self.includes);
        request.excludes.extend(self.excludes);
        request.files.extend(self.files);
        if let Some(template) = self.template {
            request.template_path = template;
        }
        if let Some(output) = self.output {
            request.output_path = output;
        }
        for (key, value) in self.vars {
            request
                .template_vars
                .insert(key, serde_json::Value::String(value));
        }

        if request.template_path.as_os_str().is_empty() {
            bail!("no template given; pass --template or name a job");
        }
        if request.output_path.as_os_str().is_empty() {
            bail!("no output given; pass --output or name a job");
        }
        Ok(request)
    }
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        if let Commands::Completions { shell } = self.command {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "scriptkit", &mut io::stdout());
            return Ok(());
        }

        let root = crate::project_root(self.root.as_deref())?;
        let config = Config::load(&root)?;
        tracing::debug!(root = %root.display(), "resolved project root");

        match self.command {
            Commands::Collect(args) => run_collect(root, &config, args),
            Commands::Submodule { command } => run_submodule(root, &config, command),
            Commands::Jobs => {
                for (name, job) in &config.jobs {
                    println!(
                        "{name}\t{} -> {}",
                        job.template_path.display(),
                        job.output_path.display()
                    );
                }
                Ok(())
            }
            Commands::Completions { .. } => Ok(()),
        }
    }
}

fn run_collect(root: PathBuf, config: &Config, args: CollectArgs) -> Result<()> {
    let base = match &args.job {
        Some(name) => Some(
            config
                .job(name)
                .cloned()
                .with_context(|| format!("no job named '{name}' in config"))?,
        ),
        None => None,
    };

    let mut options = CollectOptions::from_settings(&config.collect);
    options.create_output_dir |= args.mkdir;
    options.dry_run = args.dry_run;
    let (copy, json) = (args.copy, args.json);

    let request = args.into_request(base)?;
    let report = Collector::new(root, options).run(&request)?;

    if copy {
        let backend = copy_to_clipboard(&report.rendered)?;
        tracing::info!(%backend, "copied prompt to clipboard");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &CollectReport) {
    if report.dry_run {
        for file in &report.files {
            println!("{file}");
        }
        println!(
            "{} files, {} bytes, ~{} tokens (dry run, nothing written)",
            report.files.len(),
            report.bytes,
            report.tokens
        );
        return;
    }

    let state = if report.changed { "wrote" } else { "unchanged" };
    println!(
        "{state} {} ({} files, {} bytes, ~{} tokens)",
        report.output_path.display(),
        report.files.len(),
        report.bytes,
        report.tokens
    );
}

fn run_submodule(root: PathBuf, config: &Config, command: SubmoduleCommand) -> Result<()> {
    // Submodule paths are relative to the work tree, which may sit above the project root.
    let registrar = SubmoduleRegistrar::discover(&root)?;
    match command {
        SubmoduleCommand::Add { url_or_name, path } => {
            let request = match path {
                Some(path) => SubmoduleRequest::new(url_or_name, path),
                None => config
                    .submodule(&url_or_name)
                    .cloned()
                    .with_context(|| format!("no submodule named '{url_or_name}' in config"))?,
            };
            match registrar.add(&request)? {
                SubmoduleOutcome::Added => {
                    println!("added {} at {}", request.url, request.path.display())
                }
                SubmoduleOutcome::AlreadyRegistered => println!(
                    "{} already registered at {}",
                    request.url,
                    request.path.display()
                ),
            }
        }
        SubmoduleCommand::List => {
            for entry in registrar.list()? {
                println!("{}\t{}", entry.path, entry.url);
            }
        }
    }
    Ok(())
}
