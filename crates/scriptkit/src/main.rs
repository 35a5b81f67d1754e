use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = scriptkit::cli::Cli::parse();
    scriptkit::init(cli.verbose);
    cli.run()
}
