use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use hostname_rulegen_r::{Generator, GeneratorConfig, Result};

/// Compile hostname blocklists into regex rules for a search-engine
/// host filter.
#[derive(Parser, Debug)]
#[command(name = "hostname-rulegen", version, about)]
struct Cli {
    /// Config file (YAML or JSON); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit one rule per category covering every domain
    #[arg(long)]
    single_regex: bool,

    /// Write rules into this directory instead of the configured one
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = GeneratorConfig::load_or_default(cli.config.as_deref())?;

    let mut generator = Generator::new(config).with_force_single_regex(cli.single_regex);
    if let Some(dir) = cli.output_dir {
        generator = generator.with_output_directory(dir);
    }

    generator.run()?;
    Ok(())
}
