use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use log::info;

use engagor::dispatch::{Dispatcher, Outcome};
use engagor::help::commands_help;

#[derive(Parser, Debug)]
#[command(name = "engagor", about = "A fancy script runner")]
struct Cli {
    /// Path to config file (auto-detected if not specified)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scripts root directory (overrides the config file)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Log file path (log lines are mirrored to this file)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log progress and timing information
    #[arg(short, long)]
    verbose: bool,

    /// Group to list, optionally followed by a script to run
    #[arg(value_name = "GROUP [SCRIPT]")]
    args: Vec<String>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .as_ref()
        .map(std::fs::File::create)
        .transpose()?;
    engagor::logger::init(log_file, cli.verbose);

    let (settings, registry) = engagor::load(cli.config.as_deref(), cli.root.as_deref())?;

    if cli.args.is_empty() {
        let help = format!(
            "{}\nRun 'engagor COMMAND' to list the scripts of a command.",
            commands_help(&registry)
        );
        Cli::command().after_help(help).print_help()?;
        return Ok(ExitCode::FAILURE);
    }

    let start = Instant::now();
    let outcome = Dispatcher::new(&registry)
        .with_name_width(settings.name_width)
        .dispatch(cli.args.as_slice())?;
    match outcome {
        Outcome::Help(text) => println!("{text}"),
        Outcome::Output(stdout) => print!("{stdout}"),
    }

    info!("Took {:.3}s", start.elapsed().as_secs_f64());
    Ok(ExitCode::SUCCESS)
}
