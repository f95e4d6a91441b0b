// Command-line entry point for service extraction.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use service_ast::api::server;
use service_ast::application::ExtractUsecase;
use service_ast::domain::options::UnrepresentablePolicy;
use service_ast::infrastructure::concurrency::build_pool;
use service_ast::infrastructure::config::AppConfig;
use service_ast::infrastructure::logging::init_logging;
use service_ast::infrastructure::{JsonExporter, JsonGraphLoader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Type graph JSON file(s) produced by the front end
    #[arg(required_unless_present = "serve")]
    inputs: Vec<PathBuf>,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name of the constructor function
    #[arg(long)]
    constructor: Option<String>,

    /// Fail on types that have no AST counterpart instead of emitting AnyLiteral
    #[arg(long)]
    strict_types: bool,

    /// Only expose exported (capitalized) methods
    #[arg(long)]
    exported_only: bool,

    /// Worker threads for batch extraction
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Log filter, e.g. "info" or "service_ast=debug"
    #[arg(long)]
    log: Option<String>,

    /// Run the extraction daemon on this port instead
    #[arg(long, conflicts_with = "inputs")]
    serve: Option<u16>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    // flags override the file
    if let Some(name) = cli.constructor {
        config.extract.constructor_name = name;
    }
    if cli.strict_types {
        config.extract.unrepresentable = UnrepresentablePolicy::Error;
    }
    if cli.exported_only {
        config.extract.exported_only = true;
    }
    if cli.jobs.is_some() {
        config.runtime.jobs = cli.jobs;
    }
    if cli.log.is_some() {
        config.runtime.log = cli.log;
    }

    init_logging(config.runtime.log.as_deref());

    if let Some(port) = cli.serve {
        server::start_server(port, config.extract)?;
        return Ok(true);
    }

    let usecase = ExtractUsecase {
        source: &JsonGraphLoader,
        exporter: &JsonExporter,
        options: &config.extract,
    };
    let output = cli.output.as_deref();

    match cli.inputs.as_slice() {
        [single] => usecase.run(single, output),
        inputs => {
            let pool = build_pool(config.runtime.jobs)?;
            usecase.run_batch(&pool, inputs, output)
        }
    }
}
