use std::io;
use std::path::PathBuf;

use clap::Parser;
use recipe::{Result, RunOptions, parse_param, run};

#[derive(Parser)]
#[clap(name = "recipe")]
#[clap(version)]
#[clap(about = "Run a SQL query and a transform pipeline, writing the result as CSV")]
struct Arguments {
    /// Recipe file describing the query, parameters, steps and output.
    recipe: PathBuf,

    /// Path to the SQLite database to query.
    #[clap(short, long, env = "RECIPE_DATABASE")]
    database: PathBuf,

    /// Bind a query parameter, overriding the recipe. May be repeated.
    #[clap(short, long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,

    /// Write CSV to this path instead of the recipe's output path.
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Log verbosity.
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output logs in json format.
    #[clap(long)]
    log_json: bool,
}

fn main() {
    let args = Arguments::parse();
    let format = if args.log_json {
        logutil::LogFormat::Json
    } else {
        logutil::LogFormat::HumanReadable
    };
    logutil::configure_global_logger(
        logutil::verbosity_level(tracing::Level::WARN, args.verbose),
        format,
        io::stderr,
    );

    if let Err(err) = inner(args) {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}

fn inner(args: Arguments) -> Result<()> {
    let params = args
        .params
        .iter()
        .map(|p| parse_param(p))
        .collect::<Result<Vec<_>>>()?;

    let opts = RunOptions {
        database: args.database,
        recipe: args.recipe,
        params,
        output: args.output,
    };

    let stdout = io::stdout();
    run(&opts, stdout.lock())?;

    Ok(())
}
