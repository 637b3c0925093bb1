use clap::{Parser as ClapParser, Subcommand};
use std::io::{self, Read};
use sylva::cli::{self, CliError, RunOptions};

#[derive(ClapParser)]
#[command(name = "sylva")]
#[command(about = "Sylva - Path addressing, filtering, and transformation for nested records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a record path against the input
    Get {
        /// The dotted path to resolve
        path: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Keep only the records a filter expression matches
    Filter {
        /// The filter expression as a JSON array
        expression: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Rewrite each input record with a transform expression
    Transform {
        /// The transform expression as a JSON array
        expression: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Get {
            path,
            input,
            pretty,
        } => run(input, pretty, |options| cli::execute_get(&path, options)),
        Commands::Filter {
            expression,
            input,
            pretty,
        } => run(input, pretty, |options| {
            cli::execute_filter(&expression, options)
        }),
        Commands::Transform {
            expression,
            input,
            pretty,
        } => run(input, pretty, |options| {
            cli::execute_transform(&expression, options)
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(
    input: Option<String>,
    pretty: bool,
    execute: impl FnOnce(&RunOptions) -> Result<serde_json::Value, CliError>,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
            Some(buffer)
        }
        None => None,
    };

    let options = RunOptions { input, pretty };
    let output = execute(&options)?;

    let json = if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .unwrap();
    println!("{}", json);
    Ok(())
}
