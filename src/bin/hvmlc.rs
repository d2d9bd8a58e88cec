//! Command-line front end: parse an HVML file and either serialise it back
//! out or run an XPath-subset query against it.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use hvml_rt::dom;
use hvml_rt::xpath;

#[derive(Parser, Debug)]
#[command(name = "hvmlc", version, about = "Parse, serialise, and query HVML documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a document and serialise it back out (round-trip check).
    Serialize {
        path: PathBuf,
    },
    /// Parse a document and run an XPath-subset query against it.
    Query {
        path: PathBuf,
        expr: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("hvmlc: {}", msg);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Serialize { path } => {
            let input = fs::read_to_string(&path).map_err(|e| e.to_string())?;
            let d = dom::parse_str(&input).map_err(|e| e.to_string())?;
            let out = dom::serialize(&d);
            io::stdout()
                .write_all(out.as_bytes())
                .map_err(|e| e.to_string())?;
            Ok(())
        }
        Command::Query { path, expr } => {
            let input = fs::read_to_string(&path).map_err(|e| e.to_string())?;
            let d = dom::parse_str(&input).map_err(|e| e.to_string())?;
            let nodes = xpath::select_from_root(&d, &expr).map_err(|e| e.to_string())?;
            for id in nodes {
                println!("{}", dom::string_value(&d, id));
            }
            Ok(())
        }
    }
}
