// --- Generador de Horarios - Binario de línea de comandos ---
//
// quickslot generate --catalog oferta.json --request peticion.json
// quickslot generate --catalog oferta.json --select CIT1000 --select "Cálculo II"
// quickslot check    --catalog oferta.json --pick CIT1000:1 --pick MAT2000:3
//
// La salida es JSON por stdout; los logs van a stderr (RUST_LOG controla el nivel).
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use quickslot::api_json::{self, GenerateRequest, RequestOptions};
use quickslot::{config, load_catalog, Result};

#[derive(Parser, Debug)]
#[clap(name = "quickslot")]
#[clap(about = "Generate clash-free weekly class schedules from a course catalog")]
struct Args {
    /// Pretty-print the JSON output
    #[clap(long, global = true)]
    pretty: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search, score and rank schedules for a selection of subjects
    Generate {
        /// Catalog JSON file
        #[clap(long, value_name = "FILE", env = "QUICKSLOT_CATALOG")]
        catalog: PathBuf,

        /// Request JSON file (`{"selected": [...], "options": {...}}`)
        #[clap(long, value_name = "FILE", conflicts_with = "select")]
        request: Option<PathBuf>,

        /// Subject code or name; may be repeated
        #[clap(long = "select", value_name = "SUBJECT")]
        select: Vec<String>,

        /// Worker threads (0 = one per CPU)
        #[clap(long)]
        workers: Option<usize>,
    },
    /// Report clashes in a hand-picked set of groups
    Check {
        /// Catalog JSON file
        #[clap(long, value_name = "FILE", env = "QUICKSLOT_CATALOG")]
        catalog: PathBuf,

        /// CODE:GROUP pair; may be repeated
        #[clap(long = "pick", value_name = "CODE:GROUP", required = true)]
        picks: Vec<String>,
    },
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

fn run(args: Args) -> Result<()> {
    let base = config::options_from_env()?;
    match args.command {
        Command::Generate { catalog, request, select, workers } => {
            let catalog = load_catalog(&catalog)?;
            let request_json = match request {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let req = GenerateRequest { selected: select, options: RequestOptions::default() };
                    serde_json::to_string(&req)?
                }
            };
            // --workers pisa el entorno; la petición puede volver a pisarlo
            let mut base = base;
            if let Some(w) = workers {
                base.workers = w;
            }
            let response = api_json::handle_request(&catalog, &request_json, base)?;
            info!(schedules = response.schedules_count, partial = response.partial, "done");
            println!("{}", to_json(&response, args.pretty)?);
        }
        Command::Check { catalog, picks } => {
            let catalog = load_catalog(&catalog)?;
            let report = api_json::check_picks(&catalog, &picks)?;
            if !report.ok {
                info!(conflicts = report.conflicts.len(), "hand-picked schedule has clashes");
            }
            println!("{}", to_json(&report, args.pretty)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
