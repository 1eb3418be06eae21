//! Export a backend service's OpenAPI document and its tag-filtered subset.
//!
//! ```text
//! api-docs product --out-dir docs/
//! ```
//!
//! Exits non-zero on an unknown service, a failed or non-200 fetch, or a
//! body that is not JSON.

use cart_kit::api_docs::{self, SERVICES};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "api-docs", about = "Fetch and tag-filter a service's OpenAPI document")]
struct Args {
    /// Service name (see --list)
    #[arg(required_unless_present = "list")]
    service: Option<String>,

    /// Directory the two JSON files are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Print the known services and exit
    #[arg(long)]
    list: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list {
        for s in SERVICES {
            println!("{:<12} port {:<5} tag {}", s.name, s.port, s.tag);
        }
        return ExitCode::SUCCESS;
    }

    let Some(service) = args.service else {
        return ExitCode::FAILURE;
    };

    match api_docs::export(&service, &args.out_dir) {
        Ok(paths) => {
            println!("{}", paths.full.display());
            println!("{}", paths.filtered.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("✗ {}: {}", service, e);
            ExitCode::FAILURE
        }
    }
}
