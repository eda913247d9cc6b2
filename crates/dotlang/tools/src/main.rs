// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! dotlang CLI Tool
//!
//! Main entry point for the dotlang command-line interface.

use clap::{ArgAction, Parser, Subcommand};
use dotlang_tools::ToolsConfig;
use dotlang_tools::cli::bootstrap::{BootstrapArgs, run_bootstrap};
use dotlang_tools::cli::index::{IndexArgs, run_index};
use dotlang_tools::cli::test::{TestArgs, run_tests};
use dotlang_tools::test_runner::ProcessLauncher;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dotlang")]
#[command(about = "dotlang - module resolution and tooling")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Package repository root
    #[arg(long, global = true, value_name = "DIR")]
    repository: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the lang-lib from the repository
    Bootstrap(BootstrapArgs),
    /// Build the completion index from the repository
    Index(IndexArgs),
    /// Run the tests of a built package
    Test(TestArgs),
}

/// `RUST_LOG` wins; otherwise the compiler verbosity picks the level
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ToolsConfig::resolve_config(cli.config, cli.repository)?;
    let verbosity = config.compiler.verbosity.saturating_add(cli.verbose);
    config.compiler = config.compiler.with_verbosity(verbosity);
    init_tracing(verbosity);

    let mut stdout = std::io::stdout();
    match cli.command {
        Commands::Bootstrap(args) => {
            run_bootstrap(&args, &config, &mut stdout)?;
        }
        Commands::Index(args) => {
            run_index(&args, &config, &mut stdout)?;
        }
        Commands::Test(args) => {
            run_tests(&args, &config, &ProcessLauncher, &mut stdout)?;
        }
    }

    Ok(())
}
