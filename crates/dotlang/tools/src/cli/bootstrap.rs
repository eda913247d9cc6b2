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

//! Bootstrap command for loading the lang-lib from a repository

use crate::config::ToolsConfig;
use crate::repository::FileSystemRepository;
use anyhow::Context;
use clap::Args;
use dotlang_common::WellKnownModule;
use dotlang_compiler::resolver::lang_lib_package;
use dotlang_compiler::{BootstrapMode, CompilerSession, ResolverError};
use std::io::Write;
use std::sync::Arc;
use tracing::info;

/// Arguments for the bootstrap command
#[derive(Args, Debug, Default)]
pub struct BootstrapArgs {
    /// Lang-lib module to bootstrap for, e.g. `query` or `lang.query`
    #[arg(long, value_name = "MODULE", required_unless_present = "all")]
    pub target: Option<WellKnownModule>,

    /// Load every well-known module
    #[arg(long, conflicts_with = "target")]
    pub all: bool,

    /// Publish the built-in lang-lib packages to the repository first
    #[arg(long)]
    pub seed: bool,
}

/// Publish every built-in lang-lib package, returning how many were written
pub fn seed_lang_libs(repository: &FileSystemRepository) -> Result<usize, ResolverError> {
    for module in WellKnownModule::ALL {
        repository.publish(&lang_lib_package(module).to_archive())?;
    }
    Ok(WellKnownModule::ALL.len())
}

/// Execute the bootstrap command, returning the lang-lib modules now loaded
pub fn run_bootstrap(args: &BootstrapArgs, config: &ToolsConfig, out: &mut dyn Write) -> anyhow::Result<Vec<WellKnownModule>> {
    let repository = Arc::new(FileSystemRepository::new(&config.repository));

    if args.seed {
        let published = seed_lang_libs(&repository).context("seeding the repository")?;
        writeln!(out, "Published {} lang-lib package(s) to {}", published, config.repository.display())?;
    }

    let mut compiler_config = config.compiler.clone();
    if args.all {
        compiler_config = compiler_config.with_bootstrap_mode(BootstrapMode::Full);
    }

    let mut session = CompilerSession::new(compiler_config, repository);
    session.prepare()?;
    if let Some(target) = args.target {
        session.load_lang_lib(&target.identity()).with_context(|| format!("bootstrapping {}", target))?;
    }

    let loaded = session.context().symbol_table().loaded_lang_modules();
    info!("Bootstrap finished with {} lang-lib module(s)", loaded.len());

    writeln!(out, "Loaded {} lang-lib module(s)", loaded.len())?;
    if config.compiler.is_verbose() {
        for module in &loaded {
            writeln!(out, "\t{}", module.identity())?;
        }
    }
    Ok(loaded)
}
