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

//! Index command for building the completion index

use crate::config::ToolsConfig;
use crate::repository::FileSystemRepository;
use anyhow::Context;
use clap::Args;
use dotlang_compiler::{PackageResolver, ResolverError};
use dotlang_langserver::{CompletionIndex, IndexPersistence};
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

/// Arguments for the index command
#[derive(Args, Debug, Default)]
pub struct IndexArgs {
    /// Index file to write, defaults to the configured index path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Index the default module of every package in the repository
pub fn build_index(repository: &FileSystemRepository) -> Result<CompletionIndex, ResolverError> {
    let index = CompletionIndex::new();
    for id in repository.package_ids()? {
        let package = repository.get_package(&id)?;
        match package.compilation().module(&id.default_module()) {
            Some(symbol) => index.insert_package(symbol),
            None => warn!("Package {} has no default module, not indexed", id),
        }
    }
    Ok(index)
}

/// Execute the index command, returning the number of indexed packages
pub fn run_index(args: &IndexArgs, config: &ToolsConfig, out: &mut dyn Write) -> anyhow::Result<usize> {
    let repository = FileSystemRepository::new(&config.repository);
    let index = build_index(&repository).with_context(|| format!("reading repository {}", config.repository.display()))?;

    let output = args.output.clone().unwrap_or_else(|| config.index_path.clone());
    index.save_to_disk(&output)?;

    writeln!(out, "Indexed {} package(s) into {}", index.len(), output.display())?;
    if config.compiler.is_debug() {
        for id in index.package_ids() {
            writeln!(out, "\t{}", id)?;
        }
    }
    Ok(index.len())
}
