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

//! Per-compilation state shared by the loader and the bootstrap sequencer

use crate::cache::PackageCache;
use crate::config::CompilerConfig;
use crate::symbol_table::SymbolTable;
use crate::types::DerivedTypes;

/// One compiler context: symbol table, package cache and derived types.
///
/// The context is exclusively borrowed for the duration of a load operation.
#[derive(Debug, Default)]
pub struct CompilerContext {
    config: CompilerConfig,
    symbol_table: SymbolTable,
    package_cache: PackageCache,
    types: DerivedTypes,
}

impl CompilerContext {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            symbol_table: SymbolTable::new(),
            package_cache: PackageCache::new(),
            types: DerivedTypes::new(),
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbol_table
    }

    pub fn symbol_table_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbol_table
    }

    pub fn package_cache(&self) -> &PackageCache {
        &self.package_cache
    }

    pub fn package_cache_mut(&mut self) -> &mut PackageCache {
        &mut self.package_cache
    }

    pub fn types(&self) -> &DerivedTypes {
        &self.types
    }

    pub fn reload_error_and_dependent_types(&mut self) {
        self.types.reload_error_and_dependent_types(&self.symbol_table);
    }

    pub fn reload_int_range_type(&mut self) {
        self.types.reload_int_range_type(&self.symbol_table);
    }

    pub fn load_raw_template_type(&mut self) {
        self.types.load_raw_template_type(&self.symbol_table);
    }
}
