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

//! dotlang compiler front end
//!
//! Loads modules into a compiler context: the lang-lib bootstrap sequence, the
//! generic module loader over a pluggable package resolver, the symbol table and
//! package cache, and planning of a package's declared dependencies.

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod context;
pub mod dependencies;
pub mod error;
pub mod loader;
pub mod package;
pub mod resolver;
pub mod session;
pub mod symbol_table;
pub mod symbols;
pub mod types;

pub use bootstrap::{Bootstrap, BootstrapState};
pub use config::{BootstrapMode, CompilerConfig};
pub use context::CompilerContext;
pub use error::{BootstrapError, DependencyError, ResolverError};
pub use loader::ModuleLoader;
pub use package::{Package, PackageArchive};
pub use resolver::{PackageResolver, StaticPackageResolver};
pub use session::{CompilerSession, LoadReport};
pub use symbols::{ExportedSymbol, PackageSymbol, SymbolKind};
