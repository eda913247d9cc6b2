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

//! Error types for module resolution and bootstrapping

use dotlang_common::{Diagnostics, ModuleIdentity, ModuleLoadRequest, PackageId};
use thiserror::Error;

/// Errors reported by a [`crate::resolver::PackageResolver`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolverError {
    #[error("No package satisfies request {0}")]
    NotFound(String),

    #[error("Package {0} is not available")]
    PackageUnavailable(PackageId),

    #[error("Failed to read package {package}: {details}")]
    Io { package: String, details: String },

    #[error("Corrupt package archive {package}: {details}")]
    CorruptArchive { package: String, details: String },
}

impl ResolverError {
    /// Create a not-found error for a request
    pub fn not_found(request: &ModuleLoadRequest) -> Self {
        Self::NotFound(request.to_string())
    }

    /// Create an I/O error with context
    pub fn io(package: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Io {
            package: package.into(),
            details: details.into(),
        }
    }

    /// Create a corrupt archive error
    pub fn corrupt_archive(package: impl Into<String>, details: impl Into<String>) -> Self {
        Self::CorruptArchive {
            package: package.into(),
            details: details.into(),
        }
    }
}

/// Errors in the declared dependency graph of a package
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DependencyError {
    #[error("Circular dependency detected involving {0}")]
    Cycle(String),

    #[error("Module {0} imports itself")]
    SelfImport(String),

    #[error("Dependency depth limit {limit} exceeded at {module}")]
    DepthExceeded { module: String, limit: usize },
}

/// Fatal errors while loading modules into a compiler context.
///
/// Bootstrap failures are never recovered from: the symbol table must not be used
/// after one of these is returned.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Error while bootstrapping {identity}: diagnostics {diagnostics}")]
    ModuleDiagnostics { identity: ModuleIdentity, diagnostics: Diagnostics },

    #[error("Resolver returned no package for {0}")]
    Unresolved(ModuleLoadRequest),

    #[error("Module {0} was loaded but no symbol was found in the package cache")]
    SymbolNotFound(ModuleIdentity),

    #[error("Package resolution failed: {0}")]
    Resolver(#[from] ResolverError),

    #[error("Dependency planning failed: {0}")]
    Dependency(#[from] DependencyError),
}

impl BootstrapError {
    /// Create a diagnostics error for a module
    pub fn module_diagnostics(identity: ModuleIdentity, diagnostics: Diagnostics) -> Self {
        Self::ModuleDiagnostics { identity, diagnostics }
    }

    /// Identity of the module that failed, when known
    pub fn failed_module(&self) -> Option<&ModuleIdentity> {
        match self {
            BootstrapError::ModuleDiagnostics { identity, .. } | BootstrapError::SymbolNotFound(identity) => Some(identity),
            _ => None,
        }
    }
}
