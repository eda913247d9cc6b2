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

//! Packages and their compilations
//!
//! A [`Package`] is what a resolver hands back: the decoded archive of every module
//! in the package. Compiling it turns each module archive into a [`PackageSymbol`]
//! and collects diagnostics. Compilation happens at most once per package.

use crate::symbols::{ExportedSymbol, PackageSymbol};
use dotlang_common::{Diagnostic, Diagnostics, ModuleIdentity, PackageId, Version};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Where a package's modules come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageOrigin {
    /// Compiled from source in this session; the cache keeps the full compiled module
    Source,
    /// Read from a precompiled archive; the cache keeps only the symbol
    #[default]
    Archive,
}

/// Decoded symbol representation of one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleArchive {
    pub name: String,
    #[serde(default)]
    pub exports: Vec<ExportedSymbol>,
    /// Diagnostics recorded when the archive was produced
    #[serde(default)]
    pub diagnostics: Diagnostics,
}

impl ModuleArchive {
    pub fn new(name: impl Into<String>, exports: Vec<ExportedSymbol>) -> Self {
        Self {
            name: name.into(),
            exports,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }
}

/// On-disk form of a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageArchive {
    pub org: String,
    pub name: String,
    pub version: Version,
    #[serde(default)]
    pub origin: PackageOrigin,
    pub modules: Vec<ModuleArchive>,
}

/// Result of compiling a package
#[derive(Debug, Clone)]
pub struct PackageCompilation {
    package_id: PackageId,
    origin: PackageOrigin,
    modules: Vec<Arc<PackageSymbol>>,
    diagnostics: Diagnostics,
}

impl PackageCompilation {
    fn compile(package: &Package) -> Self {
        let mut diagnostics = Diagnostics::new();
        let mut modules = Vec::with_capacity(package.modules.len());

        for archive in &package.modules {
            diagnostics.extend(archive.diagnostics.iter().cloned());

            let mut seen = HashSet::new();
            for export in &archive.exports {
                if !seen.insert(export.name.as_str()) {
                    diagnostics.push(Diagnostic::error(format!("redeclared symbol '{}' in module '{}'", export.name, archive.name)));
                }
            }

            let identity = ModuleIdentity::new(&package.id.org, &package.id.name, &archive.name, package.id.version.clone());
            modules.push(Arc::new(PackageSymbol::new(identity, archive.exports.clone())));
        }

        if !package.modules.iter().any(|m| m.name == package.id.name) {
            diagnostics.push(Diagnostic::error(format!("package '{}' has no default module", package.id)));
        }

        Self {
            package_id: package.id.clone(),
            origin: package.origin,
            modules,
            diagnostics,
        }
    }

    pub fn package_id(&self) -> &PackageId {
        &self.package_id
    }

    pub fn origin(&self) -> PackageOrigin {
        self.origin
    }

    pub fn modules(&self) -> &[Arc<PackageSymbol>] {
        &self.modules
    }

    pub fn module(&self, identity: &ModuleIdentity) -> Option<&Arc<PackageSymbol>> {
        self.modules.iter().find(|symbol| &symbol.identity == identity)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

/// A resolved package ready to be compiled
#[derive(Debug)]
pub struct Package {
    id: PackageId,
    origin: PackageOrigin,
    modules: Vec<ModuleArchive>,
    compilation: OnceCell<PackageCompilation>,
}

impl Package {
    pub fn new(id: PackageId, origin: PackageOrigin, modules: Vec<ModuleArchive>) -> Self {
        Self {
            id,
            origin,
            modules,
            compilation: OnceCell::new(),
        }
    }

    pub fn from_archive(archive: PackageArchive) -> Self {
        Self::new(PackageId::new(archive.org, archive.name, archive.version), archive.origin, archive.modules)
    }

    /// On-disk form of the package
    pub fn to_archive(&self) -> PackageArchive {
        PackageArchive {
            org: self.id.org.clone(),
            name: self.id.name.clone(),
            version: self.id.version.clone(),
            origin: self.origin,
            modules: self.modules.clone(),
        }
    }

    pub fn id(&self) -> &PackageId {
        &self.id
    }

    pub fn origin(&self) -> PackageOrigin {
        self.origin
    }

    pub fn modules(&self) -> &[ModuleArchive] {
        &self.modules
    }

    /// Check if the package contains a module with the given name
    pub fn has_module(&self, name: &str) -> bool {
        self.modules.iter().any(|m| m.name == name)
    }

    /// Compile the package, or return the compilation from an earlier call
    pub fn compilation(&self) -> &PackageCompilation {
        self.compilation.get_or_init(|| PackageCompilation::compile(self))
    }

    pub fn is_compiled(&self) -> bool {
        self.compilation.get().is_some()
    }
}
