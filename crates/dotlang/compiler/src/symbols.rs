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

//! Loaded symbol representations
//!
//! A [`PackageSymbol`] is what the rest of the compiler sees of a loaded module:
//! its identity and the symbols it exports.

use dotlang_common::ModuleIdentity;
use serde::{Deserialize, Serialize};

/// Kind of an exported symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Record,
    Object,
    ClientEndpoint,
    Type,
    Constant,
    Annotation,
}

/// A symbol exported by a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedSymbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Human readable signature, e.g. `function filter(any[] a) returns any[]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl ExportedSymbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            signature: None,
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }
}

/// The compiled symbol of one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSymbol {
    pub identity: ModuleIdentity,
    pub exports: Vec<ExportedSymbol>,
}

impl PackageSymbol {
    pub fn new(identity: ModuleIdentity, exports: Vec<ExportedSymbol>) -> Self {
        Self { identity, exports }
    }

    pub fn lookup(&self, name: &str) -> Option<&ExportedSymbol> {
        self.exports.iter().find(|symbol| symbol.name == name)
    }
}
