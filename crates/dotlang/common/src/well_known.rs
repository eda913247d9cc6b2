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

//! The closed set of lang-lib modules the language runtime depends on
//!
//! These modules are known when the toolchain is built. They are never discovered
//! dynamically; the compiler binds each one to a dedicated symbol-table slot.

use crate::identity::ModuleIdentity;
use semver::Version;
use std::fmt;
use std::str::FromStr;

/// Org that publishes every lang-lib module
pub const LANG_LIB_ORG: &str = "dotlang";

/// Version every lang-lib module is published under
pub const LANG_LIB_VERSION: Version = Version::new(0, 0, 0);

/// Lang-lib modules with a dedicated symbol-table slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WellKnownModule {
    Annotations,
    JavaInterop,
    Internal,
    Array,
    Decimal,
    Error,
    Float,
    Future,
    Int,
    Map,
    Object,
    Stream,
    Table,
    String,
    Typedesc,
    Value,
    Xml,
    Boolean,
    Query,
    Transaction,
}

impl WellKnownModule {
    /// Every well-known module
    pub const ALL: [WellKnownModule; 20] = [
        WellKnownModule::Annotations,
        WellKnownModule::JavaInterop,
        WellKnownModule::Internal,
        WellKnownModule::Array,
        WellKnownModule::Decimal,
        WellKnownModule::Error,
        WellKnownModule::Float,
        WellKnownModule::Future,
        WellKnownModule::Int,
        WellKnownModule::Map,
        WellKnownModule::Object,
        WellKnownModule::Stream,
        WellKnownModule::Table,
        WellKnownModule::String,
        WellKnownModule::Typedesc,
        WellKnownModule::Value,
        WellKnownModule::Xml,
        WellKnownModule::Boolean,
        WellKnownModule::Query,
        WellKnownModule::Transaction,
    ];

    /// Package name the module is published under
    pub fn package_name(self) -> &'static str {
        match self {
            WellKnownModule::Annotations => "lang.annotations",
            WellKnownModule::JavaInterop => "interop.java",
            WellKnownModule::Internal => "lang.__internal",
            WellKnownModule::Array => "lang.array",
            WellKnownModule::Decimal => "lang.decimal",
            WellKnownModule::Error => "lang.error",
            WellKnownModule::Float => "lang.float",
            WellKnownModule::Future => "lang.future",
            WellKnownModule::Int => "lang.int",
            WellKnownModule::Map => "lang.map",
            WellKnownModule::Object => "lang.object",
            WellKnownModule::Stream => "lang.stream",
            WellKnownModule::Table => "lang.table",
            WellKnownModule::String => "lang.string",
            WellKnownModule::Typedesc => "lang.typedesc",
            WellKnownModule::Value => "lang.value",
            WellKnownModule::Xml => "lang.xml",
            WellKnownModule::Boolean => "lang.boolean",
            WellKnownModule::Query => "lang.query",
            WellKnownModule::Transaction => "lang.transaction",
        }
    }

    /// Short name, the part after the last `.`
    pub fn short_name(self) -> &'static str {
        let name = self.package_name();
        name.rsplit('.').next().unwrap_or(name)
    }

    /// Modules that source code can reference through their short name without an import
    pub fn is_predeclared(self) -> bool {
        matches!(
            self,
            WellKnownModule::Boolean
                | WellKnownModule::Decimal
                | WellKnownModule::Error
                | WellKnownModule::Float
                | WellKnownModule::Future
                | WellKnownModule::Int
                | WellKnownModule::Map
                | WellKnownModule::Object
                | WellKnownModule::Stream
                | WellKnownModule::String
                | WellKnownModule::Table
                | WellKnownModule::Transaction
                | WellKnownModule::Typedesc
                | WellKnownModule::Xml
        )
    }

    pub fn identity(self) -> ModuleIdentity {
        let name = self.package_name();
        ModuleIdentity::new(LANG_LIB_ORG, name, name, LANG_LIB_VERSION)
    }

    /// Reverse lookup from an identity; only exact lang-lib identities match
    pub fn from_identity(identity: &ModuleIdentity) -> Option<Self> {
        if identity.org() != LANG_LIB_ORG || *identity.version() != LANG_LIB_VERSION || !identity.is_default_module() {
            return None;
        }
        Self::ALL.into_iter().find(|module| module.package_name() == identity.package())
    }
}

impl fmt::Display for WellKnownModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.package_name())
    }
}

/// Accepts either the package name (`lang.query`) or the short name (`query`)
impl FromStr for WellKnownModule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|module| module.package_name() == s || module.short_name() == s)
            .ok_or_else(|| format!("Unknown lang-lib module: {s}"))
    }
}
