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

//! Module and package identities
//!
//! A [`ModuleIdentity`] names one loadable unit: the org that publishes it, the
//! package it belongs to, the module inside that package and the package version.
//! Identities are immutable and are used as map keys by every cache in the toolchain.

use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing textual identities
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Missing {0} in module identity")]
    MissingComponent(&'static str),

    #[error("Malformed module identity: {0}")]
    Malformed(String),

    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },
}

/// Identity of a package: org, name and version
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageId {
    pub org: String,
    pub name: String,
    pub version: Version,
}

impl PackageId {
    pub fn new(org: impl Into<String>, name: impl Into<String>, version: Version) -> Self {
        Self {
            org: org.into(),
            name: name.into(),
            version,
        }
    }

    /// Identity of the package's default module
    pub fn default_module(&self) -> ModuleIdentity {
        ModuleIdentity::new(&self.org, &self.name, &self.name, self.version.clone())
    }

    /// Import path as written in source, e.g. `dotlang/lang.query`
    pub fn import_path(&self) -> String {
        format!("{}/{}", self.org, self.name)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.org, self.name, self.version)
    }
}

/// Identity of a single module within a package.
///
/// Ordering compares org, package and module name, then versions by semantic
/// version precedence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleIdentity {
    org: String,
    package: String,
    module: String,
    version: Version,
}

impl ModuleIdentity {
    pub fn new(org: impl Into<String>, package: impl Into<String>, module: impl Into<String>, version: Version) -> Self {
        Self {
            org: org.into(),
            package: package.into(),
            module: module.into(),
            version,
        }
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// True when this is the package's default module (module name equals package name)
    pub fn is_default_module(&self) -> bool {
        self.module == self.package
    }

    /// Identity of the owning package
    pub fn package_id(&self) -> PackageId {
        PackageId::new(&self.org, &self.package, self.version.clone())
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default_module() {
            write!(f, "{}/{}:{}", self.org, self.package, self.version)
        } else {
            write!(f, "{}/{}/{}:{}", self.org, self.package, self.module, self.version)
        }
    }
}

/// Parses `org/package:version` or `org/package/module:version`
impl FromStr for ModuleIdentity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, version) = s.rsplit_once(':').ok_or(IdentityError::MissingComponent("version"))?;
        let version = Version::parse(version).map_err(|e| IdentityError::InvalidVersion {
            version: version.to_string(),
            reason: e.to_string(),
        })?;

        let mut parts = path.split('/');
        let org = parts.next().filter(|p| !p.is_empty()).ok_or(IdentityError::MissingComponent("org"))?;
        let package = parts.next().filter(|p| !p.is_empty()).ok_or(IdentityError::MissingComponent("package"))?;
        let module = match parts.next() {
            Some(module) if !module.is_empty() => module,
            Some(_) => return Err(IdentityError::MissingComponent("module")),
            None => package,
        };
        if parts.next().is_some() {
            return Err(IdentityError::Malformed(s.to_string()));
        }

        Ok(Self::new(org, package, module, version))
    }
}
