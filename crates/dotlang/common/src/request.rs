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

//! Module load requests and resolver responses

use crate::identity::{ModuleIdentity, PackageId};
use semver::{Comparator, Op, VersionReq};
use std::fmt;

/// A request to load one module, created per dependency edge.
///
/// Unlike [`ModuleIdentity`] the version is a requirement: exact, a range, or `*`
/// for the latest available release.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleLoadRequest {
    pub org: String,
    pub package: String,
    pub module: String,
    pub version: VersionReq,
}

impl ModuleLoadRequest {
    pub fn new(org: impl Into<String>, package: impl Into<String>, module: impl Into<String>, version: VersionReq) -> Self {
        Self {
            org: org.into(),
            package: package.into(),
            module: module.into(),
            version,
        }
    }

    /// Request that only accepts exactly the identity's version
    pub fn exact(identity: &ModuleIdentity) -> Self {
        let version = identity.version();
        let comparator = Comparator {
            op: Op::Exact,
            major: version.major,
            minor: Some(version.minor),
            patch: Some(version.patch),
            pre: version.pre.clone(),
        };

        Self::new(
            identity.org(),
            identity.package(),
            identity.module(),
            VersionReq { comparators: vec![comparator] },
        )
    }

    /// Request for the newest available version of a module
    pub fn latest(org: impl Into<String>, package: impl Into<String>, module: impl Into<String>) -> Self {
        Self::new(org, package, module, VersionReq::STAR)
    }

    /// Check whether a concrete identity satisfies this request
    pub fn matches(&self, identity: &ModuleIdentity) -> bool {
        self.org == identity.org() && self.package == identity.package() && self.module == identity.module() && self.version.matches(identity.version())
    }
}

impl fmt::Display for ModuleLoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.module == self.package {
            write!(f, "{}/{}@{}", self.org, self.package, self.version)
        } else {
            write!(f, "{}/{}/{}@{}", self.org, self.package, self.module, self.version)
        }
    }
}

/// Resolver answer to a [`ModuleLoadRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLoadResponse {
    /// The concrete module that satisfied the request
    pub identity: ModuleIdentity,

    /// Handle of the package that owns the module
    pub package_id: PackageId,
}

impl ModuleLoadResponse {
    pub fn new(identity: ModuleIdentity) -> Self {
        let package_id = identity.package_id();
        Self { identity, package_id }
    }
}
