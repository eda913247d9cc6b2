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

//! Shared vocabulary for the dotlang toolchain
//!
//! Identities, load requests, diagnostics and the well-known lang-lib module set
//! used by the compiler, the language server and the command-line tools.

pub mod diagnostics;
pub mod identity;
pub mod request;
pub mod well_known;

pub use diagnostics::{Diagnostic, Diagnostics, Severity, SourceLocation};
pub use identity::{IdentityError, ModuleIdentity, PackageId};
pub use request::{ModuleLoadRequest, ModuleLoadResponse};
pub use well_known::{LANG_LIB_ORG, LANG_LIB_VERSION, WellKnownModule};

pub use semver::{Version, VersionReq};
