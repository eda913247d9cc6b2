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

//! Package resolver contract
//!
//! A resolver turns [`ModuleLoadRequest`]s into concrete module identities and
//! hands out the packages that own them. The compiler never talks to a
//! repository directly; the command-line tools provide a filesystem-backed
//! implementation and [`StaticPackageResolver`] serves packages held in memory.

use crate::error::ResolverError;
use crate::package::{ModuleArchive, Package, PackageOrigin};
use crate::symbols::{ExportedSymbol, SymbolKind};
use crate::types::{INT_RANGE_TYPE, RAW_TEMPLATE_TYPE};
use dotlang_common::{ModuleIdentity, ModuleLoadRequest, ModuleLoadResponse, PackageId, WellKnownModule};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Resolves load requests to packages
#[cfg_attr(test, mockall::automock)]
pub trait PackageResolver: Send + Sync {
    /// Resolve every request to the module that satisfies it
    fn load_packages(&self, requests: &[ModuleLoadRequest]) -> Result<Vec<ModuleLoadResponse>, ResolverError>;

    /// Fetch a package previously named in a response
    fn get_package(&self, package_id: &PackageId) -> Result<Arc<Package>, ResolverError>;
}

/// Resolver over an in-memory set of packages.
///
/// Requests are answered with the highest version that satisfies the version
/// requirement. Every request is recorded so callers can observe load traffic.
#[derive(Debug, Default)]
pub struct StaticPackageResolver {
    packages: BTreeMap<PackageId, Arc<Package>>,
    requests: Mutex<Vec<ModuleLoadRequest>>,
}

impl StaticPackageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver preloaded with every well-known lang-lib package
    pub fn with_lang_libs() -> Self {
        let mut resolver = Self::new();
        for module in WellKnownModule::ALL {
            resolver.add_package(lang_lib_package(module));
        }
        resolver
    }

    /// Add a package, replacing any package with the same id
    pub fn add_package(&mut self, package: Package) -> &mut Self {
        self.packages.insert(package.id().clone(), Arc::new(package));
        self
    }

    pub fn with_package(mut self, package: Package) -> Self {
        self.add_package(package);
        self
    }

    pub fn packages(&self) -> impl Iterator<Item = &Arc<Package>> {
        self.packages.values()
    }

    /// Number of requests answered so far
    pub fn load_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Every request seen so far, in arrival order
    pub fn requested(&self) -> Vec<ModuleLoadRequest> {
        self.requests.lock().clone()
    }

    fn resolve(&self, request: &ModuleLoadRequest) -> Option<ModuleLoadResponse> {
        self.packages
            .values()
            .filter(|package| package.has_module(&request.module))
            .map(|package| {
                let id = package.id();
                ModuleIdentity::new(&id.org, &id.name, &request.module, id.version.clone())
            })
            .filter(|identity| request.matches(identity))
            .max_by(|a, b| a.version().cmp(b.version()))
            .map(ModuleLoadResponse::new)
    }
}

impl PackageResolver for StaticPackageResolver {
    fn load_packages(&self, requests: &[ModuleLoadRequest]) -> Result<Vec<ModuleLoadResponse>, ResolverError> {
        self.requests.lock().extend(requests.iter().cloned());

        requests
            .iter()
            .map(|request| {
                let response = self.resolve(request).ok_or_else(|| ResolverError::not_found(request))?;
                debug!("Resolved {} to {}", request, response.identity);
                Ok(response)
            })
            .collect()
    }

    fn get_package(&self, package_id: &PackageId) -> Result<Arc<Package>, ResolverError> {
        self.packages.get(package_id).cloned().ok_or_else(|| ResolverError::PackageUnavailable(package_id.clone()))
    }
}

/// Exports of a lang-lib module as shipped with the toolchain
fn lang_lib_exports(module: WellKnownModule) -> Vec<ExportedSymbol> {
    use SymbolKind::*;

    let entries: &[(&str, SymbolKind)] = match module {
        WellKnownModule::Annotations => &[("tainted", Annotation), ("untainted", Annotation), ("deprecated", Annotation)],
        WellKnownModule::JavaInterop => &[("toHandle", Function), ("fromHandle", Function), ("Method", Annotation)],
        WellKnownModule::Internal => &[(INT_RANGE_TYPE, Object), ("createIntRange", Function), ("StreamImplementor", Type)],
        WellKnownModule::Array => &[("length", Function), ("push", Function), ("pop", Function), ("sort", Function)],
        WellKnownModule::Decimal => &[("abs", Function), ("round", Function), ("fromString", Function)],
        WellKnownModule::Error => &[("message", Function), ("cause", Function), ("stackTrace", Function), ("Cloneable", Type)],
        WellKnownModule::Float => &[("abs", Function), ("sqrt", Function), ("isNaN", Function), ("PI", Constant)],
        WellKnownModule::Future => &[("cancel", Function)],
        WellKnownModule::Int => &[("abs", Function), ("sum", Function), ("fromString", Function), ("MAX_VALUE", Constant)],
        WellKnownModule::Map => &[("get", Function), ("keys", Function), ("remove", Function), ("length", Function)],
        WellKnownModule::Object => &[(RAW_TEMPLATE_TYPE, Object), ("Iterable", Object)],
        WellKnownModule::Stream => &[("filter", Function), ("map", Function), ("next", Function), ("close", Function)],
        WellKnownModule::Table => &[("get", Function), ("put", Function), ("keys", Function), ("length", Function)],
        WellKnownModule::String => &[("length", Function), ("substring", Function), ("toUpperAscii", Function), ("Char", Type)],
        WellKnownModule::Typedesc => &[("TypeId", Record)],
        WellKnownModule::Value => &[("clone", Function), ("toJson", Function), ("fromJsonString", Function), ("Cloneable", Type)],
        WellKnownModule::Xml => &[("getName", Function), ("children", Function), ("Element", Type), ("Text", Type)],
        WellKnownModule::Boolean => &[("fromString", Function)],
        WellKnownModule::Query => &[("createPipeline", Function), ("Type", Type)],
        WellKnownModule::Transaction => &[("info", Function), ("onCommit", Function), ("Info", Record)],
    };

    entries.iter().map(|(name, kind)| ExportedSymbol::new(*name, *kind)).collect()
}

/// The precompiled package holding a lang-lib module
pub fn lang_lib_package(module: WellKnownModule) -> Package {
    let identity = module.identity();
    Package::new(identity.package_id(), PackageOrigin::Archive, vec![ModuleArchive::new(identity.module(), lang_lib_exports(module))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotlang_common::Version;

    fn http(version: Version) -> Package {
        Package::new(
            PackageId::new("acme", "http", version),
            PackageOrigin::Archive,
            vec![ModuleArchive::new("http", vec![]), ModuleArchive::new("http.client", vec![])],
        )
    }

    #[test]
    fn test_resolves_exact_lang_lib_request() {
        let resolver = StaticPackageResolver::with_lang_libs();
        let identity = WellKnownModule::Query.identity();

        let responses = resolver.load_packages(&[ModuleLoadRequest::exact(&identity)]).unwrap();
        assert_eq!(responses, vec![ModuleLoadResponse::new(identity)]);
        assert_eq!(resolver.load_count(), 1);
    }

    #[test]
    fn test_latest_picks_highest_version() {
        let resolver = StaticPackageResolver::new().with_package(http(Version::new(1, 2, 0))).with_package(http(Version::new(1, 10, 0)));

        let responses = resolver.load_packages(&[ModuleLoadRequest::latest("acme", "http", "http.client")]).unwrap();
        assert_eq!(responses[0].identity.version(), &Version::new(1, 10, 0));
        assert_eq!(responses[0].identity.module(), "http.client");
    }

    #[test]
    fn test_unknown_request_is_not_found() {
        let resolver = StaticPackageResolver::new().with_package(http(Version::new(1, 0, 0)));
        let request = ModuleLoadRequest::latest("acme", "http", "http.server");

        assert_eq!(resolver.load_packages(&[request.clone()]), Err(ResolverError::not_found(&request)));
        assert_eq!(resolver.requested(), vec![request]);
    }

    #[test]
    fn test_get_package_unavailable() {
        let resolver = StaticPackageResolver::new();
        let id = PackageId::new("acme", "http", Version::new(1, 0, 0));
        assert!(matches!(resolver.get_package(&id), Err(ResolverError::PackageUnavailable(missing)) if missing == id));
    }

    #[test]
    fn test_lang_lib_fixture_defines_derived_types() {
        let internal = lang_lib_package(WellKnownModule::Internal);
        let compilation = internal.compilation();
        assert!(compilation.diagnostics().is_empty());
        assert!(compilation.module(&WellKnownModule::Internal.identity()).unwrap().lookup(INT_RANGE_TYPE).is_some());
    }
}
