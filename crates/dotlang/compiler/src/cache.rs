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

//! Compiled-package cache
//!
//! Holds the result of every package compiled in a context. Modules compiled from
//! source are kept as full [`CompiledModule`] entries; modules read from archives
//! are only registered by symbol. Symbol lookups walk an ordered chain of
//! [`SymbolLookup`] strategies so that either form is found.

use crate::package::{PackageCompilation, PackageOrigin};
use crate::symbols::PackageSymbol;
use dotlang_common::{Diagnostics, ModuleIdentity};
use std::collections::HashMap;
use std::sync::Arc;

/// A module compiled in this context
#[derive(Debug, Clone)]
pub struct CompiledModule {
    pub symbol: Arc<PackageSymbol>,
    pub diagnostics: Diagnostics,
}

/// Per-context cache of compiled packages keyed by module identity
#[derive(Debug, Default)]
pub struct PackageCache {
    modules: HashMap<ModuleIdentity, CompiledModule>,
    symbols: HashMap<ModuleIdentity, Arc<PackageSymbol>>,
}

impl PackageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Structural lookup of a module compiled from source
    pub fn get(&self, identity: &ModuleIdentity) -> Option<&CompiledModule> {
        self.modules.get(identity)
    }

    /// Lookup in the symbol-only registry
    pub fn symbol(&self, identity: &ModuleIdentity) -> Option<Arc<PackageSymbol>> {
        self.symbols.get(identity).cloned()
    }

    pub fn contains(&self, identity: &ModuleIdentity) -> bool {
        self.modules.contains_key(identity) || self.symbols.contains_key(identity)
    }

    /// Insert a compiled module; an existing entry is kept. Returns true if inserted.
    pub fn put(&mut self, module: CompiledModule) -> bool {
        if self.modules.contains_key(&module.symbol.identity) {
            return false;
        }
        self.modules.insert(module.symbol.identity.clone(), module);
        true
    }

    /// Register a symbol-only entry; an existing entry is kept. Returns true if inserted.
    pub fn put_symbol(&mut self, symbol: Arc<PackageSymbol>) -> bool {
        if self.symbols.contains_key(&symbol.identity) {
            return false;
        }
        self.symbols.insert(symbol.identity.clone(), symbol);
        true
    }

    /// Register every module of a compilation according to its origin.
    ///
    /// Returns the number of modules that were not cached before.
    pub fn register(&mut self, compilation: &PackageCompilation) -> usize {
        let mut registered = 0;
        for symbol in compilation.modules() {
            let inserted = match compilation.origin() {
                PackageOrigin::Source => self.put(CompiledModule {
                    symbol: symbol.clone(),
                    diagnostics: compilation.diagnostics().clone(),
                }),
                PackageOrigin::Archive => self.put_symbol(symbol.clone()),
            };
            if inserted {
                registered += 1;
            }
        }
        registered
    }

    pub fn len(&self) -> usize {
        self.modules.len() + self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.symbols.is_empty()
    }
}

/// One way of finding a module's symbol in the [`PackageCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolLookup {
    /// The symbol of a structurally cached compiled module
    CompiledModule,
    /// The symbol-only registry
    SymbolRegistry,
}

impl SymbolLookup {
    /// Structural lookup first, then the symbol registry
    pub const DEFAULT_CHAIN: [SymbolLookup; 2] = [SymbolLookup::CompiledModule, SymbolLookup::SymbolRegistry];

    pub fn find(self, cache: &PackageCache, identity: &ModuleIdentity) -> Option<Arc<PackageSymbol>> {
        match self {
            SymbolLookup::CompiledModule => cache.get(identity).map(|module| module.symbol.clone()),
            SymbolLookup::SymbolRegistry => cache.symbol(identity),
        }
    }
}

/// Try each strategy in order; the first one that finds the symbol wins
pub fn lookup_symbol(cache: &PackageCache, identity: &ModuleIdentity, chain: &[SymbolLookup]) -> Option<Arc<PackageSymbol>> {
    chain.iter().find_map(|strategy| strategy.find(cache, identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{ModuleArchive, Package};
    use dotlang_common::{PackageId, Version};

    fn identity(module: &str) -> ModuleIdentity {
        ModuleIdentity::new("acme", "http", module, Version::new(1, 0, 0))
    }

    fn package(origin: PackageOrigin) -> Package {
        Package::new(
            PackageId::new("acme", "http", Version::new(1, 0, 0)),
            origin,
            vec![ModuleArchive::new("http", vec![]), ModuleArchive::new("http.client", vec![])],
        )
    }

    #[test]
    fn test_source_packages_are_cached_structurally() {
        let mut cache = PackageCache::new();
        assert_eq!(cache.register(package(PackageOrigin::Source).compilation()), 2);

        assert!(cache.get(&identity("http")).is_some());
        assert!(cache.symbol(&identity("http")).is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_archive_packages_are_cached_by_symbol() {
        let mut cache = PackageCache::new();
        cache.register(package(PackageOrigin::Archive).compilation());

        assert!(cache.get(&identity("http")).is_none());
        assert!(cache.symbol(&identity("http.client")).is_some());
    }

    #[test]
    fn test_lookup_chain_falls_back_to_symbol_registry() {
        let mut cache = PackageCache::new();
        cache.register(package(PackageOrigin::Archive).compilation());

        let found = lookup_symbol(&cache, &identity("http"), &SymbolLookup::DEFAULT_CHAIN);
        assert!(found.is_some());
        assert!(lookup_symbol(&cache, &identity("http"), &[SymbolLookup::CompiledModule]).is_none());
        assert!(lookup_symbol(&cache, &identity("missing"), &SymbolLookup::DEFAULT_CHAIN).is_none());
    }

    #[test]
    fn test_register_keeps_first_entry() {
        let mut cache = PackageCache::new();
        let first = package(PackageOrigin::Archive);
        let second = package(PackageOrigin::Archive);

        cache.register(first.compilation());
        assert_eq!(cache.register(second.compilation()), 0);

        let cached = cache.symbol(&identity("http")).unwrap();
        assert!(Arc::ptr_eq(&cached, &first.compilation().modules()[0]));
    }
}
