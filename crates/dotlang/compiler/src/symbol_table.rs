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

//! Symbol table of a compiler context
//!
//! Every well-known lang-lib module has its own slot. Every loaded module, lang-lib
//! or not, is also kept in a general cache keyed by identity.

use crate::symbols::PackageSymbol;
use dotlang_common::{ModuleIdentity, ModuleLoadRequest, WellKnownModule};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct SymbolTable {
    lang_modules: HashMap<WellKnownModule, Arc<PackageSymbol>>,
    modules: HashMap<ModuleIdentity, Arc<PackageSymbol>>,
    predeclared: BTreeMap<&'static str, Arc<PackageSymbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Symbol bound to a well-known slot
    pub fn lang_module(&self, module: WellKnownModule) -> Option<&Arc<PackageSymbol>> {
        self.lang_modules.get(&module)
    }

    /// Bind a well-known slot. The symbol is also defined in the general cache.
    pub fn set_lang_module(&mut self, module: WellKnownModule, symbol: Arc<PackageSymbol>) {
        debug_assert_eq!(symbol.identity, module.identity(), "slot {module} bound to a foreign module");
        let symbol = self.define_module(symbol);
        self.lang_modules.insert(module, symbol);
    }

    pub fn is_lang_module_loaded(&self, module: WellKnownModule) -> bool {
        self.lang_modules.contains_key(&module)
    }

    /// Filled slots, in declaration order of [`WellKnownModule::ALL`]
    pub fn loaded_lang_modules(&self) -> Vec<WellKnownModule> {
        WellKnownModule::ALL.into_iter().filter(|m| self.lang_modules.contains_key(m)).collect()
    }

    pub fn module(&self, identity: &ModuleIdentity) -> Option<&Arc<PackageSymbol>> {
        self.modules.get(identity)
    }

    /// Define a loaded module. If the identity is already defined the existing
    /// symbol is kept and returned.
    pub fn define_module(&mut self, symbol: Arc<PackageSymbol>) -> Arc<PackageSymbol> {
        self.modules.entry(symbol.identity.clone()).or_insert(symbol).clone()
    }

    /// Highest loaded version of a module that satisfies the request
    pub fn find_matching(&self, request: &ModuleLoadRequest) -> Option<&Arc<PackageSymbol>> {
        self.modules.iter().filter(|(identity, _)| request.matches(identity)).max_by(|(a, _), (b, _)| a.version().cmp(b.version())).map(|(_, symbol)| symbol)
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Make every loaded predeclared lang-lib module reachable through its short name
    pub fn load_predeclared_modules(&mut self) {
        for module in WellKnownModule::ALL.into_iter().filter(|m| m.is_predeclared()) {
            if let Some(symbol) = self.lang_modules.get(&module) {
                self.predeclared.insert(module.short_name(), symbol.clone());
            }
        }
    }

    /// Predeclared module bound to a prefix such as `int` or `string`
    pub fn predeclared_module(&self, prefix: &str) -> Option<&Arc<PackageSymbol>> {
        self.predeclared.get(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(module: WellKnownModule) -> Arc<PackageSymbol> {
        Arc::new(PackageSymbol::new(module.identity(), vec![]))
    }

    #[test]
    fn test_slots_and_general_cache() {
        let mut table = SymbolTable::new();
        table.set_lang_module(WellKnownModule::Int, symbol(WellKnownModule::Int));

        assert!(table.is_lang_module_loaded(WellKnownModule::Int));
        assert!(!table.is_lang_module_loaded(WellKnownModule::Float));
        assert!(table.module(&WellKnownModule::Int.identity()).is_some());
        assert_eq!(table.module_count(), 1);
    }

    #[test]
    fn test_define_module_keeps_existing_symbol() {
        let mut table = SymbolTable::new();
        let first = symbol(WellKnownModule::Xml);
        let kept = table.define_module(first.clone());
        let again = table.define_module(symbol(WellKnownModule::Xml));

        assert!(Arc::ptr_eq(&kept, &first));
        assert!(Arc::ptr_eq(&again, &first));
    }

    #[test]
    fn test_slot_reuses_defined_symbol() {
        let mut table = SymbolTable::new();
        let first = table.define_module(symbol(WellKnownModule::Map));
        table.set_lang_module(WellKnownModule::Map, symbol(WellKnownModule::Map));
        assert!(Arc::ptr_eq(table.lang_module(WellKnownModule::Map).unwrap(), &first));
    }

    #[test]
    fn test_loaded_modules_in_declaration_order() {
        let mut table = SymbolTable::new();
        for module in [WellKnownModule::Query, WellKnownModule::Annotations, WellKnownModule::Array] {
            table.set_lang_module(module, symbol(module));
        }
        assert_eq!(table.loaded_lang_modules(), vec![WellKnownModule::Annotations, WellKnownModule::Array, WellKnownModule::Query]);
    }

    #[test]
    fn test_predeclared_modules() {
        let mut table = SymbolTable::new();
        table.set_lang_module(WellKnownModule::Int, symbol(WellKnownModule::Int));
        table.set_lang_module(WellKnownModule::Internal, symbol(WellKnownModule::Internal));
        table.load_predeclared_modules();

        assert!(table.predeclared_module("int").is_some());
        assert!(table.predeclared_module("__internal").is_none());
        assert!(table.predeclared_module("string").is_none());
    }

    #[test]
    fn test_find_matching_prefers_highest_version() {
        use dotlang_common::Version;

        let mut table = SymbolTable::new();
        for minor in [1, 4, 2] {
            let identity = ModuleIdentity::new("acme", "http", "http", Version::new(1, minor, 0));
            table.define_module(Arc::new(PackageSymbol::new(identity, vec![])));
        }

        let found = table.find_matching(&ModuleLoadRequest::latest("acme", "http", "http")).unwrap();
        assert_eq!(found.identity.version(), &Version::new(1, 4, 0));
        assert!(table.find_matching(&ModuleLoadRequest::latest("acme", "http", "http.client")).is_none());
    }
}
