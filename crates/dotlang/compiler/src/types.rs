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

//! Builtin types derived from lang-lib modules
//!
//! Some builtin types are structurally defined by lang-lib code: the error type
//! and its detail types need the annotations module, the integer range type comes
//! from the internal module and the raw template type from the object module.
//! Each time one of those modules is bound the affected types are re-derived.

use crate::symbol_table::SymbolTable;
use dotlang_common::{ModuleIdentity, WellKnownModule};

/// Name of the internal-module type backing integer ranges
pub const INT_RANGE_TYPE: &str = "__IntRange";

/// Name of the object-module type backing raw templates
pub const RAW_TEMPLATE_TYPE: &str = "RawTemplate";

/// Where a derived type's definition came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeOrigin {
    /// The compiler's placeholder definition
    Builtin,
    /// Defined by a loaded lang-lib module
    LangLib(ModuleIdentity),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedType {
    pub name: &'static str,
    pub origin: TypeOrigin,
    /// Number of times the type has been derived
    pub generation: u32,
}

impl DerivedType {
    fn builtin(name: &'static str) -> Self {
        Self {
            name,
            origin: TypeOrigin::Builtin,
            generation: 0,
        }
    }

    fn rederive(&mut self, origin: TypeOrigin) {
        self.origin = origin;
        self.generation += 1;
    }

    pub fn is_builtin(&self) -> bool {
        self.origin == TypeOrigin::Builtin
    }
}

/// Derived builtin types of a compiler context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedTypes {
    error: DerivedType,
    error_detail: DerivedType,
    cloneable: DerivedType,
    int_range: DerivedType,
    raw_template: DerivedType,
}

impl Default for DerivedTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl DerivedTypes {
    pub fn new() -> Self {
        Self {
            error: DerivedType::builtin("error"),
            error_detail: DerivedType::builtin("error.Detail"),
            cloneable: DerivedType::builtin("Cloneable"),
            int_range: DerivedType::builtin(INT_RANGE_TYPE),
            raw_template: DerivedType::builtin(RAW_TEMPLATE_TYPE),
        }
    }

    /// Re-derive the error type and everything defined in terms of it
    pub fn reload_error_and_dependent_types(&mut self, table: &SymbolTable) {
        let origin = table
            .lang_module(WellKnownModule::Annotations)
            .map_or(TypeOrigin::Builtin, |symbol| TypeOrigin::LangLib(symbol.identity.clone()));

        self.cloneable.rederive(origin.clone());
        self.error_detail.rederive(origin.clone());
        self.error.rederive(origin);
    }

    /// Re-derive the integer range type from the internal module
    pub fn reload_int_range_type(&mut self, table: &SymbolTable) {
        let origin = Self::defining_module(table, WellKnownModule::Internal, INT_RANGE_TYPE);
        self.int_range.rederive(origin);
    }

    /// Derive the raw template type from the object module
    pub fn load_raw_template_type(&mut self, table: &SymbolTable) {
        let origin = Self::defining_module(table, WellKnownModule::Object, RAW_TEMPLATE_TYPE);
        self.raw_template.rederive(origin);
    }

    fn defining_module(table: &SymbolTable, module: WellKnownModule, type_name: &str) -> TypeOrigin {
        match table.lang_module(module) {
            Some(symbol) if symbol.lookup(type_name).is_some() => TypeOrigin::LangLib(symbol.identity.clone()),
            _ => TypeOrigin::Builtin,
        }
    }

    pub fn error(&self) -> &DerivedType {
        &self.error
    }

    pub fn error_detail(&self) -> &DerivedType {
        &self.error_detail
    }

    pub fn cloneable(&self) -> &DerivedType {
        &self.cloneable
    }

    pub fn int_range(&self) -> &DerivedType {
        &self.int_range
    }

    pub fn raw_template(&self) -> &DerivedType {
        &self.raw_template
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{ExportedSymbol, PackageSymbol, SymbolKind};
    use std::sync::Arc;

    fn bind(table: &mut SymbolTable, module: WellKnownModule, exports: Vec<ExportedSymbol>) {
        table.set_lang_module(module, Arc::new(PackageSymbol::new(module.identity(), exports)));
    }

    #[test]
    fn test_error_types_follow_annotations() {
        let mut table = SymbolTable::new();
        let mut types = DerivedTypes::new();

        types.reload_error_and_dependent_types(&table);
        assert!(types.error().is_builtin());
        assert_eq!(types.error().generation, 1);

        bind(&mut table, WellKnownModule::Annotations, vec![]);
        types.reload_error_and_dependent_types(&table);
        assert_eq!(types.error().origin, TypeOrigin::LangLib(WellKnownModule::Annotations.identity()));
        assert_eq!(types.error_detail().origin, types.error().origin);
        assert_eq!(types.cloneable().generation, 2);
    }

    #[test]
    fn test_int_range_needs_internal_definition() {
        let mut table = SymbolTable::new();
        let mut types = DerivedTypes::new();

        bind(&mut table, WellKnownModule::Internal, vec![]);
        types.reload_int_range_type(&table);
        assert!(types.int_range().is_builtin());

        let mut table = SymbolTable::new();
        bind(&mut table, WellKnownModule::Internal, vec![ExportedSymbol::new(INT_RANGE_TYPE, SymbolKind::Object)]);
        types.reload_int_range_type(&table);
        assert_eq!(types.int_range().origin, TypeOrigin::LangLib(WellKnownModule::Internal.identity()));
        assert_eq!(types.int_range().generation, 2);
    }

    #[test]
    fn test_raw_template_from_object_module() {
        let mut table = SymbolTable::new();
        let mut types = DerivedTypes::new();
        bind(&mut table, WellKnownModule::Object, vec![ExportedSymbol::new(RAW_TEMPLATE_TYPE, SymbolKind::Object)]);

        types.load_raw_template_type(&table);
        assert!(!types.raw_template().is_builtin());
        assert_eq!(types.raw_template().generation, 1);
    }
}
