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

//! Lang-lib bootstrap sequencer
//!
//! Before any lang-lib module can be compiled, the modules it implicitly depends
//! on have to be present in the symbol table. [`Bootstrap::load_foundation`]
//! loads them in a fixed order, stopping early when the module being compiled is
//! itself part of the foundation. Bootstrapping happens at most once per
//! [`Bootstrap`] instance.

use crate::context::CompilerContext;
use crate::error::BootstrapError;
use crate::loader::ModuleLoader;
use crate::symbols::PackageSymbol;
use dotlang_common::{ModuleIdentity, WellKnownModule};
use std::sync::Arc;
use tracing::{debug, info};

/// Lang-lib modules that need extra modules beyond the foundation, in load order
static EXTRA_CLOSURES: &[(WellKnownModule, &[WellKnownModule])] = &[
    (
        WellKnownModule::Query,
        &[
            WellKnownModule::Array,
            WellKnownModule::Map,
            WellKnownModule::String,
            WellKnownModule::Value,
            WellKnownModule::Xml,
            WellKnownModule::Table,
            WellKnownModule::Stream,
        ],
    ),
    (
        WellKnownModule::Transaction,
        &[WellKnownModule::Array, WellKnownModule::Map, WellKnownModule::String, WellKnownModule::Value, WellKnownModule::Error],
    ),
];

/// Extra modules a lang-lib module needs loaded before it compiles
pub fn required_extras(module: WellKnownModule) -> &'static [WellKnownModule] {
    EXTRA_CLOSURES.iter().find(|(trigger, _)| *trigger == module).map_or(&[], |(_, extras)| extras)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BootstrapState {
    #[default]
    NotBootstrapped,
    Bootstrapped,
}

pub struct Bootstrap {
    loader: ModuleLoader,
    state: BootstrapState,
}

impl Bootstrap {
    pub fn new(loader: ModuleLoader) -> Self {
        Self {
            loader,
            state: BootstrapState::NotBootstrapped,
        }
    }

    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.state == BootstrapState::Bootstrapped
    }

    /// Load the modules `target` implicitly depends on.
    ///
    /// Only the first call does any work. The state is latched before loading, so
    /// a failed sequence is not retried and the slots it filled stay filled.
    pub fn load_foundation(&mut self, ctx: &mut CompilerContext, target: &ModuleIdentity) -> Result<(), BootstrapError> {
        if self.is_bootstrapped() {
            return Ok(());
        }
        self.state = BootstrapState::Bootstrapped;

        let target = WellKnownModule::from_identity(target);
        debug!("Bootstrapping foundation for {:?}", target);

        if target == Some(WellKnownModule::Annotations) {
            return Ok(());
        }
        self.load_into_slot(ctx, WellKnownModule::Annotations)?;
        ctx.reload_error_and_dependent_types();

        if target == Some(WellKnownModule::JavaInterop) {
            return Ok(());
        }
        self.load_into_slot(ctx, WellKnownModule::JavaInterop)?;

        if target == Some(WellKnownModule::Internal) {
            return Ok(());
        }
        self.load_into_slot(ctx, WellKnownModule::Internal)?;

        if let Some(target) = target {
            for &extra in required_extras(target) {
                self.load_into_slot(ctx, extra)?;
            }
        }

        ctx.reload_int_range_type();
        info!("Bootstrapped {} lang-lib module(s)", ctx.symbol_table().loaded_lang_modules().len());
        Ok(())
    }

    /// Bootstrap the foundation for a lang-lib module, then load the module itself
    pub fn load_lang_lib(&mut self, ctx: &mut CompilerContext, target: &ModuleIdentity) -> Result<Arc<PackageSymbol>, BootstrapError> {
        self.load_foundation(ctx, target)?;

        match WellKnownModule::from_identity(target) {
            Some(module) => self.load_into_slot(ctx, module),
            None => self.loader.load_module(ctx, target),
        }
    }

    /// Load every well-known module and register the predeclared ones
    pub fn load_all_well_known_modules(&self, ctx: &mut CompilerContext) -> Result<(), BootstrapError> {
        use WellKnownModule::*;

        self.load_into_slot(ctx, Annotations)?;
        self.load_into_slot(ctx, JavaInterop)?;
        self.load_into_slot(ctx, Internal)?;
        ctx.reload_error_and_dependent_types();
        ctx.reload_int_range_type();

        for module in [Array, Decimal, Error, Float, Future, Int, Map, Object] {
            self.load_into_slot(ctx, module)?;
        }
        ctx.load_raw_template_type();

        for module in [Stream, Table, String, Typedesc, Value, Xml, Boolean, Query, Transaction] {
            self.load_into_slot(ctx, module)?;
        }

        ctx.symbol_table_mut().load_predeclared_modules();
        info!("Loaded all {} well-known modules", WellKnownModule::ALL.len());
        Ok(())
    }

    fn load_into_slot(&self, ctx: &mut CompilerContext, module: WellKnownModule) -> Result<Arc<PackageSymbol>, BootstrapError> {
        if let Some(symbol) = ctx.symbol_table().lang_module(module) {
            return Ok(symbol.clone());
        }

        debug!("Loading lang-lib module {}", module);
        let symbol = self.loader.load_module(ctx, &module.identity())?;
        ctx.symbol_table_mut().set_lang_module(module, symbol.clone());
        Ok(symbol)
    }
}
