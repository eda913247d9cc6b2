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

//! Generic module loader
//!
//! Loads one module into a [`CompilerContext`]: resolve an exact request, fetch
//! and compile the owning package, reject fatal diagnostics, register the
//! compilation in the package cache and look the symbol up through the
//! configured lookup chain.

use crate::cache::{SymbolLookup, lookup_symbol};
use crate::config::CompilerConfig;
use crate::context::CompilerContext;
use crate::error::BootstrapError;
use crate::resolver::PackageResolver;
use crate::symbols::PackageSymbol;
use dotlang_common::{Diagnostics, ModuleIdentity, ModuleLoadRequest, Severity};
use metrics::counter;
use std::slice;
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct ModuleLoader {
    resolver: Arc<dyn PackageResolver>,
    lookup_chain: Vec<SymbolLookup>,
}

impl ModuleLoader {
    pub fn new(resolver: Arc<dyn PackageResolver>) -> Self {
        Self {
            resolver,
            lookup_chain: SymbolLookup::DEFAULT_CHAIN.to_vec(),
        }
    }

    /// Replace the symbol lookup strategies; they are tried in order
    pub fn with_lookup_chain(mut self, chain: Vec<SymbolLookup>) -> Self {
        self.lookup_chain = chain;
        self
    }

    /// Load exactly the given module
    pub fn load_module(&self, ctx: &mut CompilerContext, identity: &ModuleIdentity) -> Result<Arc<PackageSymbol>, BootstrapError> {
        self.load(ctx, &ModuleLoadRequest::exact(identity))
    }

    /// Load the module that satisfies a request
    pub fn load(&self, ctx: &mut CompilerContext, request: &ModuleLoadRequest) -> Result<Arc<PackageSymbol>, BootstrapError> {
        debug!("Loading module {}", request);
        counter!("dotlang_module_load_requests", 1);

        let responses = self.resolver.load_packages(slice::from_ref(request))?;
        let Some(resolved) = responses.first() else {
            return Err(BootstrapError::Unresolved(request.clone()));
        };

        for response in &responses {
            let package = self.resolver.get_package(&response.package_id)?;
            let compilation = package.compilation();
            check_diagnostics(ctx.config(), &response.identity, compilation.diagnostics())?;

            let registered = ctx.package_cache_mut().register(compilation);
            if registered > 0 {
                counter!("dotlang_modules_registered", registered as u64);
                debug!("Registered {} module(s) of package {}", registered, response.package_id);
            }
        }

        let identity = &resolved.identity;
        let symbol = lookup_symbol(ctx.package_cache(), identity, &self.lookup_chain).ok_or_else(|| BootstrapError::SymbolNotFound(identity.clone()))?;

        Ok(ctx.symbol_table_mut().define_module(symbol))
    }
}

fn check_diagnostics(config: &CompilerConfig, identity: &ModuleIdentity, diagnostics: &Diagnostics) -> Result<(), BootstrapError> {
    if diagnostics.has_errors() {
        error!("Error while bootstrapping {}: diagnostics {}", identity, diagnostics);
        counter!("dotlang_module_load_failures", 1);
        return Err(BootstrapError::module_diagnostics(identity.clone(), diagnostics.clone()));
    }

    if diagnostics.has_warnings() {
        for warning in diagnostics.iter().filter(|d| d.severity == Severity::Warning) {
            warn!("{}: {}", identity, warning);
        }
        if config.fatal_warnings {
            counter!("dotlang_module_load_failures", 1);
            return Err(BootstrapError::module_diagnostics(identity.clone(), diagnostics.clone()));
        }
    }

    Ok(())
}
