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

//! Compiler session: a context plus its bootstrap sequencer

use crate::bootstrap::{Bootstrap, required_extras};
use crate::config::{BootstrapMode, CompilerConfig};
use crate::context::CompilerContext;
use crate::dependencies::{DependencyPlanner, LoadStep, PackageManifest};
use crate::error::BootstrapError;
use crate::loader::ModuleLoader;
use crate::resolver::PackageResolver;
use crate::symbols::PackageSymbol;
use dotlang_common::ModuleIdentity;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of [`CompilerSession::load_dependencies`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Modules loaded by this call, in load order
    pub loaded: Vec<ModuleIdentity>,
    /// Modules that were already present in the context
    pub skipped: Vec<ModuleIdentity>,
    /// Local modules in the order they can be compiled
    pub compile_order: Vec<ModuleIdentity>,
}

pub struct CompilerSession {
    context: CompilerContext,
    bootstrap: Bootstrap,
}

impl CompilerSession {
    pub fn new(config: CompilerConfig, resolver: Arc<dyn PackageResolver>) -> Self {
        Self {
            context: CompilerContext::new(config),
            bootstrap: Bootstrap::new(ModuleLoader::new(resolver)),
        }
    }

    pub fn context(&self) -> &CompilerContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut CompilerContext {
        &mut self.context
    }

    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    pub fn into_context(self) -> CompilerContext {
        self.context
    }

    /// Load the whole lang-lib when the session runs in full bootstrap mode
    pub fn prepare(&mut self) -> Result<(), BootstrapError> {
        match self.context.config().bootstrap_mode {
            BootstrapMode::Full => self.bootstrap.load_all_well_known_modules(&mut self.context),
            BootstrapMode::Foundation => Ok(()),
        }
    }

    pub fn load_lang_lib(&mut self, target: &ModuleIdentity) -> Result<Arc<PackageSymbol>, BootstrapError> {
        self.bootstrap.load_lang_lib(&mut self.context, target)
    }

    /// Load everything a package declares it depends on.
    ///
    /// The foundation is bootstrapped first, for the first lang-lib module of the
    /// plan with extra requirements or else for the package itself. Every other
    /// module is then loaded once; modules already in the context are skipped.
    pub fn load_dependencies(&mut self, manifest: &PackageManifest) -> Result<LoadReport, BootstrapError> {
        let plan = DependencyPlanner::from_config(self.context.config()).plan(manifest)?;
        debug!("Load plan for {} has {} step(s)", manifest.package, plan.len());

        let foundation_target = plan
            .lang_libs()
            .find(|module| !required_extras(*module).is_empty())
            .map_or_else(|| manifest.package.default_module(), |module| module.identity());
        self.bootstrap.load_foundation(&mut self.context, &foundation_target)?;

        let mut report = LoadReport {
            compile_order: plan.compile_order(),
            ..LoadReport::default()
        };

        for step in plan.steps() {
            match step {
                LoadStep::LangLib(module) => {
                    let identity = module.identity();
                    if self.context.symbol_table().is_lang_module_loaded(*module) {
                        report.skipped.push(identity);
                    } else {
                        self.bootstrap.load_lang_lib(&mut self.context, &identity)?;
                        report.loaded.push(identity);
                    }
                }
                LoadStep::External(request) => match self.context.symbol_table().find_matching(request) {
                    Some(symbol) => report.skipped.push(symbol.identity.clone()),
                    None => {
                        let symbol = self.bootstrap.loader().load(&mut self.context, request)?;
                        report.loaded.push(symbol.identity.clone());
                    }
                },
                LoadStep::Compile(_) => {}
            }
        }

        info!("Loaded {} dependency module(s) for {} ({} already present)", report.loaded.len(), manifest.package, report.skipped.len());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependencies::{ImportDeclaration, LanguageFeature, ModuleManifest};
    use crate::package::{ModuleArchive, Package, PackageOrigin};
    use crate::resolver::StaticPackageResolver;
    use dotlang_common::{PackageId, Version, WellKnownModule};

    fn resolver() -> Arc<StaticPackageResolver> {
        let http = Package::new(PackageId::new("acme", "http", Version::new(2, 1, 0)), PackageOrigin::Archive, vec![ModuleArchive::new("http", vec![])]);
        Arc::new(StaticPackageResolver::with_lang_libs().with_package(http))
    }

    fn shop() -> PackageManifest {
        PackageManifest::new(PackageId::new("acme", "shop", Version::new(1, 0, 0))).with_module(
            ModuleManifest::new("shop")
                .with_import(ImportDeclaration::new("acme", "http"))
                .with_feature(LanguageFeature::QueryExpressions),
        )
    }

    #[test]
    fn test_load_dependencies() {
        let resolver = resolver();
        let mut session = CompilerSession::new(CompilerConfig::default(), resolver.clone());

        let report = session.load_dependencies(&shop()).unwrap();

        assert!(session.context().symbol_table().is_lang_module_loaded(WellKnownModule::Query));
        assert!(report.loaded.contains(&WellKnownModule::Query.identity()));
        assert!(report.loaded.contains(&ModuleIdentity::new("acme", "http", "http", Version::new(2, 1, 0))));
        // extras were already bound by the foundation
        assert!(report.skipped.contains(&WellKnownModule::Stream.identity()));
        assert_eq!(report.compile_order, vec![ModuleIdentity::new("acme", "shop", "shop", Version::new(1, 0, 0))]);
    }

    #[test]
    fn test_second_load_skips_everything() {
        let resolver = resolver();
        let mut session = CompilerSession::new(CompilerConfig::default(), resolver.clone());
        session.load_dependencies(&shop()).unwrap();
        let requests = resolver.load_count();

        let report = session.load_dependencies(&shop()).unwrap();
        assert!(report.loaded.is_empty());
        assert_eq!(resolver.load_count(), requests);
    }

    #[test]
    fn test_prepare_in_full_mode() {
        let mut session = CompilerSession::new(CompilerConfig::new().with_bootstrap_mode(BootstrapMode::Full), resolver());
        session.prepare().unwrap();
        assert_eq!(session.context().symbol_table().loaded_lang_modules().len(), WellKnownModule::ALL.len());

        let mut session = CompilerSession::new(CompilerConfig::default(), resolver());
        session.prepare().unwrap();
        assert_eq!(session.context().symbol_table().module_count(), 0);
    }

    #[test]
    fn test_planning_error_surfaces() {
        let manifest = PackageManifest::new(PackageId::new("acme", "shop", Version::new(1, 0, 0)))
            .with_module(ModuleManifest::new("shop").with_import(ImportDeclaration::new("acme", "shop")));
        let mut session = CompilerSession::new(CompilerConfig::default(), resolver());

        assert!(matches!(session.load_dependencies(&manifest), Err(BootstrapError::Dependency(_))));
    }
}
