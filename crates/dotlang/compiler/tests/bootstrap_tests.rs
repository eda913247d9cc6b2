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

//! Bootstrap scenarios against a lang-lib resolver

use dotlang_common::{Diagnostic, ModuleIdentity, ModuleLoadRequest, ModuleLoadResponse, PackageId, WellKnownModule};
use dotlang_compiler::package::{ModuleArchive, PackageOrigin};
use dotlang_compiler::{Bootstrap, BootstrapError, BootstrapState, CompilerContext, ModuleLoader, Package, PackageResolver, ResolverError, StaticPackageResolver};
use mockall::mock;
use std::sync::Arc;

mock! {
    pub Resolver {}

    impl PackageResolver for Resolver {
        fn load_packages(&self, requests: &[ModuleLoadRequest]) -> Result<Vec<ModuleLoadResponse>, ResolverError>;
        fn get_package(&self, package_id: &PackageId) -> Result<Arc<Package>, ResolverError>;
    }
}

/// Mock that serves the lang-lib and expects an exact number of load requests
fn counting_resolver(expected_loads: usize) -> MockResolver {
    let fixture = Arc::new(StaticPackageResolver::with_lang_libs());
    let packages = fixture.clone();

    let mut resolver = MockResolver::new();
    resolver.expect_load_packages().times(expected_loads).returning(move |requests| fixture.load_packages(requests));
    resolver.expect_get_package().returning(move |id| packages.get_package(id));
    resolver
}

fn tracked() -> (Bootstrap, Arc<StaticPackageResolver>) {
    let resolver = Arc::new(StaticPackageResolver::with_lang_libs());
    (Bootstrap::new(ModuleLoader::new(resolver.clone())), resolver)
}

fn requested(resolver: &StaticPackageResolver) -> Vec<WellKnownModule> {
    resolver
        .requested()
        .iter()
        .filter_map(|request| WellKnownModule::ALL.into_iter().find(|module| request.matches(&module.identity())))
        .collect()
}

#[test]
fn test_second_foundation_call_is_a_no_op() {
    let mut bootstrap = Bootstrap::new(ModuleLoader::new(Arc::new(counting_resolver(3))));
    let mut ctx = CompilerContext::default();
    let target = WellKnownModule::Int.identity();

    bootstrap.load_foundation(&mut ctx, &target).unwrap();
    let slots = ctx.symbol_table().loaded_lang_modules();

    bootstrap.load_foundation(&mut ctx, &target).unwrap();
    assert_eq!(ctx.symbol_table().loaded_lang_modules(), slots);
    assert_eq!(bootstrap.state(), BootstrapState::Bootstrapped);
}

#[test]
fn test_query_foundation_order() {
    let (mut bootstrap, resolver) = tracked();
    let mut ctx = CompilerContext::default();

    bootstrap.load_foundation(&mut ctx, &WellKnownModule::Query.identity()).unwrap();

    use WellKnownModule::*;
    assert_eq!(requested(&resolver), vec![Annotations, JavaInterop, Internal, Array, Map, String, Value, Xml, Table, Stream]);
    assert!(!ctx.symbol_table().is_lang_module_loaded(Query));
}

#[test]
fn test_annotations_loads_exactly_itself() {
    let mut bootstrap = Bootstrap::new(ModuleLoader::new(Arc::new(counting_resolver(1))));
    let mut ctx = CompilerContext::default();

    let symbol = bootstrap.load_lang_lib(&mut ctx, &WellKnownModule::Annotations.identity()).unwrap();

    assert_eq!(symbol.identity, WellKnownModule::Annotations.identity());
    assert_eq!(ctx.symbol_table().loaded_lang_modules(), vec![WellKnownModule::Annotations]);
    assert!(ctx.types().error().is_builtin());
}

#[test]
fn test_java_interop_target_stops_after_annotations() {
    let (mut bootstrap, resolver) = tracked();
    let mut ctx = CompilerContext::default();

    bootstrap.load_foundation(&mut ctx, &WellKnownModule::JavaInterop.identity()).unwrap();
    assert_eq!(requested(&resolver), vec![WellKnownModule::Annotations]);
}

#[test]
fn test_fatal_diagnostics_stop_the_sequence() {
    let broken_internal = Package::new(
        WellKnownModule::Internal.identity().package_id(),
        PackageOrigin::Archive,
        vec![ModuleArchive::new("lang.__internal", vec![]).with_diagnostic(Diagnostic::error("undefined type 'Iterator'"))],
    );
    let resolver = Arc::new(StaticPackageResolver::with_lang_libs().with_package(broken_internal));
    let mut bootstrap = Bootstrap::new(ModuleLoader::new(resolver.clone()));
    let mut ctx = CompilerContext::default();

    let error = bootstrap.load_foundation(&mut ctx, &WellKnownModule::Query.identity()).unwrap_err();

    match &error {
        BootstrapError::ModuleDiagnostics { identity, diagnostics } => {
            assert_eq!(identity, &WellKnownModule::Internal.identity());
            assert_eq!(diagnostics.error_count(), 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(error.to_string().contains("undefined type 'Iterator'"));

    // earlier slots stay filled, nothing after the failure is loaded
    assert_eq!(ctx.symbol_table().loaded_lang_modules(), vec![WellKnownModule::Annotations, WellKnownModule::JavaInterop]);
    assert!(ctx.types().int_range().is_builtin());

    // the latch is already set
    bootstrap.load_foundation(&mut ctx, &WellKnownModule::Query.identity()).unwrap();
    assert_eq!(resolver.load_count(), 3);
}

#[test]
fn test_transaction_end_to_end() {
    let (mut bootstrap, resolver) = tracked();
    let mut ctx = CompilerContext::default();

    bootstrap.load_lang_lib(&mut ctx, &WellKnownModule::Transaction.identity()).unwrap();

    use WellKnownModule::*;
    assert_eq!(requested(&resolver), vec![Annotations, JavaInterop, Internal, Array, Map, String, Value, Error, Transaction]);
    assert_eq!(ctx.types().int_range().generation, 1);
    assert!(!ctx.symbol_table().is_lang_module_loaded(Decimal));
    assert!(!ctx.symbol_table().is_lang_module_loaded(Float));
    assert_eq!(ctx.symbol_table().lang_module(Transaction).unwrap().identity, Transaction.identity());
}

#[test]
fn test_non_lang_lib_module_through_load_lang_lib() {
    let app = Package::new(PackageId::new("acme", "app", dotlang_common::Version::new(0, 3, 0)), PackageOrigin::Source, vec![ModuleArchive::new("app", vec![])]);
    let resolver = Arc::new(StaticPackageResolver::with_lang_libs().with_package(app));
    let mut bootstrap = Bootstrap::new(ModuleLoader::new(resolver));
    let mut ctx = CompilerContext::default();
    let identity = ModuleIdentity::new("acme", "app", "app", dotlang_common::Version::new(0, 3, 0));

    let symbol = bootstrap.load_lang_lib(&mut ctx, &identity).unwrap();

    assert_eq!(symbol.identity, identity);
    assert!(ctx.package_cache().get(&identity).is_some());
    assert_eq!(ctx.symbol_table().loaded_lang_modules().len(), 3);
}

#[test]
fn test_contexts_are_independent() {
    let resolver = Arc::new(StaticPackageResolver::with_lang_libs());
    let mut first = Bootstrap::new(ModuleLoader::new(resolver.clone()));
    let mut second = Bootstrap::new(ModuleLoader::new(resolver.clone()));
    let mut ctx_a = CompilerContext::default();
    let mut ctx_b = CompilerContext::default();

    first.load_foundation(&mut ctx_a, &WellKnownModule::Int.identity()).unwrap();
    assert!(ctx_b.symbol_table().loaded_lang_modules().is_empty());

    second.load_foundation(&mut ctx_b, &WellKnownModule::Int.identity()).unwrap();
    assert_eq!(resolver.load_count(), 6);
    assert_eq!(ctx_a.symbol_table().loaded_lang_modules(), ctx_b.symbol_table().loaded_lang_modules());
}
