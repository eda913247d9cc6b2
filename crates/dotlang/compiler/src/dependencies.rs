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

//! Declared-dependency planning
//!
//! A [`PackageManifest`] lists the modules of a package together with their
//! imports and the language features they use. [`DependencyPlanner`] turns it
//! into a [`LoadPlan`]: every lang-lib module a feature implies, every external
//! import and every local module, ordered so dependencies come first.

use crate::bootstrap::required_extras;
use crate::config::CompilerConfig;
use crate::error::DependencyError;
use dotlang_common::{ModuleIdentity, ModuleLoadRequest, PackageId, VersionReq, WellKnownModule};
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Language features that pull in lang-lib modules implicitly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageFeature {
    QueryExpressions,
    Transactions,
    XmlLiterals,
    Streams,
    Tables,
    Decimals,
    JavaInterop,
    RawTemplates,
}

impl LanguageFeature {
    /// The lang-lib module code using this feature compiles against
    pub fn implied_module(self) -> WellKnownModule {
        match self {
            LanguageFeature::QueryExpressions => WellKnownModule::Query,
            LanguageFeature::Transactions => WellKnownModule::Transaction,
            LanguageFeature::XmlLiterals => WellKnownModule::Xml,
            LanguageFeature::Streams => WellKnownModule::Stream,
            LanguageFeature::Tables => WellKnownModule::Table,
            LanguageFeature::Decimals => WellKnownModule::Decimal,
            LanguageFeature::JavaInterop => WellKnownModule::JavaInterop,
            LanguageFeature::RawTemplates => WellKnownModule::Object,
        }
    }
}

fn any_version() -> VersionReq {
    VersionReq::STAR
}

/// An `import` as declared in a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDeclaration {
    pub org: String,
    pub package: String,
    /// Module within the package; the default module when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default = "any_version")]
    pub version: VersionReq,
}

impl ImportDeclaration {
    pub fn new(org: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            package: package.into(),
            module: None,
            version: VersionReq::STAR,
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_version(mut self, version: VersionReq) -> Self {
        self.version = version;
        self
    }

    pub fn module_name(&self) -> &str {
        self.module.as_deref().unwrap_or(&self.package)
    }

    pub fn to_request(&self) -> ModuleLoadRequest {
        ModuleLoadRequest::new(&self.org, &self.package, self.module_name(), self.version.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleManifest {
    pub name: String,
    #[serde(default)]
    pub imports: Vec<ImportDeclaration>,
    #[serde(default)]
    pub features: Vec<LanguageFeature>,
}

impl ModuleManifest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            imports: Vec::new(),
            features: Vec::new(),
        }
    }

    pub fn with_import(mut self, import: ImportDeclaration) -> Self {
        self.imports.push(import);
        self
    }

    pub fn with_feature(mut self, feature: LanguageFeature) -> Self {
        self.features.push(feature);
        self
    }
}

/// Declared dependencies of a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub package: PackageId,
    pub modules: Vec<ModuleManifest>,
}

impl PackageManifest {
    pub fn new(package: PackageId) -> Self {
        Self { package, modules: Vec::new() }
    }

    pub fn with_module(mut self, module: ModuleManifest) -> Self {
        self.modules.push(module);
        self
    }

    pub fn module_identity(&self, name: &str) -> ModuleIdentity {
        ModuleIdentity::new(&self.package.org, &self.package.name, name, self.package.version.clone())
    }

    fn declares(&self, name: &str) -> bool {
        self.modules.iter().any(|m| m.name == name)
    }
}

/// One step of a [`LoadPlan`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoadStep {
    /// A lang-lib module bound to its well-known slot
    LangLib(WellKnownModule),
    /// A module of another package
    External(ModuleLoadRequest),
    /// A module of the package itself, compiled once its dependencies are loaded
    Compile(ModuleIdentity),
}

impl fmt::Display for LoadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStep::LangLib(module) => write!(f, "{}", module.identity()),
            LoadStep::External(request) => write!(f, "{}", request),
            LoadStep::Compile(identity) => write!(f, "{}", identity),
        }
    }
}

/// Module dependency graph; edges point from a dependency to its dependent
#[derive(Debug, Clone, Default)]
pub struct ModuleDependencyGraph {
    graph: DiGraph<LoadStep, ()>,
    node_indices: HashMap<LoadStep, NodeIndex>,
}

impl ModuleDependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a step to the graph if not present
    pub fn add_step(&mut self, step: LoadStep) -> NodeIndex {
        if let Some(&index) = self.node_indices.get(&step) {
            return index;
        }

        let index = self.graph.add_node(step.clone());
        self.node_indices.insert(step, index);
        index
    }

    /// Records that `dependent` needs `dependency` loaded first
    pub fn add_dependency(&mut self, dependent: LoadStep, dependency: LoadStep) {
        let dependent = self.add_step(dependent);
        let dependency = self.add_step(dependency);
        self.graph.update_edge(dependency, dependent, ());
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Steps in dependency order, each paired with the length of its longest dependency chain
    pub fn topological_sort(&self) -> Result<Vec<(LoadStep, usize)>, DependencyError> {
        let order = toposort(&self.graph, None).map_err(|cycle| DependencyError::Cycle(self.graph[cycle.node_id()].to_string()))?;

        let mut depths: HashMap<NodeIndex, usize> = HashMap::with_capacity(order.len());
        for &index in &order {
            let depth = self.graph.neighbors_directed(index, Direction::Incoming).filter_map(|dep| depths.get(&dep)).map(|d| d + 1).max().unwrap_or(0);
            depths.insert(index, depth);
        }

        Ok(order.into_iter().map(|index| (self.graph[index].clone(), depths[&index])).collect())
    }
}

/// Ordered steps needed before a package can be compiled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadPlan {
    steps: Vec<LoadStep>,
}

impl LoadPlan {
    pub fn steps(&self) -> &[LoadStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn lang_libs(&self) -> impl Iterator<Item = WellKnownModule> + '_ {
        self.steps.iter().filter_map(|step| match step {
            LoadStep::LangLib(module) => Some(*module),
            _ => None,
        })
    }

    /// Local modules in the order they can be compiled
    pub fn compile_order(&self) -> Vec<ModuleIdentity> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                LoadStep::Compile(identity) => Some(identity.clone()),
                _ => None,
            })
            .collect()
    }
}

pub struct DependencyPlanner {
    max_depth: usize,
}

impl DependencyPlanner {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn from_config(config: &CompilerConfig) -> Self {
        Self::new(config.max_dependency_depth)
    }

    /// Build the dependency graph of a manifest
    pub fn build_graph(&self, manifest: &PackageManifest) -> Result<ModuleDependencyGraph, DependencyError> {
        let mut graph = ModuleDependencyGraph::new();

        for module in &manifest.modules {
            let identity = manifest.module_identity(&module.name);
            let dependent = LoadStep::Compile(identity.clone());
            graph.add_step(dependent.clone());

            for import in &module.imports {
                let dependency = Self::import_step(manifest, import);
                if dependency == dependent {
                    return Err(DependencyError::SelfImport(identity.to_string()));
                }
                graph.add_dependency(dependent.clone(), dependency);
            }

            for feature in &module.features {
                graph.add_dependency(dependent.clone(), LoadStep::LangLib(feature.implied_module()));
            }
        }

        let lang_libs: Vec<WellKnownModule> = manifest
            .modules
            .iter()
            .flat_map(|m| m.imports.iter().map(|import| Self::import_step(manifest, import)))
            .chain(manifest.modules.iter().flat_map(|m| m.features.iter().map(|f| LoadStep::LangLib(f.implied_module()))))
            .filter_map(|step| match step {
                LoadStep::LangLib(module) => Some(module),
                _ => None,
            })
            .collect();
        for trigger in lang_libs {
            for &extra in required_extras(trigger) {
                graph.add_dependency(LoadStep::LangLib(trigger), LoadStep::LangLib(extra));
            }
        }

        Ok(graph)
    }

    /// Order every step of a manifest, dependencies first
    pub fn plan(&self, manifest: &PackageManifest) -> Result<LoadPlan, DependencyError> {
        let graph = self.build_graph(manifest)?;
        let ordered = graph.topological_sort()?;

        if let Some((step, _)) = ordered.iter().find(|(_, depth)| *depth > self.max_depth) {
            return Err(DependencyError::DepthExceeded {
                module: step.to_string(),
                limit: self.max_depth,
            });
        }

        Ok(LoadPlan {
            steps: ordered.into_iter().map(|(step, _)| step).collect(),
        })
    }

    fn import_step(manifest: &PackageManifest, import: &ImportDeclaration) -> LoadStep {
        let package = &manifest.package;
        if import.org == package.org && import.package == package.name && manifest.declares(import.module_name()) {
            return LoadStep::Compile(manifest.module_identity(import.module_name()));
        }

        let request = import.to_request();
        match WellKnownModule::ALL.into_iter().find(|module| request.matches(&module.identity())) {
            Some(module) => LoadStep::LangLib(module),
            None => LoadStep::External(request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotlang_common::{LANG_LIB_ORG, Version};

    fn manifest() -> PackageManifest {
        PackageManifest::new(PackageId::new("acme", "shop", Version::new(1, 0, 0)))
    }

    #[test]
    fn test_local_modules_ordered_by_imports() {
        let manifest = manifest()
            .with_module(ModuleManifest::new("shop").with_import(ImportDeclaration::new("acme", "shop").with_module("shop.model")))
            .with_module(ModuleManifest::new("shop.model"));

        let plan = DependencyPlanner::new(16).plan(&manifest).unwrap();
        assert_eq!(plan.compile_order(), vec![manifest.module_identity("shop.model"), manifest.module_identity("shop")]);
    }

    #[test]
    fn test_features_expand_to_lang_lib_closure() {
        let manifest = manifest().with_module(ModuleManifest::new("shop").with_feature(LanguageFeature::Transactions));

        let plan = DependencyPlanner::new(16).plan(&manifest).unwrap();
        let lang_libs: Vec<_> = plan.lang_libs().collect();

        assert_eq!(lang_libs.len(), 6);
        assert_eq!(lang_libs.last(), Some(&WellKnownModule::Transaction));
        assert!(lang_libs.contains(&WellKnownModule::Error));
    }

    #[test]
    fn test_lang_lib_import_is_recognised() {
        let manifest = manifest().with_module(ModuleManifest::new("shop").with_import(ImportDeclaration::new(LANG_LIB_ORG, "lang.int")));

        let plan = DependencyPlanner::new(16).plan(&manifest).unwrap();
        assert_eq!(plan.steps()[0], LoadStep::LangLib(WellKnownModule::Int));
    }

    #[test]
    fn test_external_import() {
        let manifest = manifest().with_module(ModuleManifest::new("shop").with_import(ImportDeclaration::new("acme", "http")));

        let plan = DependencyPlanner::new(16).plan(&manifest).unwrap();
        assert_eq!(plan.steps()[0], LoadStep::External(ModuleLoadRequest::latest("acme", "http", "http")));
    }

    #[test]
    fn test_cycle_detected() {
        let manifest = manifest()
            .with_module(ModuleManifest::new("shop").with_import(ImportDeclaration::new("acme", "shop").with_module("shop.model")))
            .with_module(ModuleManifest::new("shop.model").with_import(ImportDeclaration::new("acme", "shop")));

        assert!(matches!(DependencyPlanner::new(16).plan(&manifest), Err(DependencyError::Cycle(_))));
    }

    #[test]
    fn test_self_import_rejected() {
        let manifest = manifest().with_module(ModuleManifest::new("shop").with_import(ImportDeclaration::new("acme", "shop")));
        assert!(matches!(DependencyPlanner::new(16).plan(&manifest), Err(DependencyError::SelfImport(_))));
    }

    #[test]
    fn test_depth_limit() {
        let manifest = manifest().with_module(ModuleManifest::new("shop").with_feature(LanguageFeature::QueryExpressions));

        assert!(DependencyPlanner::new(2).plan(&manifest).is_ok());
        assert!(matches!(DependencyPlanner::new(1).plan(&manifest), Err(DependencyError::DepthExceeded { limit: 1, .. })));
    }

    #[test]
    fn test_manifest_from_json() {
        let json = r#"{
            "package": {"org": "acme", "name": "shop", "version": "1.0.0"},
            "modules": [{"name": "shop", "imports": [{"org": "acme", "package": "http", "version": "^2"}], "features": ["xml_literals"]}]
        }"#;
        let manifest: PackageManifest = serde_json::from_str(json).unwrap();

        assert_eq!(manifest.modules[0].features, vec![LanguageFeature::XmlLiterals]);
        assert_eq!(manifest.modules[0].imports[0].module_name(), "http");
    }
}
