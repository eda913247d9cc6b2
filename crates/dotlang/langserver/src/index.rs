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

//! Persisted symbol index for package completions
//!
//! The index stores, per package, the exported functions, records, objects,
//! client endpoints and other types. It is built ahead of time from a package
//! repository and queried by `(org, package)` while completing `pkg:`.

use dotlang_common::{PackageId, Version};
use dotlang_compiler::{PackageSymbol, SymbolKind};
use lsp_types::{CompletionItem, CompletionItemKind};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Format version written to and expected from index files
pub const INDEX_FORMAT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Index I/O error: {0}")]
    Io(String),

    #[error("Index serialization error: {0}")]
    Serialization(String),

    #[error("Incompatible index format version {found}, expected {expected}")]
    IncompatibleFormat { found: u32, expected: u32 },

    #[error("Index unavailable: {0}")]
    Unavailable(String),
}

pub type IndexResult<T> = Result<T, IndexError>;

/// Read access to a symbol index
pub trait SymbolIndex: Send + Sync {
    /// Packages named `package` in `org`. An empty org matches every org.
    fn query(&self, org: &str, package: &str) -> IndexResult<Vec<IndexedPackage>>;
}

/// Index persistence operations
pub trait IndexPersistence {
    /// Serialize the index to bytes
    fn serialize(&self) -> IndexResult<Vec<u8>>;

    /// Replace the index contents with previously serialized bytes
    fn deserialize(&mut self, data: &[u8]) -> IndexResult<()>;

    fn save_to_disk<P: AsRef<Path>>(&self, path: P) -> IndexResult<()>;

    fn load_from_disk<P: AsRef<Path>>(&mut self, path: P) -> IndexResult<()>;

    /// Get the index format version for compatibility
    fn format_version(&self) -> u32;
}

/// One exported symbol of an indexed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedSymbol {
    pub name: String,
    pub kind: SymbolKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl IndexedSymbol {
    pub fn completion_item(&self) -> CompletionItem {
        let kind = match self.kind {
            SymbolKind::Function => CompletionItemKind::FUNCTION,
            SymbolKind::Record => CompletionItemKind::STRUCT,
            SymbolKind::Object => CompletionItemKind::CLASS,
            SymbolKind::ClientEndpoint => CompletionItemKind::INTERFACE,
            SymbolKind::Type => CompletionItemKind::TYPE_PARAMETER,
            SymbolKind::Constant => CompletionItemKind::CONSTANT,
            SymbolKind::Annotation => CompletionItemKind::PROPERTY,
        };
        CompletionItem {
            label: self.name.clone(),
            kind: Some(kind),
            detail: self.signature.clone(),
            ..CompletionItem::default()
        }
    }
}

/// Index entry of one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedPackage {
    pub org: String,
    pub name: String,
    pub version: Version,
    #[serde(default)]
    pub functions: Vec<IndexedSymbol>,
    #[serde(default)]
    pub records: Vec<IndexedSymbol>,
    #[serde(default)]
    pub objects: Vec<IndexedSymbol>,
    #[serde(default)]
    pub client_endpoints: Vec<IndexedSymbol>,
    #[serde(default)]
    pub other_types: Vec<IndexedSymbol>,
}

impl IndexedPackage {
    /// Index the exports of a package's default module
    pub fn from_symbol(symbol: &PackageSymbol) -> Self {
        let identity = &symbol.identity;
        let mut package = Self {
            org: identity.org().to_string(),
            name: identity.package().to_string(),
            version: identity.version().clone(),
            functions: Vec::new(),
            records: Vec::new(),
            objects: Vec::new(),
            client_endpoints: Vec::new(),
            other_types: Vec::new(),
        };

        for export in &symbol.exports {
            let bucket = match export.kind {
                SymbolKind::Function => &mut package.functions,
                SymbolKind::Record => &mut package.records,
                SymbolKind::Object => &mut package.objects,
                SymbolKind::ClientEndpoint => &mut package.client_endpoints,
                SymbolKind::Type => &mut package.other_types,
                SymbolKind::Constant | SymbolKind::Annotation => continue,
            };
            bucket.push(IndexedSymbol {
                name: export.name.clone(),
                kind: export.kind,
                signature: export.signature.clone(),
            });
        }
        package
    }

    pub fn package_id(&self) -> PackageId {
        PackageId::new(&self.org, &self.name, self.version.clone())
    }

    /// Import path as written in source, e.g. `acme/net.http`
    pub fn import_path(&self) -> String {
        format!("{}/{}", self.org, self.name)
    }

    pub fn matches(&self, org: &str, package: &str) -> bool {
        self.name == package && (org.is_empty() || self.org == org)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    format_version: u32,
    packages: Vec<IndexedPackage>,
}

/// In-memory completion index with JSON persistence
#[derive(Debug, Default)]
pub struct CompletionIndex {
    packages: RwLock<Vec<IndexedPackage>>,
}

impl CompletionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an index file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> IndexResult<Self> {
        let mut index = Self::new();
        index.load_from_disk(path)?;
        Ok(index)
    }

    /// Add a package, replacing an entry with the same org, name and version
    pub fn insert(&self, package: IndexedPackage) {
        let mut packages = self.packages.write();
        packages.retain(|existing| existing.package_id() != package.package_id());
        packages.push(package);
    }

    pub fn insert_package(&self, symbol: &PackageSymbol) {
        self.insert(IndexedPackage::from_symbol(symbol));
    }

    /// Ids of every indexed package, in insertion order
    pub fn package_ids(&self) -> Vec<PackageId> {
        self.packages.read().iter().map(IndexedPackage::package_id).collect()
    }

    pub fn len(&self) -> usize {
        self.packages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.read().is_empty()
    }
}

impl SymbolIndex for CompletionIndex {
    fn query(&self, org: &str, package: &str) -> IndexResult<Vec<IndexedPackage>> {
        let matches: Vec<_> = self.packages.read().iter().filter(|p| p.matches(org, package)).cloned().collect();
        debug!("Index query {}/{} matched {} package(s)", org, package, matches.len());
        Ok(matches)
    }
}

impl IndexPersistence for CompletionIndex {
    fn serialize(&self) -> IndexResult<Vec<u8>> {
        let file = IndexFile {
            format_version: INDEX_FORMAT_VERSION,
            packages: self.packages.read().clone(),
        };
        serde_json::to_vec_pretty(&file).map_err(|e| IndexError::Serialization(e.to_string()))
    }

    fn deserialize(&mut self, data: &[u8]) -> IndexResult<()> {
        let file: IndexFile = serde_json::from_slice(data).map_err(|e| IndexError::Serialization(e.to_string()))?;
        if file.format_version != INDEX_FORMAT_VERSION {
            return Err(IndexError::IncompatibleFormat {
                found: file.format_version,
                expected: INDEX_FORMAT_VERSION,
            });
        }

        *self.packages.get_mut() = file.packages;
        Ok(())
    }

    fn save_to_disk<P: AsRef<Path>>(&self, path: P) -> IndexResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| IndexError::Io(format!("Failed to create directory: {}", e)))?;
        }
        let data = self.serialize()?;
        std::fs::write(path, data).map_err(|e| IndexError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    fn load_from_disk<P: AsRef<Path>>(&mut self, path: P) -> IndexResult<()> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| IndexError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        self.deserialize(&data)
    }

    fn format_version(&self) -> u32 {
        INDEX_FORMAT_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotlang_common::ModuleIdentity;
    use dotlang_compiler::ExportedSymbol;
    use tempfile::TempDir;

    fn symbol(org: &str, name: &str) -> PackageSymbol {
        PackageSymbol::new(
            ModuleIdentity::new(org, name, name, Version::new(1, 0, 0)),
            vec![
                ExportedSymbol::new("get", SymbolKind::Function).with_signature("function get(string path) returns Response"),
                ExportedSymbol::new("Response", SymbolKind::Record),
                ExportedSymbol::new("Client", SymbolKind::ClientEndpoint),
                ExportedSymbol::new("Method", SymbolKind::Type),
                ExportedSymbol::new("DEFAULT_PORT", SymbolKind::Constant),
            ],
        )
    }

    #[test]
    fn test_from_symbol_buckets() {
        let package = IndexedPackage::from_symbol(&symbol("acme", "http"));
        assert_eq!(package.functions.len(), 1);
        assert_eq!(package.records[0].name, "Response");
        assert_eq!(package.client_endpoints[0].name, "Client");
        assert_eq!(package.other_types[0].name, "Method");
        assert!(package.objects.is_empty());
        assert_eq!(package.import_path(), "acme/http");
    }

    #[test]
    fn test_query_with_and_without_org() {
        let index = CompletionIndex::new();
        index.insert_package(&symbol("acme", "http"));
        index.insert_package(&symbol("globex", "http"));
        index.insert_package(&symbol("acme", "log"));

        assert_eq!(index.query("acme", "http").unwrap().len(), 1);
        assert_eq!(index.query("", "http").unwrap().len(), 2);
        assert!(index.query("initech", "http").unwrap().is_empty());
    }

    #[test]
    fn test_insert_replaces_same_version() {
        let index = CompletionIndex::new();
        index.insert_package(&symbol("acme", "http"));
        index.insert_package(&symbol("acme", "http"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index").join("completions.json");

        let index = CompletionIndex::new();
        index.insert_package(&symbol("acme", "http"));
        index.save_to_disk(&path).unwrap();

        let loaded = CompletionIndex::open(&path).unwrap();
        assert_eq!(loaded.query("acme", "http").unwrap(), index.query("acme", "http").unwrap());
        assert_eq!(loaded.format_version(), INDEX_FORMAT_VERSION);
    }

    #[test]
    fn test_incompatible_format_rejected() {
        let mut index = CompletionIndex::new();
        let result = index.deserialize(br#"{"format_version": 99, "packages": []}"#);
        assert!(matches!(result, Err(IndexError::IncompatibleFormat { found: 99, expected: INDEX_FORMAT_VERSION })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(CompletionIndex::open(dir.path().join("missing.json")), Err(IndexError::Io(_))));
    }

    #[test]
    fn test_completion_item_detail() {
        let package = IndexedPackage::from_symbol(&symbol("acme", "http"));
        let item = package.functions[0].completion_item();
        assert_eq!(item.kind, Some(CompletionItemKind::FUNCTION));
        assert_eq!(item.detail.as_deref(), Some("function get(string path) returns Response"));
    }
}
