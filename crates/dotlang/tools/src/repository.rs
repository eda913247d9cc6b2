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

//! Filesystem package repository
//!
//! Packages live at `<root>/<org>/<name>/<version>/package.json`, one
//! [`PackageArchive`] per file. Archives are decoded at most once per repository
//! instance.

use dotlang_common::{ModuleIdentity, ModuleLoadRequest, ModuleLoadResponse, PackageId, Version};
use dotlang_compiler::{Package, PackageArchive, PackageResolver, ResolverError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub const PACKAGE_FILE: &str = "package.json";

pub struct FileSystemRepository {
    root: PathBuf,
    cache: RwLock<HashMap<PackageId, Arc<Package>>>,
}

impl FileSystemRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn package_dir(&self, id: &PackageId) -> PathBuf {
        self.root.join(&id.org).join(&id.name).join(id.version.to_string())
    }

    /// Write an archive into the repository, replacing an existing one
    pub fn publish(&self, archive: &PackageArchive) -> Result<PathBuf, ResolverError> {
        let id = PackageId::new(&archive.org, &archive.name, archive.version.clone());
        let dir = self.package_dir(&id);
        fs::create_dir_all(&dir).map_err(|e| ResolverError::io(id.to_string(), format!("Failed to create {}: {}", dir.display(), e)))?;

        let path = dir.join(PACKAGE_FILE);
        let content = serde_json::to_string_pretty(archive).map_err(|e| ResolverError::corrupt_archive(id.to_string(), e.to_string()))?;
        fs::write(&path, content).map_err(|e| ResolverError::io(id.to_string(), format!("Failed to write {}: {}", path.display(), e)))?;

        self.cache.write().remove(&id);
        debug!("Published {} to {}", id, path.display());
        Ok(path)
    }

    /// Published versions of a package, oldest first
    pub fn versions(&self, org: &str, name: &str) -> Result<Vec<Version>, ResolverError> {
        let dir = self.root.join(org).join(name);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut versions: Vec<Version> = list_dirs(&dir)
            .map_err(|e| ResolverError::io(format!("{}/{}", org, name), e.to_string()))?
            .into_iter()
            .filter_map(|entry| match Version::parse(&entry) {
                Ok(version) => Some(version),
                Err(e) => {
                    warn!("Ignoring {}/{}/{}: {}", org, name, entry, e);
                    None
                }
            })
            .filter(|version| self.package_dir(&PackageId::new(org, name, version.clone())).join(PACKAGE_FILE).is_file())
            .collect();
        versions.sort();
        Ok(versions)
    }

    /// Every package in the repository
    pub fn package_ids(&self) -> Result<Vec<PackageId>, ResolverError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let root = self.root.display().to_string();
        for org in list_dirs(&self.root).map_err(|e| ResolverError::io(&root, e.to_string()))? {
            for name in list_dirs(&self.root.join(&org)).map_err(|e| ResolverError::io(&root, e.to_string()))? {
                for version in self.versions(&org, &name)? {
                    ids.push(PackageId::new(&org, &name, version));
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn read_package(&self, id: &PackageId) -> Result<Package, ResolverError> {
        let path = self.package_dir(id).join(PACKAGE_FILE);
        let content = fs::read_to_string(&path).map_err(|e| ResolverError::io(id.to_string(), format!("Failed to read {}: {}", path.display(), e)))?;
        let archive: PackageArchive = serde_json::from_str(&content).map_err(|e| ResolverError::corrupt_archive(id.to_string(), e.to_string()))?;

        let package = Package::from_archive(archive);
        if package.id() != id {
            return Err(ResolverError::corrupt_archive(id.to_string(), format!("archive declares {}", package.id())));
        }
        Ok(package)
    }

    fn resolve(&self, request: &ModuleLoadRequest) -> Result<Option<ModuleLoadResponse>, ResolverError> {
        for version in self.versions(&request.org, &request.package)?.into_iter().rev() {
            let identity = ModuleIdentity::new(&request.org, &request.package, &request.module, version.clone());
            if !request.matches(&identity) {
                continue;
            }
            if self.get_package(&identity.package_id())?.has_module(&request.module) {
                return Ok(Some(ModuleLoadResponse::new(identity)));
            }
        }
        Ok(None)
    }
}

impl PackageResolver for FileSystemRepository {
    fn load_packages(&self, requests: &[ModuleLoadRequest]) -> Result<Vec<ModuleLoadResponse>, ResolverError> {
        requests.iter().map(|request| self.resolve(request)?.ok_or_else(|| ResolverError::not_found(request))).collect()
    }

    fn get_package(&self, package_id: &PackageId) -> Result<Arc<Package>, ResolverError> {
        if let Some(package) = self.cache.read().get(package_id) {
            return Ok(package.clone());
        }

        let package = Arc::new(self.read_package(package_id)?);
        Ok(self.cache.write().entry(package_id.clone()).or_insert(package).clone())
    }
}

fn list_dirs(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
