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

//! Configuration types for the compiler front end

use serde::{Deserialize, Serialize};

/// How much of the lang-lib a session loads before resolving user code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapMode {
    /// Only the foundation modules plus what the program needs
    #[default]
    Foundation,
    /// Every well-known module, as needed to build the lang-lib itself
    Full,
}

/// Configuration for a compiler context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Verbosity level: 0 = quiet, 1 = verbose, 2 = debug.
    ///
    /// The CLI adds one per `-v` and logs at warn, info, debug and trace from 0 up.
    pub verbosity: u8,
    /// Treat warning diagnostics of loaded modules as fatal
    pub fatal_warnings: bool,
    /// Maximum depth of the module dependency graph
    pub max_dependency_depth: usize,
    pub bootstrap_mode: BootstrapMode,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            fatal_warnings: false,
            max_dependency_depth: 64,
            bootstrap_mode: BootstrapMode::Foundation,
        }
    }
}

impl CompilerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Enable or disable fatal warnings
    pub fn with_fatal_warnings(mut self, enable: bool) -> Self {
        self.fatal_warnings = enable;
        self
    }

    /// Set maximum dependency graph depth
    pub fn with_max_dependency_depth(mut self, depth: usize) -> Self {
        self.max_dependency_depth = depth;
        self
    }

    pub fn with_bootstrap_mode(mut self, mode: BootstrapMode) -> Self {
        self.bootstrap_mode = mode;
        self
    }

    /// Check if verbose logging is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbosity > 0
    }

    /// Check if debug logging is enabled
    pub fn is_debug(&self) -> bool {
        self.verbosity > 1
    }
}
