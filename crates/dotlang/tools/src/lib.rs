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

//! Command-line tooling around the dotlang compiler: a file system package
//! repository, lang-lib bootstrapping, completion index building and test runs.

pub mod cli;
pub mod config;
pub mod repository;
pub mod test_runner;

pub use config::{ConfigError, TestsConfig, ToolsConfig};
pub use repository::FileSystemRepository;
pub use test_runner::{LauncherError, ProcessLauncher, TestLauncher, TestPlan, TestReport, TestRunner};
