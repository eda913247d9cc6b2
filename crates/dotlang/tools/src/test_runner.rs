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

//! Test-runner orchestration
//!
//! For every module of a package the runner writes the module's test suite to
//! `<target>/cache/tests_cache/<module>/test_suit.json`, launches the test
//! executor as a subprocess and collects its exit status. With a report
//! requested, the executor's `status.json` is read back per module. A coverage
//! run also implies a report; the executor records its execution data to
//! `<target>/cache/tests_cache/coverage/coverage.exec` and leaves a
//! `coverage.json` per module, which is collected once all modules ran.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info};

pub const TEST_SUITE_FILE: &str = "test_suit.json";
pub const RERUN_TEST_FILE: &str = "rerun_test.json";
pub const STATUS_FILE: &str = "status.json";
pub const COVERAGE_DIR: &str = "coverage";
pub const COVERAGE_FILE: &str = "coverage.json";
pub const EXEC_FILE: &str = "coverage.exec";

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to run the tests: {0}")]
    Launch(String),

    /// Carries the report collected before the failure surfaced
    #[error("there are test failures")]
    TestFailures { report: Box<TestReport> },
}

impl LauncherError {
    fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json { context: context.into(), source }
    }

    pub fn is_test_failure(&self) -> bool {
        matches!(self, LauncherError::TestFailures { .. })
    }
}

/// Which groups the executor should run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "groups", rename_all = "snake_case")]
pub enum GroupFilter {
    Include(Vec<String>),
    Exclude(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), groups: Vec::new() }
    }
}

/// The file handed to the test executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    pub org_name: String,
    pub package_name: String,
    pub module_name: String,
    pub tests: Vec<TestCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_filter: Option<GroupFilter>,
    #[serde(default)]
    pub report_required: bool,
}

/// Tests of one module. `tests` is `None` when the module has no test suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleTests {
    pub module_name: String,
    #[serde(default)]
    pub tests: Option<Vec<TestCase>>,
    /// Class path entries the executor needs for this module
    #[serde(default)]
    pub dependencies: Vec<PathBuf>,
}

/// Input of a test run, as produced by the build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPlan {
    /// Empty for anonymous packages
    pub org_name: String,
    pub package_name: String,
    pub modules: Vec<ModuleTests>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub status: String,
}

/// Per-module outcome written by the executor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModuleStatus {
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub tests: Vec<TestResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceFileCoverage {
    pub name: String,
    pub covered_lines: Vec<u32>,
    pub missed_lines: Vec<u32>,
}

/// Per-module coverage written by the executor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModuleCoverage {
    pub source_files: Vec<SourceFileCoverage>,
}

impl ModuleCoverage {
    pub fn covered_lines(&self) -> usize {
        self.source_files.iter().map(|file| file.covered_lines.len()).sum()
    }

    pub fn missed_lines(&self) -> usize {
        self.source_files.iter().map(|file| file.missed_lines.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    pub project_name: String,
    pub module_status: BTreeMap<String, ModuleStatus>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub coverage: BTreeMap<String, ModuleCoverage>,
}

impl TestReport {
    /// Covered lines over all modules in percent, `None` without coverage data
    pub fn coverage_percentage(&self) -> Option<f64> {
        let covered: usize = self.coverage.values().map(ModuleCoverage::covered_lines).sum();
        let total = covered + self.coverage.values().map(ModuleCoverage::missed_lines).sum::<usize>();
        if total == 0 {
            return None;
        }
        Some(covered as f64 * 100.0 / total as f64)
    }
}

/// Options selecting the tests to run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestOptions {
    pub groups: Option<Vec<String>>,
    pub disabled_groups: Option<Vec<String>>,
    pub tests: Option<Vec<String>>,
    pub rerun_failed: bool,
    pub report: bool,
    pub coverage: bool,
}

impl TestOptions {
    /// Coverage data is only useful inside a report
    pub fn report_required(&self) -> bool {
        self.report || self.coverage
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    All,
    Groups(GroupFilter),
    /// Named tests, or with `rerun` the failures recorded by the last run
    Named { tests: Vec<String>, rerun: bool },
}

impl Selection {
    /// Disabled groups win over groups, groups over named tests
    fn from_options(options: &TestOptions) -> Self {
        if let Some(groups) = &options.disabled_groups {
            Selection::Groups(GroupFilter::Exclude(groups.clone()))
        } else if let Some(groups) = &options.groups {
            Selection::Groups(GroupFilter::Include(groups.clone()))
        } else if options.rerun_failed {
            Selection::Named { tests: Vec::new(), rerun: true }
        } else if let Some(tests) = &options.tests {
            Selection::Named { tests: tests.clone(), rerun: false }
        } else {
            Selection::All
        }
    }
}

/// Command line of one executor run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCommand {
    pub program: String,
    pub args: Vec<String>,
}

/// Starts the test executor and waits for it
pub trait TestLauncher {
    fn launch(&self, command: &TestCommand) -> Result<i32, LauncherError>;
}

/// Runs the executor as a child process sharing this process's stdio
pub struct ProcessLauncher;

impl TestLauncher for ProcessLauncher {
    fn launch(&self, command: &TestCommand) -> Result<i32, LauncherError> {
        debug!("Launching {} {:?}", command.program, command.args);
        let status = Command::new(&command.program).args(&command.args).status().map_err(|e| LauncherError::Launch(e.to_string()))?;
        // a process killed by a signal has no exit code
        Ok(status.code().unwrap_or(1))
    }
}

pub struct TestRunner<'a> {
    executor: String,
    extra_args: Vec<String>,
    target_dir: PathBuf,
    options: TestOptions,
    launcher: &'a dyn TestLauncher,
}

impl<'a> TestRunner<'a> {
    pub fn new(executor: impl Into<String>, target_dir: impl Into<PathBuf>, launcher: &'a dyn TestLauncher) -> Self {
        Self {
            executor: executor.into(),
            extra_args: Vec::new(),
            target_dir: target_dir.into(),
            options: TestOptions::default(),
            launcher,
        }
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn with_options(mut self, options: TestOptions) -> Self {
        self.options = options;
        self
    }

    /// `<target>/cache/tests_cache/<module>`
    pub fn tests_cache_dir(&self, module: &str) -> PathBuf {
        self.target_dir.join("cache").join("tests_cache").join(module)
    }

    /// Execution data file the executor records coverage to
    pub fn exec_file(&self) -> PathBuf {
        self.tests_cache_dir(COVERAGE_DIR).join(EXEC_FILE)
    }

    /// Run the tests of every module; progress is written to `out`.
    ///
    /// All modules run even when one fails; the failure is reported at the end.
    pub fn run(&self, plan: &TestPlan, out: &mut dyn Write) -> Result<TestReport, LauncherError> {
        let selection = Selection::from_options(&self.options);
        let mut report = TestReport {
            project_name: plan.package_name.clone(),
            ..TestReport::default()
        };
        let mut result = 0;

        write_out(out, "\nRunning Tests")?;
        if self.options.coverage {
            write_out(out, " with Coverage")?;
            let coverage_dir = self.tests_cache_dir(COVERAGE_DIR);
            if coverage_dir.exists() {
                std::fs::remove_dir_all(&coverage_dir).map_err(|e| LauncherError::io("error while cleaning up coverage data", e))?;
            }
        }
        write_out(out, "\n")?;

        for module in &plan.modules {
            let json_dir = self.tests_cache_dir(&module.module_name);
            std::fs::create_dir_all(&json_dir).map_err(|e| LauncherError::io("error while creating json caches for tests", e))?;

            let Some(all_tests) = &module.tests else {
                if !plan.org_name.is_empty() {
                    write_out(out, &format!("\n\t{}\n", module.module_name))?;
                }
                write_out(out, "\tNo tests found\n")?;
                continue;
            };

            let mut tests = all_tests.clone();
            let mut group_filter = None;
            match &selection {
                Selection::All => {}
                Selection::Groups(filter) => group_filter = Some(filter.clone()),
                Selection::Named { tests: names, rerun } => {
                    let names = if *rerun { read_failed_tests(&json_dir)? } else { names.clone() };
                    tests.retain(|test| names.contains(&test.name));

                    if tests.is_empty() {
                        let message = if *rerun { "\tNo failed test/s found in cache\n" } else { "\tNo tests found with the given name/s\n" };
                        write_out(out, message)?;
                        continue;
                    }
                }
            }

            write_out(out, &format!("\t{}\n", module.module_name))?;
            let suite = TestSuite {
                org_name: plan.org_name.clone(),
                package_name: plan.package_name.clone(),
                module_name: module.module_name.clone(),
                tests,
                group_filter,
                report_required: self.options.report_required(),
            };
            write_suite(&suite, &json_dir)?;

            let command = self.command(&json_dir, module, plan)?;
            let status = self.launcher.launch(&command)?;
            info!("Tests of module {} finished with status {}", module.module_name, status);
            if result == 0 {
                result = status;
            }

            if self.options.report_required() {
                let status = load_module_status(&json_dir.join(STATUS_FILE))?;
                report.module_status.insert(module.module_name.clone(), status);
            }
        }

        // coverage files are complete only after every module ran
        if self.options.coverage {
            for module in &plan.modules {
                let path = self.tests_cache_dir(&module.module_name).join(COVERAGE_FILE);
                if path.is_file() {
                    report.coverage.insert(module.module_name.clone(), load_module_coverage(&path)?);
                }
            }
        }

        if result != 0 {
            return Err(LauncherError::TestFailures { report: Box::new(report) });
        }
        Ok(report)
    }

    /// `<executor> [--coverage <exec file>] -cp <classpath> <json dir> <extra args…> <target dir> <org> <package>`
    pub fn command(&self, json_dir: &Path, module: &ModuleTests, plan: &TestPlan) -> Result<TestCommand, LauncherError> {
        let class_path = std::env::join_paths(&module.dependencies).map_err(|e| LauncherError::Launch(format!("invalid class path: {}", e)))?;

        let mut args = Vec::new();
        if self.options.coverage {
            args.push("--coverage".to_string());
            args.push(self.exec_file().display().to_string());
        }
        args.extend(["-cp".to_string(), class_path.to_string_lossy().into_owned(), json_dir.display().to_string()]);
        args.extend(self.extra_args.iter().cloned());
        args.push(self.target_dir.display().to_string());
        args.push(plan.org_name.clone());
        args.push(plan.package_name.clone());

        Ok(TestCommand {
            program: self.executor.clone(),
            args,
        })
    }
}

fn write_out(out: &mut dyn Write, text: &str) -> Result<(), LauncherError> {
    out.write_all(text.as_bytes()).map_err(|e| LauncherError::io("couldn't write test output", e))
}

fn write_suite(suite: &TestSuite, json_dir: &Path) -> Result<(), LauncherError> {
    let content = serde_json::to_string(suite).map_err(|e| LauncherError::json("couldn't serialize the test suite", e))?;
    std::fs::write(json_dir.join(TEST_SUITE_FILE), content).map_err(|e| LauncherError::io("couldn't write data to the Json file", e))
}

fn read_failed_tests(json_dir: &Path) -> Result<Vec<String>, LauncherError> {
    let content = std::fs::read_to_string(json_dir.join(RERUN_TEST_FILE)).map_err(|e| LauncherError::io("error while running failed tests", e))?;
    serde_json::from_str(&content).map_err(|e| LauncherError::json("error while running failed tests", e))
}

fn load_module_status(path: &Path) -> Result<ModuleStatus, LauncherError> {
    let content = std::fs::read_to_string(path).map_err(|e| LauncherError::io("error while generating test report", e))?;
    serde_json::from_str(&content).map_err(|e| LauncherError::json("error while generating test report", e))
}

fn load_module_coverage(path: &Path) -> Result<ModuleCoverage, LauncherError> {
    let content = std::fs::read_to_string(path).map_err(|e| LauncherError::io("error while generating test report", e))?;
    serde_json::from_str(&content).map_err(|e| LauncherError::json("error while generating test report", e))
}
