use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::minimize::{Minimizer, NativeMinimizer, ProcessMinimizer};
use crate::optimizer::{Mode, Optimizer};
use crate::registry::{CsdlRegistry, Dialect};

/// Environment variables with this prefix override file settings,
/// e.g. `CSDL__MINIMIZER__TIMEOUT_MS=100`.
pub const ENV_PREFIX: &str = "CSDL";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct OptimizerConfig {
    pub dialect: Dialect,
    pub extra_targets: Vec<String>,
    pub fold_only: bool,
    pub minimizer: MinimizerConfig,
}

impl OptimizerConfig {
    /// Load settings from an optional YAML file, then the environment.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }
        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("extra_targets")
                    .with_list_parse_key("minimizer.args"),
            )
            .build()
            .context("Config: Failed to read settings")?;
        Ok(settings.try_deserialize()?)
    }

    pub fn registry(&self) -> CsdlRegistry {
        CsdlRegistry::new(self.dialect).with_extra_targets(self.extra_targets.iter().cloned())
    }

    pub fn mode(&self) -> Mode {
        if self.fold_only {
            Mode::FoldOnly
        } else {
            Mode::Minimize
        }
    }

    pub fn build_optimizer(&self) -> anyhow::Result<Optimizer> {
        Ok(Optimizer::new(Box::new(self.registry()), self.minimizer.build()?).with_mode(self.mode()))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct MinimizerConfig {
    pub kind: MinimizerKind,
    /// Executable for the `process` kind.
    pub program: Option<PathBuf>,
    pub args: Vec<String>,
    pub timeout_ms: u64,
    pub exact_variable_limit: usize,
    pub max_cubes: usize,
}

impl Default for MinimizerConfig {
    fn default() -> Self {
        Self {
            kind: MinimizerKind::Native,
            program: None,
            args: Vec::new(),
            timeout_ms: 5000,
            exact_variable_limit: 12,
            max_cubes: 4096,
        }
    }
}

impl MinimizerConfig {
    pub fn build(&self) -> anyhow::Result<Box<dyn Minimizer>> {
        match self.kind {
            MinimizerKind::Native => Ok(Box::new(NativeMinimizer::new(
                self.exact_variable_limit,
                self.max_cubes,
            ))),
            MinimizerKind::Process => {
                let Some(program) = &self.program else {
                    bail!("Config: minimizer.program is required for the process minimizer");
                };
                Ok(Box::new(ProcessMinimizer::new(
                    program.clone(),
                    self.args.clone(),
                    Duration::from_millis(self.timeout_ms),
                )))
            }
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MinimizerKind {
    #[default]
    Native,
    Process,
}

impl FromStr for MinimizerKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "native" => Ok(MinimizerKind::Native),
            "process" => Ok(MinimizerKind::Process),
            _ => Err(format!("invalid minimizer kind: {value}")),
        }
    }
}
