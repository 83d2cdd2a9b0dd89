// ============================================================
// CLI Commands and Arguments
// ============================================================
// One subcommand per helper, plus `env` which summarises the
// host. Shared flags (config file, tool path, seed) live in
// ConfigArgs and are merged over the config file.
//
// clap parses DeviceSpec and MemoryKind through their FromStr
// impls, so invalid values are rejected before any command runs.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use ablator_utils::{DeviceSpec, MemoryKind, ToolkitConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a device specification (cpu, cuda, cuda:N, N, comma list, auto)
    Device(DeviceArgs),

    /// Print per-GPU memory in MiB
    GpuMem(GpuMemArgs),

    /// List checkpoint files in a directory, newest first
    Checkpoints(CheckpointArgs),

    /// Seed the process RNGs and print a few draws
    Seed(SeedArgs),

    /// Print the learning rate of the first parameter group in a saved optimizer state
    Lr(LrArgs),

    /// Summarise the host: default device, debugger, GPU memory
    Env,
}

/// Flags shared by every subcommand
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// JSON toolkit config to start from
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Accelerator management tool used for GPU queries
    #[arg(long, global = true)]
    pub smi_binary: Option<String>,

    /// Seed to apply before running the command
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

impl ConfigArgs {
    /// Config file values (or defaults), overridden by any flags given.
    pub fn resolve(&self) -> Result<ToolkitConfig> {
        let mut cfg = match &self.config {
            Some(path) => ToolkitConfig::load(path)
                .with_context(|| format!("Cannot load config from '{path}'"))?,
            None => ToolkitConfig::default(),
        };
        if let Some(binary) = &self.smi_binary {
            cfg.smi_binary = binary.clone();
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        Ok(cfg)
    }
}

#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// Device specification to normalise
    #[arg(default_value = "auto", value_parser = |s: &str| s.parse::<DeviceSpec>())]
    pub spec: DeviceSpec,
}

#[derive(Args, Debug)]
pub struct GpuMemArgs {
    /// Which figure to report: used, total or free
    #[arg(long, default_value = "total")]
    pub kind: MemoryKind,
}

#[derive(Args, Debug)]
pub struct CheckpointArgs {
    /// Directory holding the checkpoint files
    #[arg(long, default_value = "checkpoints")]
    pub dir: String,

    /// Checkpoint file extension, overriding the config
    #[arg(long)]
    pub ext: Option<String>,
}

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Number of general-purpose draws to print
    #[arg(long, default_value_t = 2)]
    pub draws: usize,
}

#[derive(Args, Debug)]
pub struct LrArgs {
    /// JSON file holding {"param_groups": [{"lr": ...}, ...]}
    #[arg(long)]
    pub file: String,
}
