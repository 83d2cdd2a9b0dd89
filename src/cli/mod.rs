// ============================================================
// CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes each subcommand to
// the library. No utility logic lives here.
//
//   ablator-utils device cuda:0
//   ablator-utils gpu-mem --kind free
//   ablator-utils checkpoints --dir runs/exp1
//   ablator-utils seed --seed 42 --draws 3
//   ablator-utils lr --file optimizer.json
//   ablator-utils env

pub mod commands;

use anyhow::{Context, Result};
use burn::backend::{ndarray::NdArrayDevice, NdArray};
use clap::Parser;
use rand::Rng;

use ablator_utils::{
    debugger_is_active, get_lr, latest_checkpoints, parse_device, set_seed_on, with_rng,
    DeviceSpec, GpuQuery, MemoryKind, ParsedDevice, ToolkitConfig,
};
use commands::{CheckpointArgs, Commands, ConfigArgs, DeviceArgs, GpuMemArgs, LrArgs, SeedArgs};

#[derive(Parser, Debug)]
#[command(
    name = "ablator-utils",
    version,
    about = "Inspect devices, GPU memory, checkpoints and optimizer state for ML runs."
)]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let cfg = self.config.resolve()?;

        // The seed command applies the seed itself and reports on it
        if cfg.seed.is_some() && !matches!(self.command, Commands::Seed(_)) {
            set_seed_on::<NdArray>(cfg.seed, &NdArrayDevice::Cpu)?;
        }

        match self.command {
            Commands::Device(args)      => run_device(args),
            Commands::GpuMem(args)      => run_gpu_mem(&cfg, args),
            Commands::Checkpoints(args) => run_checkpoints(&cfg, args),
            Commands::Seed(args)        => run_seed(&cfg, args),
            Commands::Lr(args)          => run_lr(args),
            Commands::Env               => run_env(&cfg),
        }
    }
}

fn run_device(args: DeviceArgs) -> Result<()> {
    let parsed = parse_device(args.spec)?;
    println!("{parsed}");
    if !matches!(parsed, ParsedDevice::Many(_)) {
        println!("wgpu: {:?}", parsed.to_wgpu()?);
    }
    Ok(())
}

fn run_gpu_mem(cfg: &ToolkitConfig, args: GpuMemArgs) -> Result<()> {
    let memory = GpuQuery::new(&cfg.smi_binary)
        .memory(args.kind)
        .context("GPU memory query failed")?;
    for (index, mib) in memory.iter().enumerate() {
        println!("gpu {index}: {mib} MiB {:?}", args.kind);
    }
    Ok(())
}

fn run_checkpoints(cfg: &ToolkitConfig, args: CheckpointArgs) -> Result<()> {
    let ext = args.ext.as_deref().unwrap_or(&cfg.checkpoint_extension);
    let found = latest_checkpoints(&args.dir, ext)?;
    if found.is_empty() {
        println!("No '.{ext}' checkpoints in '{}'", args.dir);
    }
    for path in found {
        println!("{}", path.display());
    }
    Ok(())
}

fn run_seed(cfg: &ToolkitConfig, args: SeedArgs) -> Result<()> {
    let seed = set_seed_on::<NdArray>(cfg.seed, &NdArrayDevice::Cpu)
        .context("Pass --seed or set \"seed\" in the config file")?;
    println!("seed: {seed}");
    for _ in 0..args.draws {
        println!("{}", with_rng(|rng| rng.gen::<u64>()));
    }
    Ok(())
}

fn run_lr(args: LrArgs) -> Result<()> {
    let json = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Cannot read optimizer state '{}'", args.file))?;
    let state: serde_json::Value = serde_json::from_str(&json)
        .with_context(|| format!("'{}' is not valid JSON", args.file))?;
    println!("{}", get_lr(&state)?);
    Ok(())
}

fn run_env(cfg: &ToolkitConfig) -> Result<()> {
    println!("default device: {}", parse_device(DeviceSpec::Auto)?);
    println!("debugger attached: {}", debugger_is_active());

    match GpuQuery::new(&cfg.smi_binary).devices() {
        Ok(devices) => {
            for d in devices {
                println!(
                    "gpu {}: used {} / total {} MiB ({} free)",
                    d.index,
                    d.get(MemoryKind::Used),
                    d.get(MemoryKind::Total),
                    d.get(MemoryKind::Free),
                );
            }
        }
        Err(e) => tracing::warn!("GPU memory unavailable: {}", e),
    }
    Ok(())
}
