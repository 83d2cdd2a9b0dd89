// ============================================================
// Infrastructure Layer
// ============================================================
// Everything that touches process-wide state or the host:
//
//   seed.rs       — the process-wide random generators and the
//                   single `set_seed` entry point
//
//   checkpoint.rs — newest-first checkpoint file listing
//
//   gpu.rs        — per-device memory figures from the
//                   accelerator management tool
//
//   debugger.rs   — attached-debugger detection
//
//   config.rs     — JSON-persisted toolkit settings

/// Process-wide seed control
pub mod seed;

/// Checkpoint discovery
pub mod checkpoint;

/// GPU memory query
pub mod gpu;

/// Debugger detection
pub mod debugger;

/// Toolkit configuration
pub mod config;
