// ============================================================
// ablator-utils
// ============================================================
// Helper utilities for ML experiment runs built on burn:
//
//   domain/ — nested containers, device specs, placeholder
//   ml/     — tensor transforms, weight init, learning rate
//   infra/  — seeding, checkpoints, GPU memory, debugger,
//             configuration
//
// The helpers are independent of each other; the re-exports
// below are the flat surface most callers use.

pub mod domain;
pub mod error;
pub mod infra;
pub mod ml;

pub use domain::{
    device::{parse_device, parse_device_with, DeviceSpec, ParsedDevice},
    inert::Inert,
    nested::{map_leaves, try_map_leaves, Nested},
};
pub use error::{Result, UtilError};
pub use infra::{
    checkpoint::{get_latest_chkpts, latest_checkpoint, latest_checkpoints},
    config::ToolkitConfig,
    debugger::debugger_is_active,
    gpu::{get_gpu_max_mem, get_gpu_mem, GpuMemory, GpuQuery, MemoryKind},
    seed::{set_seed, set_seed_on, with_rng, with_tensor_rng},
};
pub use ml::{
    init::{init_embedding, init_layer_norm, init_linear, init_weights, Layer},
    optim::{get_lr, OptimizerState, ParamGroup, ParamGroups},
    tensors::{iter_to_device, iter_to_host, DynTensor, HostArray, Item},
};
