// ============================================================
// ML Layer (Burn)
// ============================================================
// All code that touches burn tensors, modules or optimizer
// state lives here:
//
//   tensors.rs — tensor-aware leaves for nested containers,
//                host read-back and device moves
//
//   init.rs    — weight initialisation per layer kind, plus
//                adapters for burn's Linear and Embedding
//
//   optim.rs   — learning rate of the first parameter group

/// Tensor leaves and the host/device transforms
pub mod tensors;

/// Weight initialisation
pub mod init;

/// Learning-rate accessor
pub mod optim;
