// ============================================================
// Domain Layer
// ============================================================
// Plain Rust types with no framework or OS dependencies beyond
// the device handle type:
//
//   nested.rs — nested mapping/sequence containers and the
//               leaf mapper every tensor transform builds on
//
//   device.rs — device specification parsing and mapping onto
//               burn's WGPU device handle
//
//   inert.rs  — sentinel placeholder for absent collaborators

/// Nested containers and the recursive leaf mapper
pub mod nested;

/// Device specification parser
pub mod device;

/// No-op placeholder object
pub mod inert;
