// ============================================================
// Domain — Device Specifications
// ============================================================
// Normalises the many ways a run config names its compute
// device into one canonical form:
//
//   "cpu" | "cuda" | "cuda:N"   → unchanged
//   N                            → unchanged (device index)
//   [spec, spec, ...]            → parsed element-wise
//   nothing                      → "cuda" if an accelerator
//                                  is present, else "cpu"
//
// Any other string is rejected.

use std::{fmt, str::FromStr};

use burn::backend::wgpu::WgpuDevice;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UtilError};

/// A device specification as written by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceSpec {
    Index(usize),
    Name(String),
    Many(Vec<DeviceSpec>),
    /// No preference; resolved from host capabilities
    Auto,
}

/// The canonical form returned by [`parse_device`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParsedDevice {
    Index(usize),
    Name(String),
    Many(Vec<ParsedDevice>),
}

impl From<&str> for DeviceSpec {
    fn from(s: &str) -> Self {
        DeviceSpec::Name(s.to_string())
    }
}

impl From<usize> for DeviceSpec {
    fn from(i: usize) -> Self {
        DeviceSpec::Index(i)
    }
}

impl<T: Into<DeviceSpec>> From<Vec<T>> for DeviceSpec {
    fn from(items: Vec<T>) -> Self {
        DeviceSpec::Many(items.into_iter().map(Into::into).collect())
    }
}

/// Command-line form: `auto` or empty → Auto, digits → Index,
/// comma-separated → Many, anything else → Name. A comma list with
/// an empty element is rejected.
///
/// Names are not validated here; that is [`parse_device`]'s job.
impl FromStr for DeviceSpec {
    type Err = UtilError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("auto") {
            return Ok(DeviceSpec::Auto);
        }
        if s.contains(',') {
            return s
                .split(',')
                .map(|part| match part.trim() {
                    // "cpu," is a typo, not a request for auto-selection
                    "" => Err(UtilError::InvalidDevice(s.to_string())),
                    part => part.parse(),
                })
                .collect::<Result<Vec<_>>>()
                .map(DeviceSpec::Many);
        }
        match s.parse::<usize>() {
            Ok(i) => Ok(DeviceSpec::Index(i)),
            Err(_) => Ok(DeviceSpec::Name(s.to_string())),
        }
    }
}

/// Parse `spec`, probing the host for an accelerator when no
/// preference is given.
pub fn parse_device(spec: impl Into<DeviceSpec>) -> Result<ParsedDevice> {
    let spec = spec.into();
    // Only the Auto path needs the probe, and it spawns a process
    let available = contains_auto(&spec) && crate::infra::gpu::accelerator_available();
    parse_device_with(spec, available)
}

/// Parse `spec` with the accelerator availability supplied by the caller.
pub fn parse_device_with(spec: DeviceSpec, accelerator_available: bool) -> Result<ParsedDevice> {
    match spec {
        DeviceSpec::Name(name) => {
            if name == "cpu" || name == "cuda" || name.starts_with("cuda:") {
                Ok(ParsedDevice::Name(name))
            } else {
                Err(UtilError::InvalidDevice(name))
            }
        }
        DeviceSpec::Index(i) => Ok(ParsedDevice::Index(i)),
        DeviceSpec::Many(items) => items
            .into_iter()
            .map(|d| parse_device_with(d, accelerator_available))
            .collect::<Result<Vec<_>>>()
            .map(ParsedDevice::Many),
        DeviceSpec::Auto => {
            let name = if accelerator_available { "cuda" } else { "cpu" };
            tracing::debug!("No device requested, defaulting to '{}'", name);
            Ok(ParsedDevice::Name(name.to_string()))
        }
    }
}

fn contains_auto(spec: &DeviceSpec) -> bool {
    match spec {
        DeviceSpec::Auto => true,
        DeviceSpec::Many(items) => items.iter().any(contains_auto),
        _ => false,
    }
}

impl ParsedDevice {
    /// Map a single parsed device onto burn's WGPU device handle.
    ///
    ///   cpu          → WgpuDevice::Cpu
    ///   cuda         → WgpuDevice::DefaultDevice
    ///   cuda:N, N    → WgpuDevice::DiscreteGpu(N)
    pub fn to_wgpu(&self) -> Result<WgpuDevice> {
        match self {
            ParsedDevice::Index(i) => Ok(WgpuDevice::DiscreteGpu(*i)),
            ParsedDevice::Name(name) => match name.as_str() {
                "cpu" => Ok(WgpuDevice::Cpu),
                "cuda" => Ok(WgpuDevice::DefaultDevice),
                other => other
                    .strip_prefix("cuda:")
                    .and_then(|idx| idx.parse::<usize>().ok())
                    .map(WgpuDevice::DiscreteGpu)
                    .ok_or_else(|| UtilError::InvalidDevice(other.to_string())),
            },
            ParsedDevice::Many(_) => Err(UtilError::InvalidDevice(self.to_string())),
        }
    }
}

impl fmt::Display for ParsedDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedDevice::Index(i) => write!(f, "{i}"),
            ParsedDevice::Name(n) => write!(f, "{n}"),
            ParsedDevice::Many(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}
