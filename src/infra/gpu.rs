// ============================================================
// Infrastructure — GPU Memory Query
// ============================================================
// Reads per-device framebuffer memory from the accelerator
// management tool:
//
//   nvidia-smi --query-gpu=index,memory.used,memory.total,memory.free
//              --format=csv,noheader,nounits
//
//   0, 1024, 24576, 23552
//   1, 0, 24576, 24576
//
// Figures are MiB, one line per visible device, in enumeration
// order. If the tool is missing the query fails; nothing here
// retries or falls back.

use std::{process::Command, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Result, UtilError};

pub const DEFAULT_SMI_BINARY: &str = "nvidia-smi";

const QUERY_FIELDS: &str = "--query-gpu=index,memory.used,memory.total,memory.free";
const QUERY_FORMAT: &str = "--format=csv,noheader,nounits";

/// Which memory figure to report per device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    Used,
    Total,
    Free,
}

impl FromStr for MemoryKind {
    type Err = UtilError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "used" => Ok(MemoryKind::Used),
            "total" => Ok(MemoryKind::Total),
            "free" => Ok(MemoryKind::Free),
            other => Err(UtilError::InvalidMemoryKind(other.to_string())),
        }
    }
}

/// Memory figures for one device, in MiB
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuMemory {
    pub index: usize,
    pub used:  u64,
    pub total: u64,
    pub free:  u64,
}

impl GpuMemory {
    pub fn get(&self, kind: MemoryKind) -> u64 {
        match kind {
            MemoryKind::Used => self.used,
            MemoryKind::Total => self.total,
            MemoryKind::Free => self.free,
        }
    }
}

/// Runs device queries through a given management tool binary.
#[derive(Debug, Clone)]
pub struct GpuQuery {
    binary: String,
}

impl Default for GpuQuery {
    fn default() -> Self {
        Self::new(DEFAULT_SMI_BINARY)
    }
}

impl GpuQuery {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }

    /// Query every visible device.
    pub fn devices(&self) -> Result<Vec<GpuMemory>> {
        let output = Command::new(&self.binary)
            .args([QUERY_FIELDS, QUERY_FORMAT])
            .output()
            .map_err(|source| UtilError::GpuUnavailable {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(UtilError::GpuQuery(format!(
                "'{}' exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        let devices = parse_smi_output(&String::from_utf8_lossy(&output.stdout))?;
        tracing::debug!("GPU query returned {} devices", devices.len());
        Ok(devices)
    }

    /// One figure of the requested kind per device
    pub fn memory(&self, kind: MemoryKind) -> Result<Vec<u64>> {
        Ok(self.devices()?.iter().map(|d| d.get(kind)).collect())
    }
}

/// Parse the `csv,noheader,nounits` output of the query. Blank lines are
/// skipped; any other line must hold four integer fields.
pub fn parse_smi_output(stdout: &str) -> Result<Vec<GpuMemory>> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_smi_line)
        .collect()
}

fn parse_smi_line(line: &str) -> Result<GpuMemory> {
    let malformed = || UtilError::MalformedSmiOutput(line.to_string());

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [index, used, total, free] = fields.as_slice() else {
        return Err(malformed());
    };

    Ok(GpuMemory {
        index: index.parse().map_err(|_| malformed())?,
        used:  used.parse().map_err(|_| malformed())?,
        total: total.parse().map_err(|_| malformed())?,
        free:  free.parse().map_err(|_| malformed())?,
    })
}

/// Memory of the requested kind for every visible GPU, in MiB.
pub fn get_gpu_mem(kind: MemoryKind) -> Result<Vec<u64>> {
    GpuQuery::default().memory(kind)
}

/// Total memory of every visible GPU, in MiB.
pub fn get_gpu_max_mem() -> Result<Vec<u64>> {
    get_gpu_mem(MemoryKind::Total)
}

/// Best-effort check for at least one usable accelerator.
pub fn accelerator_available() -> bool {
    match GpuQuery::default().devices() {
        Ok(devices) => !devices.is_empty(),
        Err(e) => {
            tracing::debug!("No accelerator detected: {}", e);
            false
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TWO_GPUS: &str = "0, 1024, 24576, 23552\n1, 0, 16384, 16384\n";

    #[test]
    fn test_parse_output_in_enumeration_order() {
        let devices = parse_smi_output(TWO_GPUS).unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(
            devices[0],
            GpuMemory { index: 0, used: 1024, total: 24576, free: 23552 }
        );
        assert_eq!(devices[1].index, 1);
    }

    #[test]
    fn test_select_memory_kind() {
        let devices = parse_smi_output(TWO_GPUS).unwrap();
        let pick = |kind| devices.iter().map(|d| d.get(kind)).collect::<Vec<_>>();
        assert_eq!(pick(MemoryKind::Used),  [1024, 0]);
        assert_eq!(pick(MemoryKind::Total), [24576, 16384]);
        assert_eq!(pick(MemoryKind::Free),  [23552, 16384]);
    }

    #[test]
    fn test_blank_output_means_no_devices() {
        assert!(parse_smi_output("\n  \n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_lines_are_rejected() {
        for bad in ["0, 1024, 24576", "0, 1 GiB, 2, 3", "No devices were found"] {
            let err = parse_smi_output(bad).unwrap_err();
            assert!(matches!(err, UtilError::MalformedSmiOutput(_)), "accepted '{bad}'");
        }
    }

    #[test]
    fn test_memory_kind_from_str() {
        assert_eq!("USED".parse::<MemoryKind>().unwrap(), MemoryKind::Used);
        assert_eq!(" free ".parse::<MemoryKind>().unwrap(), MemoryKind::Free);
        assert!("peak".parse::<MemoryKind>().is_err());
    }

    #[test]
    fn test_missing_tool_is_unavailable() {
        let query = GpuQuery::new("definitely-not-a-real-smi-binary");
        let err = query.memory(MemoryKind::Total).unwrap_err();
        assert!(matches!(err, UtilError::GpuUnavailable { .. }));
    }

    /// Writes an executable shell script standing in for the management tool.
    #[cfg(unix)]
    fn fake_tool(dir: &TempDir, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("fake-smi");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[test]
    fn test_reads_memory_from_tool_output() {
        let dir = TempDir::new().unwrap();
        let tool = fake_tool(&dir, "printf '0, 10, 100, 90\\n1, 5, 50, 45\\n'");

        let query = GpuQuery::new(tool);
        assert_eq!(query.memory(MemoryKind::Free).unwrap(), vec![90, 45]);
        assert_eq!(query.memory(MemoryKind::Used).unwrap(), vec![10, 5]);
        assert_eq!(query.devices().unwrap()[1].index, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool_reports_query_error() {
        let dir = TempDir::new().unwrap();
        let tool = fake_tool(&dir, "echo 'driver not loaded' >&2\nexit 3");

        let err = GpuQuery::new(tool).memory(MemoryKind::Total).unwrap_err();
        match err {
            UtilError::GpuQuery(message) => assert!(message.contains("driver not loaded"), "{message}"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
