// ============================================================
// Infrastructure — Debugger Detection
// ============================================================
// Best-effort check for an attached debugger or tracer. Any
// failure to inspect the process reports "not attached".

/// True if a debugger or tracer is attached to this process.
///
/// On Linux this reads `TracerPid` from `/proc/self/status`. Other
/// platforms, or an unreadable status file, report `false`.
pub fn debugger_is_active() -> bool {
    #[cfg(target_os = "linux")]
    {
        match std::fs::read_to_string("/proc/self/status") {
            Ok(status) => tracer_pid(&status).is_some_and(|pid| pid != 0),
            Err(e) => {
                tracing::warn!("Cannot read /proc/self/status: {}", e);
                false
            }
        }
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn tracer_pid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("TracerPid:"))
        .and_then(|pid| pid.trim().parse().ok())
}
