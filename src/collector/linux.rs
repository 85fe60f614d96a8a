// Linux-specific helpers: /proc/meminfo fields sysinfo does not expose.

/// Read Cached and Buffers from /proc/meminfo (Linux), in bytes.
/// Returns None off Linux or when either line is absent.
pub(super) fn read_meminfo_cached_buffers() -> Option<(u64, u64)> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/meminfo").ok()?;
        let mut cached = None;
        let mut buffers = None;
        for line in content.lines() {
            if let Some(rest) = line.strip_prefix("Cached:") {
                cached = parse_kb(rest);
            } else if let Some(rest) = line.strip_prefix("Buffers:") {
                buffers = parse_kb(rest);
            }
        }
        if let (Some(cached), Some(buffers)) = (cached, buffers) {
            return Some((cached, buffers));
        }
    }
    None
}

/// Parse a meminfo value like "  123456 kB" into bytes.
#[cfg(target_os = "linux")]
fn parse_kb(s: &str) -> Option<u64> {
    s.trim()
        .strip_suffix("kB")
        .map(str::trim)
        .unwrap_or_else(|| s.trim())
        .parse::<u64>()
        .ok()
        .map(|kb| kb * 1024)
}
