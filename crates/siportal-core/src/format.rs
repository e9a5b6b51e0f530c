//! Formatting helpers for user-facing messages.

const MIB: usize = 1024 * 1024;
const KIB: usize = 1024;

/// Render a byte limit the way the upload form shows it, e.g. `5MB`.
///
/// Whole mebibytes are shown without decimals; anything below one MiB falls
/// back to kilobytes, and odd sizes get one decimal place.
pub fn format_size_limit(bytes: usize) -> String {
    if bytes >= MIB {
        if bytes % MIB == 0 {
            format!("{}MB", bytes / MIB)
        } else {
            format!("{:.1}MB", bytes as f64 / MIB as f64)
        }
    } else if bytes >= KIB {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{}B", bytes)
    }
}
