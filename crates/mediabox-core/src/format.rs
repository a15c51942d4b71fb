const UNITS: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];

/// Formats a byte count with 1024-based units.
///
/// Values under one kilobyte are printed without decimals; larger values use
/// `precision` decimals (`1024` at precision 0 is `1 KB`, `1536` at
/// precision 2 is `1.50 KB`).
pub fn format_size(bytes: i64, precision: usize) -> String {
    let sign = if bytes < 0 { "-" } else { "" };
    let mut value = bytes.unsigned_abs() as f64;
    let mut unit = 0;

    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{sign}{value:.0} {}", UNITS[unit])
    } else {
        format!("{sign}{value:.precision$} {}", UNITS[unit])
    }
}

/// Returns `used` as a percentage of `max`, rounded to `precision` decimals.
///
/// A non-positive maximum reports zero usage.
pub fn usage_percent(used: i64, max: i64, precision: u32) -> f64 {
    if max <= 0 {
        return 0.0;
    }

    let percent = used as f64 / max as f64 * 100.0;
    let scale = 10f64.powi(precision as i32);
    (percent * scale).round() / scale
}
