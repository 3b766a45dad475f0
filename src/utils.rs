//! Formatting helpers for log output.

/// Scale `value` down by `step` until it fits under one step, then print it
/// with one decimal and the matching suffix. Unscaled values print as-is.
fn scaled(value: u64, step: f64, suffixes: &[&str]) -> String {
    let mut amount = value as f64;
    let mut index = 0;
    // Compare after rounding so 999_999 becomes "1.0M", not "1000.0K"
    while index + 1 < suffixes.len() && (amount * 10.0).round() / 10.0 >= step {
        amount /= step;
        index += 1;
    }

    if index == 0 {
        format!("{}{}", value, suffixes[0])
    } else {
        format!("{:.1}{}", amount, suffixes[index])
    }
}

/// Domain and list counts with K/M suffix.
///
/// ```
/// use bound::utils::format_count;
/// assert_eq!(format_count(500), "500");
/// assert_eq!(format_count(1500), "1.5K");
/// assert_eq!(format_count(1_500_000), "1.5M");
/// ```
pub fn format_count(count: usize) -> String {
    scaled(count as u64, 1000.0, &["", "K", "M"])
}

/// Download sizes in binary units.
///
/// ```
/// use bound::utils::format_size;
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(32 * 1024 * 1024), "32.0 MiB");
/// ```
pub fn format_size(bytes: u64) -> String {
    scaled(bytes, 1024.0, &[" B", " KiB", " MiB", " GiB"])
}
