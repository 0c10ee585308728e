//! Number formatting for human-readable stat summaries.

/// Format a percentage value with 1 decimal place.
///
/// # Examples
/// ```
/// use tfstats_types::formatting::format_pct;
/// assert_eq!(format_pct(42.7), "42.7%");
/// assert_eq!(format_pct(0.0), "0.0%");
/// ```
pub fn format_pct(n: f64) -> String {
    format!("{:.1}%", n)
}

/// Percentage of `count` in `total`, `0.0` when total is zero.
///
/// # Examples
/// ```
/// use tfstats_types::formatting::pct_of;
/// assert_eq!(pct_of(1, 4), 25.0);
/// assert_eq!(pct_of(3, 0), 0.0);
/// ```
pub fn pct_of(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

/// Format a duration as `M:SS`. Negative durations keep their sign.
///
/// # Examples
/// ```
/// use tfstats_types::formatting::format_duration;
/// assert_eq!(format_duration(125), "2:05");
/// assert_eq!(format_duration(59), "0:59");
/// assert_eq!(format_duration(-65), "-1:05");
/// ```
pub fn format_duration(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let secs = secs.abs();
    format!("{}{}:{:02}", sign, secs / 60, secs % 60)
}

/// Format a signed difference with an explicit `+` for positive values.
///
/// # Examples
/// ```
/// use tfstats_types::formatting::format_signed;
/// assert_eq!(format_signed(3), "+3");
/// assert_eq!(format_signed(-2), "-2");
/// assert_eq!(format_signed(0), "0");
/// ```
pub fn format_signed(n: i64) -> String {
    if n > 0 { format!("+{}", n) } else { n.to_string() }
}
