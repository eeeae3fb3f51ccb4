use crate::threshold::Threshold;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// One folder-name fragment as produced by [`format`], e.g.
/// `2024-01-15_start-hour_10-00`.
static DATED_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}_start-hour_\d{2}-\d{2}$").expect("dated-segment pattern")
});

/// Build the folder-name suffix for an effective date and threshold.
pub fn format(date: NaiveDate, threshold: &Threshold) -> String {
    format!("{}_start-hour_{}", date.format("%Y-%m-%d"), threshold)
}

/// Whether a single path segment is one of our dated folder names.
pub fn is_dated(segment: &str) -> bool {
    DATED_SEGMENT.is_match(segment)
}

/// Remove trailing dated segments from a display-form path until the plain
/// base remains. Applied on load so a configuration that already points at a
/// dated folder (even one dated several runs in a row) resolves back to the
/// same base.
pub fn strip_dated(path: &str) -> String {
    let mut current = path.trim_end_matches(['/', ' ']).to_string();
    loop {
        match current.rsplit_once('/') {
            Some((parent, last)) if is_dated(last) => {
                current = parent.trim_end_matches('/').to_string();
            }
            None if is_dated(&current) => current.clear(),
            _ => break,
        }
    }
    if current.is_empty() {
        "/".to_string()
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn formats_date_and_threshold() {
        let suffix = format(day("2024-01-15"), &Threshold::new(10, 0));
        assert_eq!(suffix, "2024-01-15_start-hour_10-00");
    }

    #[test]
    fn matches_own_output_only() {
        assert!(is_dated("2024-01-15_start-hour_10-00"));
        assert!(!is_dated("2024-01-15"));
        assert!(!is_dated("2024-01-15_start-hour_10-00/extra"));
        assert!(!is_dated("photos"));
        assert!(!is_dated("24-01-15_start-hour_10-00"));
    }

    #[test]
    fn strip_round_trips_a_built_target() {
        let base = "~/Pictures/booth";
        let suffix = format(day("2024-01-15"), &Threshold::new(10, 0));
        let target = format!("{base}/{suffix}");
        assert_eq!(strip_dated(&target), base);
    }

    #[test]
    fn strip_removes_nested_dated_segments() {
        let path = "/data/booth/2024-01-14_start-hour_10-00/2024-01-15_start-hour_08-30";
        assert_eq!(strip_dated(path), "/data/booth");
    }

    #[test]
    fn strip_leaves_plain_paths_alone() {
        assert_eq!(strip_dated("/data/booth"), "/data/booth");
        assert_eq!(strip_dated("/data/booth/"), "/data/booth");
        assert_eq!(strip_dated("relative/dir"), "relative/dir");
    }

    #[test]
    fn strip_degrades_to_root() {
        assert_eq!(strip_dated("/2024-01-15_start-hour_10-00"), "/");
        assert_eq!(strip_dated("2024-01-15_start-hour_10-00"), "/");
    }
}
