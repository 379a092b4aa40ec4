use crate::session::SampleRecord;

/// Compute X (seconds) and Y (WPM) bounds for the results chart
pub fn compute_chart_params(history: &[SampleRecord], time_limit_secs: u64) -> (f64, f64) {
    let highest_wpm = history
        .iter()
        .map(|s| s.wpm.max(s.raw_wpm))
        .max()
        .unwrap_or(0);

    let overall_duration = match history.last() {
        Some(sample) => sample.second as f64,
        None => time_limit_secs as f64,
    };

    (overall_duration.max(1.0), (highest_wpm as f64).max(1.0))
}

pub fn wpm_points(history: &[SampleRecord]) -> Vec<(f64, f64)> {
    history
        .iter()
        .map(|s| (s.second as f64, s.wpm as f64))
        .collect()
}

pub fn raw_points(history: &[SampleRecord]) -> Vec<(f64, f64)> {
    history
        .iter()
        .map(|s| (s.second as f64, s.raw_wpm as f64))
        .collect()
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
