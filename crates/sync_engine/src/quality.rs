//! Windowed quality scoring of the merged table.

use contracts::{MergedTable, QualityScore};

/// Score every channel over overlapping row windows
///
/// Windows hold `window` rows and start at `0, step, 2·step, ..` with
/// `step = max(window / 2, 1)`, for every start `i < rows - window`.
pub fn score_windows(table: &MergedTable, window: usize) -> Vec<QualityScore> {
    let rows = table.row_count();
    if window == 0 || rows <= window {
        return Vec::new();
    }
    let step = (window / 2).max(1);

    let mut scores = Vec::new();
    for (window_index, start) in (0..rows - window).step_by(step).enumerate() {
        for column in table.columns() {
            let cells = &column.values[start..start + window];
            scores.push(score(&column.name, window_index, start, cells));
        }
    }
    scores
}

fn score(channel: &str, window_index: usize, start_row: usize, cells: &[f64]) -> QualityScore {
    let present: Vec<f64> = cells.iter().copied().filter(|v| !v.is_nan()).collect();
    let missing = cells.len() - present.len();

    let (variance, signal_noise_ratio) = if present.is_empty() {
        (None, 0.0)
    } else {
        let n = present.len() as f64;
        let mean = present.iter().sum::<f64>() / n;
        let var = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();
        let snr = if std == 0.0 { 0.0 } else { mean / std };
        (Some(var), snr)
    };

    QualityScore {
        channel: channel.to_string(),
        window_index,
        start_row,
        variance,
        missing,
        signal_noise_ratio,
    }
}
