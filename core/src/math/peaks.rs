use std::cmp::Ordering;

/// Indices of local maxima with value >= `floor`, separated by at least
/// `spacing` samples. A plateau reports its middle sample; endpoints are
/// never extrema. When two candidates fall inside one spacing window the
/// taller one survives.
pub fn find_peaks(series: &[f32], floor: f32, spacing: usize) -> Vec<usize> {
    let candidates: Vec<usize> = local_maxima(series)
        .into_iter()
        .filter(|&i| series[i] >= floor)
        .collect();
    enforce_spacing(series, candidates, spacing)
}

/// Indices of local minima with value <= `ceiling`; the same search as
/// `find_peaks` on the negated series.
pub fn find_valleys(series: &[f32], ceiling: f32, spacing: usize) -> Vec<usize> {
    let negated: Vec<f32> = series.iter().map(|v| -v).collect();
    find_peaks(&negated, -ceiling, spacing)
}

fn local_maxima(series: &[f32]) -> Vec<usize> {
    let n = series.len();
    let mut maxima = Vec::new();
    if n < 3 {
        return maxima;
    }

    let mut i = 1;
    while i < n - 1 {
        if series[i - 1] < series[i] {
            let mut ahead = i + 1;
            while ahead < n - 1 && series[ahead] == series[i] {
                ahead += 1;
            }
            if series[ahead] < series[i] {
                // Midpoint of the plateau [i, ahead - 1].
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    maxima
}

fn enforce_spacing(series: &[f32], candidates: Vec<usize>, spacing: usize) -> Vec<usize> {
    if spacing < 2 || candidates.len() < 2 {
        return candidates;
    }

    let mut keep = vec![true; candidates.len()];
    let mut priority: Vec<usize> = (0..candidates.len()).collect();
    priority.sort_by(|&a, &b| {
        series[candidates[b]]
            .partial_cmp(&series[candidates[a]])
            .unwrap_or(Ordering::Equal)
    });

    for &winner in &priority {
        if !keep[winner] {
            continue;
        }
        for other in 0..candidates.len() {
            if other == winner || !keep[other] {
                continue;
            }
            if candidates[winner].abs_diff(candidates[other]) < spacing {
                keep[other] = false;
            }
        }
    }

    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(index, kept)| kept.then_some(index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oscillation_yields_one_peak_per_cycle() {
        let series: Vec<f32> = (0..90)
            .map(|i| (i as f32 / 30.0 * std::f32::consts::TAU).sin())
            .collect();
        let peaks = find_peaks(&series, 0.5, 5);
        assert_eq!(peaks.len(), 3);
        let valleys = find_valleys(&series, -0.5, 5);
        assert_eq!(valleys.len(), 3);
    }

    #[test]
    fn floor_filters_low_peaks() {
        let series = vec![0.0, 1.0, 0.0, 5.0, 0.0, 1.0, 0.0];
        assert_eq!(find_peaks(&series, 2.0, 1), vec![3]);
        assert_eq!(find_peaks(&series, 0.5, 1), vec![1, 3, 5]);
    }

    #[test]
    fn spacing_keeps_the_taller_peak() {
        let series = vec![0.0, 3.0, 0.0, 4.0, 0.0, 0.0, 0.0, 2.0, 0.0];
        // peaks at 1 and 3 are 2 apart; the taller one at 3 survives.
        assert_eq!(find_peaks(&series, 0.0, 4), vec![3, 7]);
    }

    #[test]
    fn plateau_reports_middle_sample() {
        let series = vec![0.0, 1.0, 2.0, 2.0, 2.0, 1.0, 0.0];
        assert_eq!(find_peaks(&series, 0.0, 1), vec![3]);
    }

    #[test]
    fn endpoints_are_not_extrema() {
        let rising = vec![0.0, 1.0, 2.0, 3.0];
        assert!(find_peaks(&rising, 0.0, 1).is_empty());
        assert!(find_valleys(&rising, 5.0, 1).is_empty());
    }
}
