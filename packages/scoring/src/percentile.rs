//! Percentile ranks over a set of values.

/// Computes the percentile rank of every value: the fraction of values
/// less than or equal to it.
///
/// Ties share a percentile. The result is aligned with `values`, lies in
/// `(0, 1]`, and is monotonic non-decreasing in the input. Non-finite
/// inputs must be filtered out by the caller.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentile_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|a, b| values[*a].total_cmp(&values[*b]));

    let mut ranks = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let value = values[order[start]];
        let mut end = start + 1;
        while end < n && values[order[end]].total_cmp(&value).is_eq() {
            end += 1;
        }
        let pct = end as f64 / n as f64;
        for &idx in &order[start..end] {
            ranks[idx] = pct;
        }
        start = end;
    }

    ranks
}
