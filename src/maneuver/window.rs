use std::ops::Range;

/// Baseline window for one sample: the samples preceding it, never the sample
/// itself or anything after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineWindow {
    range: Range<usize>,
}

impl BaselineWindow {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.range.clone()
    }

    pub fn values(&self, series: &[f64]) -> Vec<f64> {
        self.indices().map(|i| series[i]).collect()
    }
}

/// Fewest preceding samples that make a usable baseline.
pub const MIN_BASELINE: usize = 2;

/// Index-keyed trailing window of fixed nominal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlidingWindow {
    size: usize,
}

impl SlidingWindow {
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    /// `clamp(len / 10, min, max)`, or the configured size when given.
    pub fn for_series(len: usize, configured: Option<usize>, min: usize, max: usize) -> Self {
        let size = configured.unwrap_or_else(|| (len / 10).clamp(min, max.max(min)));
        Self::new(size)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// The `size` samples before `index`; near the series start, every earlier
    /// sample. Empty while fewer than [`MIN_BASELINE`] samples (or `size`, if smaller)
    /// precede `index`.
    pub fn baseline(&self, index: usize, len: usize) -> BaselineWindow {
        let end = index.min(len);
        let start = end.saturating_sub(self.size);
        if end - start < MIN_BASELINE.min(self.size) {
            return BaselineWindow { range: end..end };
        }
        BaselineWindow { range: start..end }
    }
}

pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

/// Median absolute deviation about `center`.
pub fn mad(values: &[f64], center: f64) -> Option<f64> {
    let mut deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&mut deviations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_window_excludes_current_sample() {
        let w = SlidingWindow::new(5);
        let b = w.baseline(10, 20);
        assert_eq!(b.indices().collect::<Vec<_>>(), vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn edge_window_never_looks_ahead() {
        let w = SlidingWindow::new(5);
        assert!(w.baseline(0, 20).is_empty());
        assert!(w.baseline(1, 20).is_empty());
        assert_eq!(w.baseline(2, 20).indices().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(w.baseline(4, 20).indices().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(w.baseline(5, 20).indices().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        // shorter than the window
        assert_eq!(w.baseline(2, 3).indices().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn window_scales_with_series_length() {
        assert_eq!(SlidingWindow::for_series(20, None, 5, 31).size(), 5);
        assert_eq!(SlidingWindow::for_series(200, None, 5, 31).size(), 20);
        assert_eq!(SlidingWindow::for_series(2000, None, 5, 31).size(), 31);
        assert_eq!(SlidingWindow::for_series(2000, Some(9), 5, 31).size(), 9);
    }

    #[test]
    fn median_and_mad() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&mut []), None);
        assert_eq!(mad(&[1.0, 1.0, 2.0, 2.0, 4.0, 6.0, 9.0], 2.0), Some(1.0));
    }
}
