//! Running histogram of reconstructed invariant masses

use crate::numeric::Float;

/// Fixed-binning histogram over [min, max[, with under/overflow counters
#[derive(Clone, Debug, PartialEq)]
pub struct MassHistogram {
    /// Lower edge of the first bin (GeV)
    min: Float,

    /// Upper edge of the last bin (GeV)
    max: Float,

    /// Number of entries in each bin
    counts: Box<[u64]>,

    /// Entries below `min`
    underflow: u64,

    /// Entries at or above `max`, and entries which are not numbers
    overflow: u64,
}
//
impl MassHistogram {
    /// Set up an empty histogram with `num_bins` bins of equal width
    pub fn new(min: Float, max: Float, num_bins: usize) -> Self {
        assert!(min < max, "Histogram range should not be empty");
        assert!(num_bins > 0, "Histogram should have at least one bin");
        Self {
            min,
            max,
            counts: vec![0; num_bins].into_boxed_slice(),
            underflow: 0,
            overflow: 0,
        }
    }

    /// Number of bins
    pub fn num_bins(&self) -> usize {
        self.counts.len()
    }

    /// Width of each bin (GeV)
    pub fn bin_width(&self) -> Float {
        (self.max - self.min) / (self.num_bins() as Float)
    }

    /// Bin edges, from `min` to `max` (one more than the number of bins)
    pub fn bin_edges(&self) -> impl Iterator<Item = Float> + '_ {
        let width = self.bin_width();
        (0..=self.num_bins()).map(move |idx| self.min + (idx as Float) * width)
    }

    /// Number of entries in each bin
    pub fn counts(&self) -> &[u64] {
        &self.counts[..]
    }

    /// Entries below the histogram range
    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    /// Entries above the histogram range (including NaNs)
    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    /// Total number of entries, including under/overflow
    pub fn entries(&self) -> u64 {
        self.underflow + self.overflow + self.counts.iter().sum::<u64>()
    }

    /// Index of the bin in which a value falls, if within range
    pub fn bin_index(&self, mass: Float) -> Option<usize> {
        if !(self.min..self.max).contains(&mass) {
            return None;
        }
        let idx = ((mass - self.min) / self.bin_width()) as usize;
        // Rounding can push values right below max into a nonexistent bin
        Some(idx.min(self.num_bins() - 1))
    }

    /// Record a mass
    pub fn fill(&mut self, mass: Float) {
        match self.bin_index(mass) {
            Some(idx) => self.counts[idx] += 1,
            None if mass < self.min => self.underflow += 1,
            None => self.overflow += 1,
        }
    }

    /// Integrate entries from another histogram with the same binning
    pub fn merge(&mut self, other: &Self) {
        assert_eq!(
            (self.min, self.max, self.num_bins()),
            (other.min, other.max, other.num_bins()),
            "Merged histograms should have the same binning"
        );
        for (dst, src) in self.counts.iter_mut().zip(other.counts.iter()) {
            *dst += *src;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
    }

    /// Lower edge and count of the most populated bin (first one on ties),
    /// or None if all bins are empty
    pub fn peak_bin(&self) -> Option<(Float, u64)> {
        let (idx, &count) = self
            .counts
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|&(_, count)| *count)?;
        (count > 0).then(|| (self.min + (idx as Float) * self.bin_width(), count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn binning() {
        let hist = MassHistogram::new(0., 120., 120);
        assert_eq!(hist.num_bins(), 120);
        assert_relative_eq!(hist.bin_width(), 1.);
        let edges = hist.bin_edges().collect::<Vec<_>>();
        assert_eq!(edges.len(), 121);
        assert_eq!(edges[0], 0.);
        assert_relative_eq!(edges[120], 120.);
        assert_eq!(hist.bin_index(0.), Some(0));
        assert_eq!(hist.bin_index(3.09), Some(3));
        assert_eq!(hist.bin_index(119.99), Some(119));
        assert_eq!(hist.bin_index(120.), None);
        assert_eq!(hist.bin_index(-0.5), None);
    }

    #[test]
    fn fill_and_peak() {
        let mut hist = MassHistogram::new(0., 120., 120);
        assert_eq!(hist.peak_bin(), None);
        for &mass in &[3.09, 3.1, 91.2, 9.46, 3.05, -1., 150., Float::NAN] {
            hist.fill(mass);
        }
        assert_eq!(hist.entries(), 8);
        assert_eq!(hist.underflow(), 1);
        assert_eq!(hist.overflow(), 2);
        assert_eq!(hist.counts()[3], 3);
        assert_eq!(hist.counts()[91], 1);
        assert_eq!(hist.peak_bin(), Some((3., 3)));
    }

    #[test]
    fn peak_ties_go_to_first_bin() {
        let mut hist = MassHistogram::new(0., 10., 10);
        hist.fill(7.5);
        hist.fill(2.5);
        assert_eq!(hist.peak_bin(), Some((2., 1)));
    }

    #[test]
    fn merge_matches_single_fill() {
        let masses = [0.5, 3.1, 3.2, 9.4, 12., 91., 91.5, 99., 130., -2.];
        let mut whole = MassHistogram::new(0., 120., 60);
        masses.iter().for_each(|&m| whole.fill(m));

        let mut first = MassHistogram::new(0., 120., 60);
        let mut second = first.clone();
        masses[..4].iter().for_each(|&m| first.fill(m));
        masses[4..].iter().for_each(|&m| second.fill(m));
        first.merge(&second);
        assert_eq!(first, whole);
    }

    #[test]
    #[should_panic]
    fn merge_requires_same_binning() {
        let mut hist = MassHistogram::new(0., 120., 60);
        hist.merge(&MassHistogram::new(0., 120., 120));
    }
}
