//! This module allows integrating analysis results across events, and turning
//! them into final results

use crate::{
    config::HistogramConfig,
    event::Event,
    histogram::MassHistogram,
    numeric::Float,
    resonance::{self, Confidence, Resonance},
};

use std::collections::BTreeMap;

/// Per-candidate event counts
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CandidateCounts {
    /// Events attributed to the candidate
    pub total: u64,

    /// Events whose mass lies close to the nominal mass of the candidate
    pub strong: u64,
}

/// This struct accumulates intermediary results during the analysis, and
/// ultimately computes the final results (see AnalysisResults below).
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisAccumulator {
    /// Number of integrated events
    num_events: u64,

    /// Distribution of invariant masses
    histogram: MassHistogram,

    /// Classification outcomes
    candidates: BTreeMap<Resonance, CandidateCounts>,

    /// Number of events whose mass-squared was negative
    clamped_masses: u64,

    /// Sum of the invariant masses
    mass_sum: Float,
}
//
impl AnalysisAccumulator {
    /// Prepare for results integration
    pub fn new(hist_cfg: &HistogramConfig) -> Self {
        Self {
            num_events: 0,
            histogram: MassHistogram::new(hist_cfg.min, hist_cfg.max, hist_cfg.num_bins),
            candidates: BTreeMap::new(),
            clamped_masses: 0,
            mass_sum: 0.,
        }
    }

    /// Integrate an event whose invariant mass was computed
    pub fn integrate(&mut self, event: &Event) {
        let mass = event.invariant_mass();
        self.num_events += 1;
        self.histogram.fill(mass);
        self.mass_sum += mass;
        if event.mass_clamped() {
            self.clamped_masses += 1;
        }

        let classification = resonance::classify(mass);
        let counts = self.candidates.entry(classification.resonance).or_default();
        counts.total += 1;
        if classification.confidence == Confidence::Strong {
            counts.strong += 1;
        }
    }

    /// Integrate analysis results from another AnalysisAccumulator
    #[allow(clippy::needless_pass_by_value)]
    pub fn merge(&mut self, other: Self) {
        self.num_events += other.num_events;
        self.histogram.merge(&other.histogram);
        for (resonance, counts) in other.candidates {
            let dst = self.candidates.entry(resonance).or_default();
            dst.total += counts.total;
            dst.strong += counts.strong;
        }
        self.clamped_masses += other.clamped_masses;
        self.mass_sum += other.mass_sum;
    }

    /// Turn integrated data into finalized results
    pub fn finalize(self) -> AnalysisResults {
        let mean_mass = if self.num_events > 0 {
            self.mass_sum / (self.num_events as Float)
        } else {
            0.
        };
        let candidates = Resonance::ALL
            .iter()
            .map(|res| (*res, self.candidates.get(res).copied().unwrap_or_default()))
            .collect();
        AnalysisResults {
            num_events: self.num_events,
            histogram: self.histogram,
            candidates,
            clamped_masses: self.clamped_masses,
            mean_mass,
        }
    }
}

/// Final results of the analysis
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisResults {
    /// Number of analyzed events
    pub num_events: u64,

    /// Distribution of invariant masses
    pub histogram: MassHistogram,

    /// Event counts for every classification outcome, in display order
    pub candidates: Vec<(Resonance, CandidateCounts)>,

    /// Number of events with inconsistent 4-momenta
    pub clamped_masses: u64,

    /// Mean invariant mass (GeV)
    pub mean_mass: Float,
}
//
impl AnalysisResults {
    /// Event counts for one classification outcome
    pub fn counts(&self, resonance: Resonance) -> CandidateCounts {
        self.candidates
            .iter()
            .find(|(res, _)| *res == resonance)
            .map(|(_, counts)| *counts)
            .unwrap_or_default()
    }

    /// Fraction of the events attributed to a classification outcome
    pub fn fraction(&self, resonance: Resonance) -> Float {
        if self.num_events == 0 {
            return 0.;
        }
        self.counts(resonance).total as Float / self.num_events as Float
    }
}
