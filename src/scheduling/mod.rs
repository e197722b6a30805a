//! This module takes care of scheduling the analysis work, encapsulating use
//! of multiple threads and anything else that will come in the future

#[cfg(feature = "multi-threading")]
mod multi_threading;
#[cfg(not(feature = "multi-threading"))]
mod sequential;

use crate::{
    analysis::{AnalysisAccumulator, AnalysisResults},
    event::Event,
};

/// Size of the analyzed event batches
///
/// Events are grouped in batches of a certain size in order to amortize
/// scheduling overhead and achieve perfect reproducibility between sequential
/// and parallel runs of the analysis.
///
const EVENT_BATCH_SIZE: usize = 10_000;

/// Run the analysis in the manner that was configured at build time.
///
/// Takes as parameters the events to be analyzed, and an analysis kernel that
/// processes a batch of events and returns the accumulated results. Each batch
/// of events is handed out to exactly one kernel invocation.
///
/// Returns the finalized analysis results
///
pub fn analyze_events(
    events: &mut [Event],
    analyze_batch: impl Send + Sync + Fn(&mut [Event]) -> AnalysisAccumulator,
) -> AnalysisResults {
    // Integrate analysis results...
    let accumulator = {
        // ...in sequential mode
        #[cfg(not(feature = "multi-threading"))]
        {
            sequential::analyze_events_impl(events, EVENT_BATCH_SIZE, analyze_batch)
        }

        // ...in multi-threaded mode
        #[cfg(feature = "multi-threading")]
        {
            multi_threading::analyze_events_impl(events, EVENT_BATCH_SIZE, analyze_batch)
        }
    };

    // Finalize the results
    accumulator.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::HistogramConfig, particle::Particle};

    const HIST_CFG: HistogramConfig = HistogramConfig {
        min: 0.,
        max: 120.,
        num_bins: 120,
    };

    /// Mass computation kernel, as used by the program
    fn kernel(batch: &mut [Event]) -> AnalysisAccumulator {
        let mut acc = AnalysisAccumulator::new(&HIST_CFG);
        for event in batch {
            event.calculate_invariant_mass();
            acc.integrate(event);
        }
        acc
    }

    fn events(num_events: usize) -> Vec<Event> {
        (0..num_events)
            .map(|idx| {
                let e = 1. + (idx % 150) as crate::numeric::Float;
                let mut event = Event::new(idx as i64);
                event.add_particle(Particle::new(e / 2., 0., 0., e / 2., 1));
                event.add_particle(Particle::new(e / 2., 0., 0., -e / 2., -1));
                event
            })
            .collect()
    }

    #[test]
    fn every_event_is_analyzed_once() {
        let mut events = events(2 * EVENT_BATCH_SIZE + 123);
        let results = analyze_events(&mut events, kernel);
        assert_eq!(results.num_events, events.len() as u64);
        assert_eq!(results.histogram.entries(), events.len() as u64);
        assert!(events.iter().all(|event| event.invariant_mass() > 0.));
    }

    #[test]
    fn batching_does_not_change_results() {
        let mut batched = events(EVENT_BATCH_SIZE + 77);
        let results = analyze_events(&mut batched, kernel);

        let mut single = events(EVENT_BATCH_SIZE + 77);
        let expected = kernel(&mut single[..]).finalize();
        assert_eq!(results.num_events, expected.num_events);
        assert_eq!(results.histogram, expected.histogram);
        assert_eq!(results.candidates, expected.candidates);
        assert_eq!(batched, single);
    }

    #[test]
    fn no_events() {
        let results = analyze_events(&mut [], kernel);
        assert_eq!(results.num_events, 0);
    }
}
