//! Multi-threaded back-end of the analysis

use crate::{analysis::AnalysisAccumulator, event::Event};

use rayon::prelude::*;

/// Analyze events in multi-threaded mode
///
/// Each batch of events is exclusively borrowed by one task, so no
/// synchronization is needed on the events themselves. Batch results are
/// collected in batch order and merged sequentially, which makes the results
/// identical to those of a sequential run.
///
pub fn analyze_events_impl(
    events: &mut [Event],
    batch_size: usize,
    analyze_batch: impl Send + Sync + Fn(&mut [Event]) -> AnalysisAccumulator,
) -> AnalysisAccumulator {
    assert!(batch_size > 0, "Batches must contain at least one event");

    // An empty event list still gets analyzed, as an empty batch
    if events.is_empty() {
        return analyze_batch(events);
    }
    log::debug!(
        "Analyzing {} events in {} parallel batches",
        events.len(),
        (events.len() + batch_size - 1) / batch_size
    );

    // Indexed parallel iterators keep the batch order upon collection
    let batch_results = events
        .par_chunks_mut(batch_size)
        .map(|batch| analyze_batch(batch))
        .collect::<Vec<_>>();

    // Merge in batch order, starting from the first batch
    let mut batch_results = batch_results.into_iter();
    let mut accumulator = batch_results
        .next()
        .expect("A non-empty event list has at least one batch");
    for result in batch_results {
        accumulator.merge(result);
    }
    accumulator
}
