//! Sequential back-end of the analysis

use crate::{analysis::AnalysisAccumulator, event::Event};

/// Analyze events in sequential mode
///
/// We use batched logic even in sequential mode, in order to achieve
/// reproducibility with respect to multi-threaded runs.
///
pub fn analyze_events_impl(
    events: &mut [Event],
    batch_size: usize,
    analyze_batch: impl Send + Sync + Fn(&mut [Event]) -> AnalysisAccumulator,
) -> AnalysisAccumulator {
    assert!(batch_size > 0, "Batches must contain at least one event");
    log::debug!("Analyzing {} events sequentially", events.len());

    // Initialize the accumulator with the first batch of events (which may
    // be empty), then integrate the other batches in order
    let first_batch_size = batch_size.min(events.len());
    let (first_batch, other_batches) = events.split_at_mut(first_batch_size);
    let mut accumulator = analyze_batch(first_batch);
    for batch in other_batches.chunks_mut(batch_size) {
        accumulator.merge(analyze_batch(batch));
    }

    // Return the final accumulated results
    accumulator
}
