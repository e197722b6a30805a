//! Command-line driver of the dimuon event analysis
//!
//! Usage: `dimuon [CONFIG_FILE]`, where the configuration file defaults to
//! `dimuon.cfg` in the working directory.

use dimuon::{
    analysis::AnalysisAccumulator,
    config::Configuration,
    output::{self, EventDisplay},
    scheduling, Event, EventRepository, Result,
};

use eyre::WrapErr;

use std::time::Instant;

/// Configuration file used when none is specified
const DEFAULT_CONFIG_FILE: &str = "dimuon.cfg";

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // ### CONFIGURATION READOUT ###

    let config_file = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_owned());
    let cfg = Configuration::load(&config_file).wrap_err("Failed to load the configuration")?;

    // ### DATA LOADING ###

    // Malformed input is reported here, before any computation starts
    let mut repository = EventRepository::load(&cfg.data_file, cfg.max_events)
        .wrap_err_with(|| format!("Failed to load events from {}", cfg.data_file.display()))?;

    // NOTE: We start the clock after I/O, to avoid IO-induced timing fluctuations
    let saved_time = Instant::now();

    // ### ANALYSIS EXECUTION ###

    // This kernel computes the invariant mass of a batch of events, and
    // returns the accumulated intermediary results
    let analyze_batch = |batch: &mut [Event]| -> AnalysisAccumulator {
        let mut accumulator = AnalysisAccumulator::new(&cfg.histogram);
        for event in batch {
            event.calculate_invariant_mass();
            accumulator.integrate(event);
        }
        accumulator
    };

    // Run the analysis
    let results = scheduling::analyze_events(repository.events_mut(), analyze_batch);
    log::info!("Analyzed {} events", results.num_events);
    if results.clamped_masses > 0 {
        log::warn!(
            "{} events have inconsistent 4-momenta (E² < |p|²), their mass was set to zero",
            results.clamped_masses
        );
    }

    // ### TRACK RECONSTRUCTION ###

    // Propagation failures are logged, the analysis results are still stored
    let display = EventDisplay::select(repository.events(), cfg.display_event, &cfg.tracking);

    // ### RESULTS DISPLAY AND STORAGE ###

    // Measure how much time has elapsed
    let elapsed_time = saved_time.elapsed();

    // Send the results to the standard output and to disk and we're done
    output::dump_results(&cfg, &results, display.as_ref(), elapsed_time)
        .wrap_err("Failed to output the results")?;
    Ok(())
}
