//! This module is in charge of outputting the final analysis results to the
//! standard output and various files

use crate::{
    analysis::AnalysisResults,
    config::{Configuration, TrackingConfig},
    error::PhysicsError,
    event::Event,
    momentum::{X, Y, Z},
    numeric::{floats, Float},
    resonance::{self, Classification},
    trajectory::Trajectory,
};

use prefix_num_ops::real::*;
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

use std::{
    fs::File,
    io::{BufWriter, Result, Write},
    time::Duration,
};

/// Number of significant digits in file output
const SIG_DIGITS: usize = (floats::DIGITS - 1) as usize;

/// Timestamp format of the timing file
const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!(
    "[day]-[month repr:short]-[year repr:last_two]   [hour]:[minute]:[second]"
);

/// Width of the longest bar of the textual mass spectrum
const SPECTRUM_WIDTH: usize = 50;

/// Event selected for display, with its reconstructed tracks
pub struct EventDisplay<'event> {
    /// Displayed event, whose invariant mass has been computed
    pub event: &'event Event,

    /// Resonance candidate for this event
    pub classification: Classification,

    /// Path of each particle inside the detector
    pub tracks: Vec<Trajectory>,
}
//
impl<'event> EventDisplay<'event> {
    /// Propagate the particles of an event inside of the detector
    pub fn new(
        event: &'event Event,
        tracking: &TrackingConfig,
    ) -> std::result::Result<Self, PhysicsError> {
        let tracks = event
            .particles()
            .iter()
            .map(|particle| {
                particle.propagate_within(
                    tracking.b_field,
                    tracking.time_step,
                    tracking.max_steps,
                    &tracking.detector,
                )
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            event,
            classification: resonance::classify(event.invariant_mass()),
            tracks,
        })
    }

    /// Pick the event to be displayed among the analyzed ones
    ///
    /// Display is secondary to the mass analysis: a missing event or a track
    /// which cannot be propagated is logged, and no event gets displayed.
    pub fn select(
        events: &'event [Event],
        index: usize,
        tracking: &TrackingConfig,
    ) -> Option<Self> {
        let Some(event) = events.get(index) else {
            log::warn!(
                "Cannot display event {}, only {} events were loaded",
                index,
                events.len()
            );
            return None;
        };
        match Self::new(event, tracking) {
            Ok(display) => Some(display),
            Err(e) => {
                log::error!("Failed to propagate the tracks of event #{}: {}", event.id(), e);
                None
            }
        }
    }

    /// Print out the analysis of the displayed event
    fn print(&self) {
        let res = self.classification.resonance;
        println!("Event #{} analysis", self.event.id());
        println!("  Invariant mass   : {:.4} GeV", self.event.invariant_mass());
        println!("  Likely candidate : {}", res.label());
        println!("  Confidence       : {}", self.classification.confidence.label());
        println!("  Significance     : {}", res.description());
        let particles = self.event.particles().iter();
        for (idx, (particle, track)) in particles.zip(&self.tracks).enumerate() {
            let exit = track.end_state().position;
            println!(
                "  Muon {} (E={:.1} GeV, Q={:+}): {} points, last at ({:.3}, {:.3}, {:.3}) m",
                idx + 1,
                particle.energy(),
                particle.charge(),
                track.len(),
                exit[X],
                exit[Y],
                exit[Z],
            );
        }
    }
}

/// Output the analysis results to the console and to disk
pub fn dump_results(
    cfg: &Configuration,
    results: &AnalysisResults,
    display: Option<&EventDisplay>,
    elapsed_time: Duration,
) -> Result<()> {
    // Print out some final results on stdout
    print_summary(results);
    if let Some(display) = display {
        display.print();
    }

    // Compute a timestamp of when the run ended
    let timestamp = OffsetDateTime::now_utc()
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| String::from("???"));

    // Write execution timings to a file
    {
        let mut tim_file = BufWriter::new(File::create("res.times")?);
        writeln_kv(&mut tim_file, &timestamp[..])?;
        writeln_kv(&mut tim_file, "---------------------------------------------")?;
        let elapsed_secs = elapsed_time.as_secs_f64() as Float;
        writeln_kv(&mut tim_file, ("Elapsed time (s)", elapsed_secs))?;
        let secs_per_ev = elapsed_secs / (results.num_events.max(1) as Float);
        writeln_kv(&mut tim_file, ("Elapsed time per event (s)", secs_per_ev))?;
        tim_file.flush()?;
    }

    // Write main results file
    {
        let mut dat_file = BufWriter::new(File::create("res.data")?);
        write_results(&mut dat_file, cfg, results)?;
        dat_file.flush()?;
    }

    // Write the tracks of the displayed event, for external plotting
    if let Some(display) = display {
        let mut trk_file = BufWriter::new(File::create("res.tracks")?);
        write_tracks(&mut trk_file, &display.tracks)?;
        trk_file.flush()?;
    }

    // ...and we're done
    Ok(())
}

/// Print the main results on stdout
fn print_summary(results: &AnalysisResults) {
    println!("---------------------------------------------");
    println!("Analyzed events        : {}", results.num_events);
    println!("Mean invariant mass    : {:.4} GeV", results.mean_mass);
    println!("Inconsistent momenta   : {}", results.clamped_masses);
    for (res, counts) in &results.candidates {
        println!(
            "{:<22} : {} ({} strong, {:.2}%)",
            res.label(),
            counts.total,
            counts.strong,
            100. * results.fraction(*res),
        );
    }
    if let Some((low_edge, count)) = results.histogram.peak_bin() {
        println!(
            "Most populated bin     : [{}, {}[ GeV, {} events",
            low_edge,
            low_edge + results.histogram.bin_width(),
            count
        );
    }
    println!("---------------------------------------------");
    print_spectrum(results);
}

/// Draw the mass spectrum with text bars, skipping empty bins
fn print_spectrum(results: &AnalysisResults) {
    let hist = &results.histogram;
    let max_count = hist.counts().iter().copied().max().unwrap_or(0);
    if max_count == 0 {
        return;
    }
    println!("Mass spectrum (GeV)");
    for (low_edge, &count) in hist.bin_edges().zip(hist.counts()) {
        if count == 0 {
            continue;
        }
        let (count_sz, max_sz) = (count as usize, max_count as usize);
        let bar_len = (count_sz * SPECTRUM_WIDTH + max_sz - 1) / max_sz;
        println!("{:>8.2} | {} {}", low_edge, "#".repeat(bar_len), count);
    }
}

/// Write down the configuration and analysis results
fn write_results(
    file: &mut impl Write,
    cfg: &Configuration,
    results: &AnalysisResults,
) -> Result<()> {
    let tracking = &cfg.tracking;
    writeln_kv(file, ("Data file", &cfg.data_file.display().to_string()[..]))?;
    writeln_kv(file, ("Maximal number of events", cfg.max_events))?;
    writeln_kv(file, ("Number of events", results.num_events))?;
    writeln_kv(file, ("Magnetic field (T)", tracking.b_field))?;
    writeln_kv(file, ("Detector radius (m)", tracking.detector.radius))?;
    writeln_kv(file, ("Detector half-length (m)", tracking.detector.half_length))?;
    writeln_kv(file, "---------------------------------------------")?;
    writeln_kv(file, ("Mean invariant mass (GeV)", results.mean_mass))?;
    writeln_kv(file, ("Inconsistent 4-momenta", results.clamped_masses))?;
    for (res, counts) in &results.candidates {
        writeln_kv(file, (res.label(), counts.total))?;
        writeln_kv(file, ("... close to the peak", counts.strong))?;
    }
    writeln_kv(file, "---------------------------------------------")?;

    // Histogram, one line per bin
    let hist = &results.histogram;
    writeln!(file)?;
    writeln!(file, "{:>14}{:>14}{:>10}", "low (GeV)", "high (GeV)", "count")?;
    let edges = hist.bin_edges().collect::<Vec<_>>();
    for (bounds, count) in edges.windows(2).zip(hist.counts()) {
        write_engineering_padded(file, bounds[0], 14)?;
        write_engineering_padded(file, bounds[1], 14)?;
        writeln!(file, "{:>10}", count)?;
    }
    writeln!(file, "{:>28}{:>10}", "underflow", hist.underflow())?;
    writeln!(file, "{:>28}{:>10}", "overflow", hist.overflow())
}

/// Write down track points, one per line, as "track x y z"
fn write_tracks(file: &mut impl Write, tracks: &[Trajectory]) -> Result<()> {
    for (idx, track) in tracks.iter().enumerate() {
        for point in track.points() {
            write!(file, "{}", idx + 1)?;
            for coord in [X, Y, Z] {
                write!(file, " ")?;
                write_engineering(file, point[coord], SIG_DIGITS)?;
            }
            writeln!(file)?;
        }
    }
    Ok(())
}

/// Text output facility for key-value results files
fn writeln_kv(file: &mut impl Write, data: impl WriteKv) -> Result<()> {
    write!(file, " ")?;
    data.write(file)?;
    writeln!(file)
}

/// Trait implemented by things which can be printed in results files
trait WriteKv: Sized {
    /// Write down `self` to the output file
    fn write(self, file: &mut impl Write) -> Result<()>;
}

impl WriteKv for &str {
    // Strings work in the usual way
    fn write(self, file: &mut impl Write) -> Result<()> {
        write!(file, "{}", self)
    }
}

impl WriteKv for usize {
    // Integers work in the usual way too
    fn write(self, file: &mut impl Write) -> Result<()> {
        write!(file, "{}", self)
    }
}

impl WriteKv for u64 {
    fn write(self, file: &mut impl Write) -> Result<()> {
        write!(file, "{}", self)
    }
}

impl WriteKv for Float {
    // Close to the %g format of C's printf
    fn write(self, file: &mut impl Write) -> Result<()> {
        write_engineering(file, self, SIG_DIGITS)
    }
}

impl<T: WriteKv> WriteKv for (&str, T) {
    // Key-value output that uses fixed-size columns for better readability
    fn write(self, file: &mut impl Write) -> Result<()> {
        write!(file, "{:<31}: ", self.0)?;
        self.1.write(file)
    }
}

/// Right-align a number written in engineering notation
fn write_engineering_padded(writer: &mut impl Write, x: Float, width: usize) -> Result<()> {
    let mut buffer = Vec::new();
    write_engineering(&mut buffer, x, SIG_DIGITS.min(6))?;
    let text = String::from_utf8_lossy(&buffer);
    write!(writer, "{:>width$}", text, width = width)
}

/// Write a floating-point number using "engineering" notation
///
/// Analogous to the %g format of the C printf function, this method switches
/// between naive and scientific notation for floating-point numbers when the
/// number being printed becomes so small that printing leading zeroes could end
/// up larger than the scientific notation, or so large that we would be forced
/// to print more significant digits than requested.
///
fn write_engineering(writer: &mut impl Write, x: Float, sig_digits: usize) -> Result<()> {
    let precision = sig_digits - 1;
    if x == 0. {
        // Zero is special because you can't take its log
        return write!(writer, "0");
    }
    if !x.is_finite() {
        return write!(writer, "{}", x);
    }

    // Otherwise, use log to evaluate order of magnitude
    let log_x = abs(x).log10();
    if log_x >= -3. && log_x < (sig_digits as Float) {
        // Since Rust's precision controls number of digits after the decimal
        // point, we must adjust it depending on magnitude in order to operate
        // at a constant number of significant digits. Numbers smaller than 1
        // get one extra digit since the leading zero is not significant.
        let magnitude = log_x.floor() as isize;
        let decimals = (precision as isize - magnitude).max(0) as usize;

        // People don't normally expect trailing zeros or decimal point in
        // naive notation, but be careful with integer numbers...
        let str_with_zeros = format!("{:.1$}", x, decimals);
        if str_with_zeros.contains('.') {
            write!(
                writer,
                "{}",
                str_with_zeros.trim_end_matches('0').trim_end_matches('.')
            )
        } else {
            write!(writer, "{}", str_with_zeros)
        }
    } else {
        // Print using scientific notation
        write!(writer, "{:.1$e}", x, precision)
    }
}
