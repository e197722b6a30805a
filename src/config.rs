//! Mechanism for loading and sharing the analysis configuration

use crate::{numeric::Float, trajectory::DetectorVolume, Result};

use eyre::{ensure, eyre, WrapErr};

use std::{fs::File, io::Read, path::PathBuf, str::FromStr};

/// Binning of the invariant mass histogram
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistogramConfig {
    /// Lower edge (GeV)
    pub min: Float,

    /// Upper edge (GeV)
    pub max: Float,

    /// Number of bins
    pub num_bins: usize,
}

/// Parameters of track propagation through the detector
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackingConfig {
    /// Axial magnetic field (Tesla)
    pub b_field: Float,

    /// Integration time step
    pub time_step: Float,

    /// Maximal number of recorded points per track
    pub max_steps: usize,

    /// Volume outside of which tracks are not followed
    pub detector: DetectorVolume,
}

/// Analysis configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Tabulated dimuon events (CSV)
    pub data_file: PathBuf,

    /// Maximal number of events to be loaded
    pub max_events: usize,

    /// Track propagation parameters
    pub tracking: TrackingConfig,

    /// Invariant mass histogram binning
    pub histogram: HistogramConfig,

    /// Index of the event whose tracks are propagated
    pub display_event: usize,
}
//
impl Configuration {
    /// Load the configuration from a file, check it, and print it out
    pub fn load(file_name: &str) -> Result<Self> {
        // Read out the analysis' configuration file or die trying.
        let config_str = {
            let mut config_file = File::open(file_name)
                .wrap_err_with(|| format!("Could not open configuration file {file_name}"))?;
            let mut buffer = String::new();
            config_file.read_to_string(&mut buffer)?;
            buffer
        };

        let config = Self::parse(&config_str)?;

        // Display it so that it appears alongside the results
        config.print();
        Ok(config)
    }

    /// Decode and check the contents of a configuration file
    pub fn parse(config_str: &str) -> Result<Self> {
        // We will iterate over the configuration items, which should be the
        // first non-whitespace chunk of text on each line. Blank lines are
        // ignored, and the rest of each line may be used for comments.
        let mut config_iter = config_str
            .lines()
            .filter_map(|line| line.split_whitespace().next());

        // This closure fetches the next configuration item, tagging it with
        // the name of the configuration field which it is supposed to fill to
        // ease error reporting, and handling unexpected end-of-file too.
        let mut next_item = |name: &'static str| -> Result<ConfigItem> {
            config_iter
                .next()
                .map(|data| ConfigItem::new(name, data))
                .ok_or_else(|| eyre!("Missing configuration of {}", name))
        };

        // Decode the configuration items into concrete values
        let config = Configuration {
            data_file: next_item("data_file")?.parse::<PathBuf>()?,
            max_events: next_item("max_events")?.parse::<usize>()?,
            tracking: TrackingConfig {
                b_field: next_item("b_field")?.parse::<Float>()?,
                time_step: next_item("time_step")?.parse::<Float>()?,
                max_steps: next_item("max_steps")?.parse::<usize>()?,
                detector: DetectorVolume::new(
                    next_item("detector_radius")?.parse::<Float>()?,
                    next_item("detector_half_length")?.parse::<Float>()?,
                ),
            },
            histogram: HistogramConfig {
                min: next_item("hist_min")?.parse::<Float>()?,
                max: next_item("hist_max")?.parse::<Float>()?,
                num_bins: next_item("hist_bins")?.parse::<usize>()?,
            },
            display_event: next_item("display_event")?.parse::<usize>()?,
        };

        // A sensible analysis must look at at least one event
        ensure!(config.max_events > 0, "Please analyze at least one event");

        // Propagation is only meaningful forward in time, in a real detector
        let tracking = &config.tracking;
        ensure!(
            tracking.time_step > 0.,
            "The integration time step must be positive"
        );
        ensure!(
            tracking.detector.radius > 0. && tracking.detector.half_length > 0.,
            "The detector dimensions must be positive"
        );

        // Histogram binning must make sense
        let histogram = &config.histogram;
        ensure!(
            histogram.min < histogram.max,
            "The histogram range must not be empty"
        );
        ensure!(
            histogram.num_bins > 0,
            "The histogram must have at least one bin"
        );

        // If nothing bad occured, we can now return the configuration
        Ok(config)
    }

    /// Display the configuration
    pub fn print(&self) {
        println!("DATA FILE      : {}", self.data_file.display());
        println!("MAX EVENTS     : {}", self.max_events);
        println!("B FIELD   (T)  : {}", self.tracking.b_field);
        println!("TIME STEP      : {}", self.tracking.time_step);
        println!("MAX STEPS      : {}", self.tracking.max_steps);
        println!("RADIUS    (m)  : {}", self.tracking.detector.radius);
        println!("HALF LEN. (m)  : {}", self.tracking.detector.half_length);
        println!("HIST MIN (GeV) : {}", self.histogram.min);
        println!("HIST MAX (GeV) : {}", self.histogram.max);
        println!("HIST BINS      : {}", self.histogram.num_bins);
        println!("DISPLAY EVENT  : {}", self.display_event);
    }
}

/// A value from the configuration file, tagged with the struct field which it
/// is supposed to map for error reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a struct field tag and raw iterator data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        self.data
            .parse::<T>()
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }
}
