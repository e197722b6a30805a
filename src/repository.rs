//! Mechanism for turning tabulated dimuon data into events
//!
//! The expected input is a CSV table with a header line, such as the CMS
//! open data `Dimuon_DoubleMu.csv` sample. Columns are located by name, and
//! columns which are not needed for event reconstruction (run number, pT, η,
//! φ...) are ignored.

use crate::{error::RepositoryError, event::Event, numeric::Float, particle::Particle};

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

/// Number of columns needed to build an event
const NUM_COLUMNS: usize = 11;

/// Names of the needed columns, in the order of `EventRow`
const COLUMN_NAMES: [&str; NUM_COLUMNS] = [
    "Event", "E1", "px1", "py1", "pz1", "Q1", "E2", "px2", "py2", "pz2", "Q2",
];

/// Kinematics of one muon, as tabulated
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleRow {
    /// Energy (GeV)
    pub e: Float,
    /// Momentum along X (GeV)
    pub px: Float,
    /// Momentum along Y (GeV)
    pub py: Float,
    /// Momentum along Z (GeV)
    pub pz: Float,
    /// Electric charge
    pub charge: i32,
}
//
impl From<ParticleRow> for Particle {
    fn from(row: ParticleRow) -> Self {
        Particle::new(row.e, row.px, row.py, row.pz, row.charge)
    }
}

/// One tabulated dimuon event
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventRow {
    /// Event number
    pub event_id: i64,
    /// Kinematics of the two muons
    pub particles: [ParticleRow; 2],
}
//
impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        let mut event = Event::new(row.event_id);
        for particle in row.particles {
            event.add_particle(particle.into());
        }
        event
    }
}

/// Location of the needed columns in the input table
struct ColumnLayout {
    /// Index of each needed column, in `COLUMN_NAMES` order
    indices: [usize; NUM_COLUMNS],

    /// Total number of columns in the table
    num_fields: usize,
}
//
impl ColumnLayout {
    /// Locate the needed columns from the header line
    fn from_header(header: &str) -> Result<Self, RepositoryError> {
        let names = header
            .trim_start_matches('\u{feff}')
            .split(',')
            .map(str::trim)
            .collect::<Vec<_>>();
        let mut indices = [0; NUM_COLUMNS];
        for (index, &column) in indices.iter_mut().zip(COLUMN_NAMES.iter()) {
            *index = names
                .iter()
                .position(|&name| name == column)
                .ok_or(RepositoryError::MissingColumn(column))?;
        }
        Ok(Self {
            indices,
            num_fields: names.len(),
        })
    }

    /// Decode one data line (`line_no` is 1-based, for error reporting)
    fn parse_row(&self, line_no: usize, line: &str) -> Result<EventRow, RepositoryError> {
        let fields = line.split(',').map(str::trim).collect::<Vec<_>>();
        if fields.len() != self.num_fields {
            return Err(RepositoryError::FieldCount {
                line: line_no,
                expected: self.num_fields,
                got: fields.len(),
            });
        }

        // Fetch a needed column by position in COLUMN_NAMES and parse it
        let field = |column: usize| RowItem {
            line: line_no,
            column: COLUMN_NAMES[column],
            data: fields[self.indices[column]],
        };
        let particle = |first_column: usize| -> Result<ParticleRow, RepositoryError> {
            Ok(ParticleRow {
                e: field(first_column).parse()?,
                px: field(first_column + 1).parse()?,
                py: field(first_column + 2).parse()?,
                pz: field(first_column + 3).parse()?,
                charge: field(first_column + 4).parse()?,
            })
        };
        Ok(EventRow {
            event_id: field(0).parse()?,
            particles: [particle(1)?, particle(6)?],
        })
    }
}

/// A field of the input table, tagged with its location for error reporting
struct RowItem<'data> {
    line: usize,
    column: &'static str,
    data: &'data str,
}
//
impl<'data> RowItem<'data> {
    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T, RepositoryError> {
        self.data.parse::<T>().map_err(|_| RepositoryError::Parse {
            line: self.line,
            column: self.column,
            value: self.data.to_owned(),
        })
    }
}

/// Decode up to `max_rows` event rows from CSV data
///
/// Blank lines are skipped. The first malformed row aborts decoding.
pub fn read_rows(
    reader: impl BufRead,
    max_rows: usize,
) -> Result<Vec<EventRow>, RepositoryError> {
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(idx, line)| line.map(|line| (idx + 1, line)))
        .filter(|line| !matches!(line, Ok((_, text)) if text.trim().is_empty()));

    let (_, header) = lines.next().ok_or(RepositoryError::MissingHeader)??;
    let layout = ColumnLayout::from_header(&header)?;

    let mut rows = Vec::new();
    for line in lines.take(max_rows) {
        let (line_no, text) = line?;
        rows.push(layout.parse_row(line_no, &text)?);
    }
    Ok(rows)
}

/// Collection of the events of a dataset
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventRepository {
    events: Vec<Event>,
}
//
impl EventRepository {
    /// Load up to `max_rows` events from a CSV file
    pub fn load(path: impl AsRef<Path>, max_rows: usize) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        log::info!("Parsing up to {} events from {}", max_rows, path.display());
        let file = File::open(path)?;
        let repository = Self::from_reader(BufReader::new(file), max_rows)?;
        log::info!("Loaded {} events", repository.len());
        Ok(repository)
    }

    /// Load up to `max_rows` events from CSV data
    pub fn from_reader(reader: impl BufRead, max_rows: usize) -> Result<Self, RepositoryError> {
        let rows = read_rows(reader, max_rows)?;
        if rows.len() == max_rows {
            log::debug!("Row limit of {} reached, remaining rows are ignored", max_rows);
        }
        Ok(Self::from_rows(rows))
    }

    /// Build events from already decoded rows
    pub fn from_rows(rows: impl IntoIterator<Item = EventRow>) -> Self {
        Self {
            events: rows.into_iter().map(Event::from).collect(),
        }
    }

    /// Events, in input order
    pub fn events(&self) -> &[Event] {
        &self.events[..]
    }

    /// Mutable access to the events, e.g. to compute their masses
    pub fn events_mut(&mut self) -> &mut [Event] {
        &mut self.events[..]
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Truth that there is no event
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Extract the events
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}
