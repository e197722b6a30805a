//! Error types of the physics core and of the event repository

use crate::numeric::Float;

use thiserror::Error;

/// Failures of physics computations on undefined arithmetic
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum PhysicsError {
    /// Propagation divides momenta by the particle energy, which must
    /// thus be finite and nonzero
    #[error("Cannot propagate a particle with energy {energy} GeV")]
    InvalidEnergy {
        /// Energy of the particle (GeV)
        energy: Float,
    },
}

/// Failures to turn tabulated data into events
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The data source could not be read
    #[error("I/O error while reading event data")]
    Io(#[from] std::io::Error),

    /// The data source is empty
    #[error("Event data has no header line")]
    MissingHeader,

    /// A needed column is absent from the header
    #[error("Event data has no column named {0}")]
    MissingColumn(&'static str),

    /// A row does not have as many fields as the header
    #[error("Line {line}: expected {expected} fields, got {got}")]
    FieldCount {
        /// Line number, starting at 1
        line: usize,
        /// Number of columns in the header
        expected: usize,
        /// Number of fields in the row
        got: usize,
    },

    /// A field is not a valid number
    #[error("Line {line}: could not parse {column} from {value:?}")]
    Parse {
        /// Line number, starting at 1
        line: usize,
        /// Column name
        column: &'static str,
        /// Faulty field
        value: String,
    },
}
