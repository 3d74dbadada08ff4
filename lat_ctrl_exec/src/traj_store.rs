//! # Trajectory store
//!
//! Holds a recorded set of driver inputs indexed by time, so that a run can be
//! replayed. The recording is a headerless CSV table with four columns:
//!
//! ```text
//! # time_s, throttle, braking, steering
//! 0.0, 0.0, 0.0, 0.0
//! 10.0, 1.0, 0.0, 0.5
//! ```
//!
//! Lines starting with `#` are ignored, as are any columns after the fourth.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use std::path::{Path, PathBuf};

// Internal
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of columns required in each row of a recording.
pub const NUM_COLUMNS: usize = 4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single row of a recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectorySample {
    /// Time since the start of the recording.
    ///
    /// Units: seconds
    pub time_s: f64,

    pub throttle: f64,

    pub braking: f64,

    pub steering: f64,
}

/// Driver inputs interpolated from a recording at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RecordedInputs {
    pub throttle: f64,
    pub braking: f64,
    pub steering: f64,
}

/// A recording of driver inputs, ordered by strictly increasing time.
#[derive(Debug, Clone)]
pub struct TrajStore {
    samples: Vec<TrajectorySample>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Ways in which a recording can be malformed.
#[derive(Debug, thiserror::Error)]
pub enum TrajStoreError {
    #[error("Could not open the trajectory file {0:?}: {1}")]
    FileOpenError(PathBuf, std::io::Error),

    #[error("Could not read the trajectory file: {0}")]
    ReadError(csv::Error),

    #[error("The trajectory file contains no samples")]
    Empty,

    #[error("Row on line {line} has {found} columns, expected at least 4")]
    TooFewColumns { line: u64, found: usize },

    #[error("Row on line {line}, column {column} is not a finite number: {value:?}")]
    NonNumeric {
        line: u64,
        column: usize,
        value: String,
    },

    #[error(
        "Sample {index} has time {time_s} s which does not follow the previous time of {prev_s} s"
    )]
    NonMonotonicTime {
        index: usize,
        time_s: f64,
        prev_s: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajStore {
    /// Load a recording from the given file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TrajStoreError> {
        let path = path.as_ref();

        let file = std::fs::File::open(path)
            .map_err(|e| TrajStoreError::FileOpenError(path.to_path_buf(), e))?;

        Self::from_reader(file)
    }

    /// Parse a recording from any reader.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, TrajStoreError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut samples = Vec::new();
        let mut record = StringRecord::new();

        while rdr
            .read_record(&mut record)
            .map_err(TrajStoreError::ReadError)?
        {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            samples.push(parse_row(&record, line)?);
        }

        Self::from_samples(samples)
    }

    /// Build a store from samples already in memory.
    ///
    /// The samples must be non-empty with strictly increasing times.
    pub fn from_samples(samples: Vec<TrajectorySample>) -> Result<Self, TrajStoreError> {
        if samples.is_empty() {
            return Err(TrajStoreError::Empty);
        }

        for (i, pair) in samples.windows(2).enumerate() {
            if !(pair[1].time_s > pair[0].time_s) {
                return Err(TrajStoreError::NonMonotonicTime {
                    index: i + 1,
                    time_s: pair[1].time_s,
                    prev_s: pair[0].time_s,
                });
            }
        }

        Ok(Self { samples })
    }

    /// Get the recorded inputs at the given time since the start of the
    /// recording.
    ///
    /// Each input is linearly interpolated between the two samples either
    /// side of `elapsed_s`. Outside the recording the first or last sample is
    /// returned as is. Returns `None` if `elapsed_s` is not finite.
    pub fn lookup(&self, elapsed_s: f64) -> Option<RecordedInputs> {
        if !elapsed_s.is_finite() {
            return None;
        }

        // Can't fail, the store is never empty
        let first = self.samples.first()?;
        let last = self.samples.last()?;

        if elapsed_s <= first.time_s {
            return Some(first.inputs());
        }
        if elapsed_s >= last.time_s {
            return Some(last.inputs());
        }

        // Index of the first sample after elapsed_s, which is always in
        // 1..len since we're strictly inside the recording
        let upper = self.samples.partition_point(|s| s.time_s <= elapsed_s);
        let s0 = &self.samples[upper - 1];
        let s1 = &self.samples[upper];
        let time_range = (s0.time_s, s1.time_s);

        Some(RecordedInputs {
            throttle: lin_map(time_range, (s0.throttle, s1.throttle), elapsed_s),
            braking: lin_map(time_range, (s0.braking, s1.braking), elapsed_s),
            steering: lin_map(time_range, (s0.steering, s1.steering), elapsed_s),
        })
    }

    /// Number of samples in the recording.
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    /// Time of the last sample.
    pub fn duration_s(&self) -> f64 {
        self.samples.last().map(|s| s.time_s).unwrap_or(0.0)
    }
}

impl TrajectorySample {
    fn inputs(&self) -> RecordedInputs {
        RecordedInputs {
            throttle: self.throttle,
            braking: self.braking,
            steering: self.steering,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn parse_row(record: &StringRecord, line: u64) -> Result<TrajectorySample, TrajStoreError> {
    if record.len() < NUM_COLUMNS {
        return Err(TrajStoreError::TooFewColumns {
            line,
            found: record.len(),
        });
    }

    let mut vals = [0f64; NUM_COLUMNS];
    for (column, val) in vals.iter_mut().enumerate() {
        let field = &record[column];
        *val = match field.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                return Err(TrajStoreError::NonNumeric {
                    line,
                    column,
                    value: field.to_string(),
                })
            }
        };
    }

    Ok(TrajectorySample {
        time_s: vals[0],
        throttle: vals[1],
        braking: vals[2],
        steering: vals[3],
    })
}
