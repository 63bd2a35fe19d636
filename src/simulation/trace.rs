//! Recorded uniform-draw streams
//!
//! A trace file holds one floating-point value per line and replaces the
//! pseudorandom source for deterministic runs. Values are consumed strictly
//! in order, one per draw, with no resampling.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use log::error;

use super::variate::UniformSource;

/// Sequential reader over a recorded stream of uniform values
///
/// The first unreadable line (EOF, blank, or non-numeric) exhausts the
/// stream permanently; every draw after that falls back to 0.0 with a
/// diagnostic, and the run keeps going.
#[derive(Debug)]
pub struct TraceStream<R> {
    reader: R,
    values_read: usize,
    exhausted: bool,
}

impl TraceStream<BufReader<File>> {
    /// Open a trace file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Could not open trace file {}", path.as_ref().display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> TraceStream<R> {
    /// Wrap any buffered reader as a trace stream
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            values_read: 0,
            exhausted: false,
        }
    }

    /// Number of values successfully read so far
    pub fn values_read(&self) -> usize {
        self.values_read
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn next_value(&mut self) -> Option<f64> {
        if self.exhausted {
            return None;
        }

        let mut line = String::new();
        let value = match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => line.trim().parse::<f64>().ok(),
            Err(_) => None,
        };

        match value {
            Some(v) => {
                self.values_read += 1;
                Some(v)
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }
}

impl<R: BufRead> UniformSource for TraceStream<R> {
    fn draw(&mut self) -> f64 {
        match self.next_value() {
            Some(v) => v,
            None => {
                error!(
                    "Trace stream exhausted after {} values; substituting 0.0",
                    self.values_read
                );
                0.0
            }
        }
    }
}
