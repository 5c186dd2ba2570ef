//! Sinks for the concentration trajectory emitted by [`Vessel::run`](crate::engine::Vessel::run).

use crate::counts::Concentrations;
use crate::molecule::Registry;
use itertools::Itertools;
use std::io::{self, Write};
use std::ops::ControlFlow;

/// Receives concentration snapshots, in increasing step order.
///
/// Returning [`ControlFlow::Break`] stops the run after this emission.
pub trait Observer {
    fn observe(&mut self, step: u64, concentrations: &Concentrations) -> ControlFlow<()>;
}
impl<F: FnMut(u64, &Concentrations) -> ControlFlow<()>> Observer for F {
    fn observe(&mut self, step: u64, concentrations: &Concentrations) -> ControlFlow<()> {
        self(step, concentrations)
    }
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Discard;
impl Observer for Discard {
    fn observe(&mut self, _step: u64, _concentrations: &Concentrations) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// A single emitted snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub step: u64,
    pub concentrations: Concentrations,
}

/// Records every emission in memory.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Trajectory {
    samples: Vec<Sample>,
}
impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    /// Steps at which a snapshot was emitted
    pub fn steps(&self) -> impl Iterator<Item = u64> + '_ {
        self.samples.iter().map(|s| s.step)
    }
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}
impl Observer for Trajectory {
    fn observe(&mut self, step: u64, concentrations: &Concentrations) -> ControlFlow<()> {
        self.samples.push(Sample {
            step,
            concentrations: concentrations.clone(),
        });
        ControlFlow::Continue(())
    }
}

/// Writes each emission as a CSV row: the step, then one percentage per molecule type in
/// declaration order. The header row is written before the first emission.
///
/// An I/O error halts the run; it can be retrieved with [`take_error`](Self::take_error).
#[derive(Debug)]
pub struct CsvWriter<W> {
    out: W,
    names: Vec<String>,
    header_written: bool,
    error: Option<io::Error>,
}
impl<W: Write> CsvWriter<W> {
    pub fn new(out: W, registry: &Registry) -> Self {
        Self {
            out,
            names: registry.names().map(str::to_string).collect(),
            header_written: false,
            error: None,
        }
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_row(&mut self, step: u64, concentrations: &Concentrations) -> io::Result<()> {
        if !self.header_written {
            writeln!(self.out, "step,{}", self.names.iter().join(","))?;
            self.header_written = true;
        }
        writeln!(
            self.out,
            "{step},{}",
            concentrations.values().iter().join(",")
        )
    }
}
impl<W: Write> Observer for CsvWriter<W> {
    fn observe(&mut self, step: u64, concentrations: &Concentrations) -> ControlFlow<()> {
        match self.write_row(step, concentrations) {
            Ok(()) => ControlFlow::Continue(()),
            Err(err) => {
                tracing::error!(step, "failed to write trajectory: {err}");
                self.error = Some(err);
                ControlFlow::Break(())
            }
        }
    }
}
