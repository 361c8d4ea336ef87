//! Position along the dataset's time dimension.

use chrono::{DateTime, Utc};
use roms_dataset::{TimeAxis, TimeUnits};
use tracing::debug;

use crate::error::{BmiError, BmiResult};

/// Current time step plus the fixed time geometry of the dataset.
///
/// `step` always satisfies `step < total`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeCursor {
    step: usize,
    total: usize,
    step_size: f64,
    start: f64,
    end: f64,
    units: String,
    calendar: String,
}

impl TimeCursor {
    /// Cursor at step 0. The step size is the gap between the first two
    /// coordinates (0 for a single step).
    pub fn from_axis(axis: &TimeAxis) -> BmiResult<Self> {
        let (start, end) = match (axis.values.first(), axis.values.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => {
                return Err(BmiError::IncompatibleFormat(format!(
                    "time dimension {} has no coordinates",
                    axis.dimension
                )))
            }
        };
        let step_size = match axis.values.get(1) {
            Some(&second) => second - start,
            None => 0.0,
        };

        Ok(Self {
            step: 0,
            total: axis.values.len(),
            step_size,
            start,
            end,
            units: axis.units.clone(),
            calendar: axis.calendar.clone(),
        })
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn calendar(&self) -> &str {
        &self.calendar
    }

    pub fn current_time(&self) -> f64 {
        self.start + self.step as f64 * self.step_size
    }

    /// Current time as a UTC datetime, when the units follow
    /// `<unit> since <epoch>` and the result is representable.
    pub fn current_datetime(&self) -> Option<DateTime<Utc>> {
        TimeUnits::parse(&self.units).and_then(|units| units.to_datetime(self.current_time()))
    }

    /// Move one step forward.
    ///
    /// A single-step dataset never moves. On the last step of a longer
    /// one this fails with `EndOfData` and leaves the cursor alone.
    pub fn advance(&mut self) -> BmiResult<()> {
        if self.total <= 1 {
            return Ok(());
        }
        if self.step + 1 >= self.total {
            return Err(BmiError::EndOfData {
                step: self.step,
                total: self.total,
            });
        }
        self.step += 1;
        debug!(step = self.step, time = self.current_time(), "Advanced time step");
        Ok(())
    }

    /// Advance until the current time reaches `target` or the last step.
    /// Returns the number of steps taken.
    pub fn advance_until(&mut self, target: f64) -> usize {
        let mut taken = 0;
        while self.current_time() < target && self.step + 1 < self.total {
            self.step += 1;
            taken += 1;
        }
        taken
    }
}
