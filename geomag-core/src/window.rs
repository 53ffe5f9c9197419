//! Epoch window selection.
//!
//! A query date resolves to a bracketing pair of coefficient epochs, the
//! interpolation weights between them and the truncation degree in force.
//! Dates at or past the last tabulated epoch switch to extrapolation: full
//! weight on the last epoch, with the trailing secular-variation rates
//! scaled by the years elapsed since it.

use crate::coefficients::{
    GaussCoefficients, EPOCH_STEP, HIGH_DEGREE, HIGH_DEGREE_EPOCH, LOW_DEGREE,
};
use crate::errors::{GeomagError, GeomagResult};
use crate::{DecimalYear, FloatValue};
use log::warn;
use serde::{Deserialize, Serialize};

/// First epoch of the definitive span for this model generation; earlier
/// windows are provisional.
const DEFINITIVE_FIRST: i32 = 1945;

/// Last epoch of the definitive span.
const DEFINITIVE_LAST: i32 = 2005;

/// Non-fatal qualification attached to a synthesis result. Callers may
/// ignore it; the numbers are still returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advisory {
    /// The bracketing model epoch is provisional rather than definitive.
    NonDefinitiveEpoch,
    /// The query date lies past the span validated for extrapolation (one
    /// epoch step beyond the last tabulated epoch).
    BeyondValidatedSpan,
}

/// Interpolation window and truncation parameters in force for one query
/// date. Derived per query and discarded; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochWindow {
    /// Lower bracketing epoch. Coefficients are read at this year and at the
    /// slot one [`EPOCH_STEP`] above it.
    pub lower_epoch: i32,
    /// Weight on the upper coefficient set: the fractional position inside
    /// the window when interpolating, or the years elapsed past
    /// `lower_epoch` when extrapolating (the upper set then holds per-year
    /// rates).
    pub t: FloatValue,
    /// Weight on the lower coefficient set: `1 - t` when interpolating,
    /// `1.0` when extrapolating.
    pub tc: FloatValue,
    /// Truncation degree in force for the query date.
    pub nmx: u8,
    /// Number of recurrence terms, `(nmx + 1)(nmx + 2) / 2`.
    pub kmx: usize,
}

impl EpochWindow {
    /// Resolve `date` against the table's epoch grid.
    ///
    /// Fails with [`GeomagError::DateBeforeFirstEpoch`] when the date
    /// precedes everything the table covers; arbitrarily late dates are
    /// accepted (see [`EpochWindow::advisory`]).
    pub fn select(table: &GaussCoefficients, date: DecimalYear) -> GeomagResult<Self> {
        let first = table.first_epoch();
        if date < first as FloatValue {
            return Err(GeomagError::DateBeforeFirstEpoch {
                date,
                first_epoch: first,
            });
        }

        let last = table.last_epoch();
        if date >= last as FloatValue {
            // Extrapolate: the secular-variation rates carry the last epoch
            // forward linearly, one year per unit of t.
            let nmx = degree_in_force(last as FloatValue);
            return Ok(Self {
                lower_epoch: last,
                t: date - last as FloatValue,
                tc: 1.0,
                nmx,
                kmx: term_count(nmx),
            });
        }

        let span = date - first as FloatValue;
        let steps = (span / EPOCH_STEP as FloatValue).floor();
        let t = span / EPOCH_STEP as FloatValue - steps;
        let nmx = degree_in_force(date);
        Ok(Self {
            lower_epoch: first + EPOCH_STEP * steps as i32,
            t,
            tc: 1.0 - t,
            nmx,
            kmx: term_count(nmx),
        })
    }

    /// Upper coefficient slot: the next tabulated epoch, or the
    /// secular-variation slot when extrapolating.
    pub fn upper_epoch(&self) -> i32 {
        self.lower_epoch + EPOCH_STEP
    }

    /// `true` when the window extends past the last tabulated epoch.
    pub fn is_extrapolating(&self, table: &GaussCoefficients) -> bool {
        self.lower_epoch == table.last_epoch()
    }

    /// Classify the result quality for `date`. Advisory only: the synthesis
    /// still runs and its numbers are returned unchanged.
    pub fn advisory(&self, table: &GaussCoefficients, date: DecimalYear) -> Option<Advisory> {
        let horizon = (table.last_epoch() + EPOCH_STEP) as FloatValue;
        if date > horizon {
            warn!("date {date} is beyond the validated span ending {horizon}");
            return Some(Advisory::BeyondValidatedSpan);
        }
        // Secular-variation projections are provisional by construction, as
        // are windows bracketed by a provisional epoch.
        if self.is_extrapolating(table)
            || self.lower_epoch < DEFINITIVE_FIRST
            || self.lower_epoch > DEFINITIVE_LAST
        {
            warn!("model values for {date} are non-definitive");
            return Some(Advisory::NonDefinitiveEpoch);
        }
        None
    }
}

/// Truncation degree for a date: degree 10 before the threshold epoch,
/// degree 13 from it onwards.
fn degree_in_force(date: DecimalYear) -> u8 {
    if date < HIGH_DEGREE_EPOCH as FloatValue {
        LOW_DEGREE
    } else {
        HIGH_DEGREE
    }
}

fn term_count(nmx: u8) -> usize {
    (nmx as usize + 1) * (nmx as usize + 2) / 2
}
