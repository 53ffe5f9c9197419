//! Assembly of the final field vector and its derived elements.

use crate::coordinates::GeocentricPosition;
use crate::window::Advisory;
use crate::FloatValue;
use serde::{Deserialize, Serialize};

/// Magnetic field vector at a point, nanotesla.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldVector {
    /// North component.
    pub x: FloatValue,
    /// East component.
    pub y: FloatValue,
    /// Vertical component, positive down.
    pub z: FloatValue,
    /// Total intensity.
    pub f: FloatValue,
}

impl FieldVector {
    /// Rotate geocentric components back into the frame the query was
    /// expressed in, using the dip pair stored on `position`, and close the
    /// vector with its total intensity.
    pub fn assemble(
        x: FloatValue,
        y: FloatValue,
        z: FloatValue,
        position: &GeocentricPosition,
    ) -> Self {
        let (x, z) = position.rotate_field(x, z);
        let f = (x * x + y * y + z * z).sqrt();
        Self { x, y, z, f }
    }

    /// Declination: the angle between magnetic and true north, signed
    /// degrees (east positive).
    pub fn declination_deg(&self) -> FloatValue {
        self.y.atan2(self.x).to_degrees()
    }

    /// Declination wrapped onto [0, 360).
    pub fn declination_deg_positive(&self) -> FloatValue {
        let d = self.declination_deg();
        if d < 0.0 {
            d + 360.0
        } else {
            d
        }
    }

    /// Horizontal intensity, nanotesla.
    pub fn horizontal_intensity(&self) -> FloatValue {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Inclination: the dip of the field below the horizontal plane, signed
    /// degrees (down positive).
    pub fn inclination_deg(&self) -> FloatValue {
        self.z.atan2(self.horizontal_intensity()).to_degrees()
    }
}

/// A synthesised field vector together with any advisory qualification of
/// the result (see [`Advisory`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldEstimate {
    pub field: FieldVector,
    pub advisory: Option<Advisory>,
}

/// Split decimal degrees into whole degrees and rounded minutes, keeping the
/// sign on the degree part; the minutes carry it only when the degree part
/// is zero.
pub fn to_degrees_minutes(deg: FloatValue) -> (i32, i32) {
    let sign = if deg < 0.0 { -1 } else { 1 };
    let magnitude = deg.abs();
    let whole = sign * magnitude.trunc() as i32;
    let mut minutes = (60.0 * magnitude.fract() + 0.5).floor() as i32;
    if whole == 0 {
        minutes *= sign;
    }
    (whole, minutes)
}
