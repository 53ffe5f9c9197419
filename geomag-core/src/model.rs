//! Query surface over an immutable coefficient table.
//!
//! [`GeomagneticModel`] owns the table produced by the loader and threads
//! one query through window selection, coordinate resolution, harmonic
//! synthesis and assembly. The table is never mutated after loading, so a
//! model can be shared freely across threads; each query allocates its own
//! scratch space.

use crate::coefficients::GaussCoefficients;
use crate::config::ModelConfig;
use crate::coordinates::{CoordinateSystem, GeocentricPosition};
use crate::errors::GeomagResult;
use crate::field::{FieldEstimate, FieldVector};
use crate::synthesis;
use crate::window::EpochWindow;
use crate::{DecimalYear, FloatValue};

/// An observation request in the units the synthesis runs on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub decimal_year: DecimalYear,
    pub latitude_rad: FloatValue,
    pub longitude_rad: FloatValue,
    /// Altitude above the ellipsoid (geodetic) or distance from the Earth's
    /// centre (geocentric), km.
    pub altitude_or_radius_km: FloatValue,
    pub system: CoordinateSystem,
}

/// Geomagnetic model bound to one immutable coefficient table.
#[derive(Debug, Clone)]
pub struct GeomagneticModel {
    coefficients: GaussCoefficients,
}

impl GeomagneticModel {
    /// Wrap an already-loaded coefficient table.
    pub fn new(coefficients: GaussCoefficients) -> Self {
        Self { coefficients }
    }

    /// Load the coefficient table named by `config`, falling back through
    /// the installation-relative search order.
    pub fn load(config: &ModelConfig) -> GeomagResult<Self> {
        GaussCoefficients::discover(config.coefficient_file.as_deref()).map(Self::new)
    }

    pub fn coefficients(&self) -> &GaussCoefficients {
        &self.coefficients
    }

    /// Field vector at a point: degrees and kilometres in, nanotesla out.
    ///
    /// `altitude_km` is height above the WGS84 ellipsoid for
    /// [`CoordinateSystem::Geodetic`] queries and the geocentric radius for
    /// [`CoordinateSystem::Geocentric`] ones.
    pub fn field(
        &self,
        decimal_year: DecimalYear,
        latitude_deg: FloatValue,
        longitude_deg: FloatValue,
        altitude_km: FloatValue,
        system: CoordinateSystem,
    ) -> GeomagResult<FieldEstimate> {
        self.observe(&Observation {
            decimal_year,
            latitude_rad: latitude_deg.to_radians(),
            longitude_rad: longitude_deg.to_radians(),
            altitude_or_radius_km: altitude_km,
            system,
        })
    }

    /// Field vector for a fully specified observation.
    pub fn observe(&self, observation: &Observation) -> GeomagResult<FieldEstimate> {
        let window = EpochWindow::select(&self.coefficients, observation.decimal_year)?;
        let position = GeocentricPosition::resolve(
            observation.system,
            observation.latitude_rad,
            observation.altitude_or_radius_km,
        );
        let (x, y, z) = synthesis::synthesize(
            &self.coefficients,
            &window,
            &position,
            observation.longitude_rad,
        );
        let field = FieldVector::assemble(x, y, z, &position);
        let advisory = window.advisory(&self.coefficients, observation.decimal_year);
        Ok(FieldEstimate { field, advisory })
    }

    /// Declination at sea level in signed degrees, east positive.
    pub fn declination(
        &self,
        decimal_year: DecimalYear,
        latitude_deg: FloatValue,
        longitude_deg: FloatValue,
    ) -> GeomagResult<FloatValue> {
        let estimate = self.field(
            decimal_year,
            latitude_deg,
            longitude_deg,
            0.0,
            CoordinateSystem::Geodetic,
        )?;
        Ok(estimate.field.declination_deg())
    }
}
