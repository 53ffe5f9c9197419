//! Geodetic and geocentric coordinate handling.
//!
//! Field synthesis runs on a sphere. A geodetic query (latitude and altitude
//! relative to the WGS84 ellipsoid) is first rotated into the geocentric
//! frame; the rotation's dip-angle sine/cosine pair is kept on the resulting
//! position so the synthesised vector can be rotated back with exactly the
//! values the forward conversion produced.

use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// WGS84 semi-major axis squared (km²).
const WGS84_A2: FloatValue = 40_680_631.6;

/// WGS84 semi-minor axis squared (km²).
const WGS84_B2: FloatValue = 40_408_296.0;

/// Reference frame a query position is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// Ellipsoidal: latitude and altitude above the WGS84 spheroid.
    Geodetic,
    /// Spherical: latitude and distance from the Earth's centre.
    Geocentric,
}

/// A query point resolved into the geocentric frame, carrying the dip
/// rotation needed to express the synthesised field back in the query frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocentricPosition {
    /// Distance from the Earth's centre (km).
    pub radius_km: FloatValue,
    /// Cosine of the geocentric colatitude.
    pub cos_colat: FloatValue,
    /// Sine of the geocentric colatitude.
    pub sin_colat: FloatValue,
    /// Cosine of the dip angle between the frames; 1 for geocentric input.
    cd: FloatValue,
    /// Sine of the dip angle; 0 for geocentric input.
    sd: FloatValue,
}

impl GeocentricPosition {
    /// Resolve a position expressed in `system` into the geocentric frame.
    /// `altitude_or_radius_km` is an altitude above the ellipsoid for
    /// geodetic input and a geocentric radius otherwise.
    pub fn resolve(
        system: CoordinateSystem,
        latitude_rad: FloatValue,
        altitude_or_radius_km: FloatValue,
    ) -> Self {
        match system {
            CoordinateSystem::Geodetic => Self::from_geodetic(latitude_rad, altitude_or_radius_km),
            CoordinateSystem::Geocentric => {
                Self::from_geocentric(latitude_rad, altitude_or_radius_km)
            }
        }
    }

    /// Convert a WGS84 geodetic position to the geocentric frame.
    pub fn from_geodetic(latitude_rad: FloatValue, altitude_km: FloatValue) -> Self {
        let colat = FRAC_PI_2 - latitude_rad;
        let ct = colat.cos();
        let st = colat.sin();

        let a2_st2 = WGS84_A2 * st * st;
        let b2_ct2 = WGS84_B2 * ct * ct;
        let denom = a2_st2 + b2_ct2;
        let rho = denom.sqrt();
        let radius_km = (altitude_km * (altitude_km + 2.0 * rho)
            + (WGS84_A2 * a2_st2 + WGS84_B2 * b2_ct2) / denom)
            .sqrt();
        let cd = (altitude_km + rho) / radius_km;
        let sd = (WGS84_A2 - WGS84_B2) / rho * ct * st / radius_km;

        // Rotate the colatitude by the dip angle.
        let (cos_colat, sin_colat) = (ct * cd - st * sd, st * cd + ct * sd);
        Self {
            radius_km,
            cos_colat,
            sin_colat,
            cd,
            sd,
        }
    }

    /// Take an already-geocentric position as is; the dip rotation is the
    /// identity.
    pub fn from_geocentric(latitude_rad: FloatValue, radius_km: FloatValue) -> Self {
        let colat = FRAC_PI_2 - latitude_rad;
        Self {
            radius_km,
            cos_colat: colat.cos(),
            sin_colat: colat.sin(),
            cd: 1.0,
            sd: 0.0,
        }
    }

    /// Rotate a synthesised (north, down) component pair back into the frame
    /// the query was expressed in, using the same dip pair the forward
    /// conversion produced.
    pub fn rotate_field(&self, x: FloatValue, z: FloatValue) -> (FloatValue, FloatValue) {
        (x * self.cd + z * self.sd, z * self.cd - x * self.sd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn geocentric_input_passes_through() {
        let position = GeocentricPosition::from_geocentric(0.0, 6371.2);
        assert!(is_close!(position.radius_km, 6371.2));
        assert!(is_close!(position.sin_colat, 1.0));
        assert!(is_close!(position.cos_colat, 0.0, abs_tol = 1e-12));
        let (x, z) = position.rotate_field(3.0, 4.0);
        assert!(is_close!(x, 3.0));
        assert!(is_close!(z, 4.0));
    }

    #[test]
    fn geodetic_equator_radius_is_semi_major_axis() {
        let position = GeocentricPosition::from_geodetic(0.0, 0.0);
        assert!(is_close!(position.radius_km, WGS84_A2.sqrt(), rel_tol = 1e-9));
        // On the equator the normals of sphere and ellipsoid coincide.
        assert!(is_close!(position.sin_colat, 1.0));
        let (x, z) = position.rotate_field(1.0, 1.0);
        assert!(is_close!(x, 1.0));
        assert!(is_close!(z, 1.0));
    }

    #[test]
    fn geodetic_pole_is_numerically_stable() {
        let position = GeocentricPosition::from_geodetic(FRAC_PI_2, 0.0);
        assert!(is_close!(position.radius_km, WGS84_B2.sqrt(), rel_tol = 1e-9));
        assert!(is_close!(position.sin_colat, 0.0, abs_tol = 1e-12));
        assert!(position.radius_km.is_finite());
    }

    #[test]
    fn rotation_preserves_magnitude() {
        let position = GeocentricPosition::from_geodetic(0.9, 1.2);
        let (x0, z0) = (17400.0, -51000.0);
        let (x, z) = position.rotate_field(x0, z0);
        assert!(is_close!(
            x * x + z * z,
            x0 * x0 + z0 * z0,
            rel_tol = 1e-12
        ));
    }

    #[test]
    fn mid_latitude_dip_rotates_colatitude() {
        // Geocentric latitude is smaller in magnitude than geodetic latitude
        // everywhere off the equator and poles.
        let latitude = 45f64.to_radians();
        let position = GeocentricPosition::from_geodetic(latitude, 0.0);
        let geocentric_lat = position.cos_colat.asin();
        assert!(geocentric_lat < latitude);
        assert!(geocentric_lat > latitude - 0.01);
    }
}
