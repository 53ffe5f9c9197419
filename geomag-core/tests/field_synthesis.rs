//! End-to-end checks of the synthesis pipeline: epoch interpolation,
//! coordinate handling and the assembled field vector.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use geomag_core::{
    Advisory, CoordinateSystem, FieldEstimate, GaussCoefficients, GeomagneticModel, ModelConfig,
};

/// Reference radius the coefficients are expressed against (km).
const REFERENCE_RADIUS_KM: f64 = 6371.2;

/// Dipole-only table for the 1900 epoch with its true coefficients.
fn epoch_1900_model() -> GeomagneticModel {
    let table = GaussCoefficients::parse(
        "# dipole terms of the 1900 epoch\n\
         c/s deg ord IGRF SV\n\
         g/h n m 1900.0 1900-05\n\
         g 1 0 -31543.0 10.0\n\
         g 1 1 -2298.0 0.0\n\
         h 1 1 5922.0 0.0\n",
    )
    .unwrap();
    GeomagneticModel::new(table)
}

/// Dipole table spanning two epochs plus the secular-variation column.
fn two_epoch_model() -> GeomagneticModel {
    let table = GaussCoefficients::parse(
        "g/h n m 1990.0 1995.0 1995-00\n\
         g 1 0 -29775.0 -29692.0 17.6\n\
         g 1 1 -1848.0 -1784.0 13.0\n\
         h 1 1 5406.0 5306.0 -18.3\n",
    )
    .unwrap();
    GeomagneticModel::new(table)
}

fn intensity(estimate: &FieldEstimate) -> f64 {
    estimate.field.f
}

mod closed_form {
    use super::*;

    /// Querying the exact epoch on the equator at the reference radius
    /// reduces to the n=1 terms alone, with hand-computable Legendre values.
    #[test]
    fn equatorial_dipole_components() {
        let estimate = epoch_1900_model()
            .field(
                1900.0,
                0.0,
                0.0,
                REFERENCE_RADIUS_KM,
                CoordinateSystem::Geocentric,
            )
            .unwrap();
        let field = estimate.field;
        assert_relative_eq!(field.x, 31543.0, max_relative = 1e-12);
        assert_relative_eq!(field.y, -5922.0, max_relative = 1e-12);
        assert_relative_eq!(field.z, 4596.0, max_relative = 1e-12);
        assert_relative_eq!(
            field.f,
            (field.x * field.x + field.y * field.y + field.z * field.z).sqrt(),
            max_relative = 1e-12
        );
    }

    /// Extrapolation applies the secular-variation rate per elapsed year.
    #[test]
    fn secular_variation_advances_the_axial_term() {
        let estimate = epoch_1900_model()
            .field(
                1903.0,
                0.0,
                0.0,
                REFERENCE_RADIUS_KM,
                CoordinateSystem::Geocentric,
            )
            .unwrap();
        // g(1,0) moves from -31543 by +10 nT/year for three years; on the
        // equator the x component is its negation.
        assert_relative_eq!(estimate.field.x, 31513.0, max_relative = 1e-12);
    }
}

mod continuity {
    use super::*;

    #[test]
    fn field_varies_continuously_inside_a_window() {
        let model = two_epoch_model();
        let base = model
            .field(1992.0, 40.0, 30.0, 0.0, CoordinateSystem::Geodetic)
            .unwrap();
        let mut last_delta = f64::INFINITY;
        for exponent in 1..=6 {
            let nearby_year = 1992.0 + 10f64.powi(-exponent);
            let nearby = model
                .field(nearby_year, 40.0, 30.0, 0.0, CoordinateSystem::Geodetic)
                .unwrap();
            let delta = (intensity(&nearby) - intensity(&base)).abs();
            assert!(delta < last_delta || delta == 0.0);
            last_delta = delta;
        }
        assert!(last_delta < 1e-2);
    }

    #[test]
    fn field_is_continuous_across_the_window_boundary() {
        let model = two_epoch_model();
        let approaching = model
            .field(1994.999_999, 55.0, 44.0, 0.0, CoordinateSystem::Geodetic)
            .unwrap();
        let at_epoch = model
            .field(1995.0, 55.0, 44.0, 0.0, CoordinateSystem::Geodetic)
            .unwrap();
        // Interpolation weight reaching one hands over to the next window's
        // weight zero.
        assert_abs_diff_eq!(
            intensity(&approaching),
            intensity(&at_epoch),
            epsilon = 1e-3
        );
    }
}

mod coordinates {
    use super::*;

    #[test]
    fn geodetic_back_rotation_preserves_the_intensity_relation() {
        let estimate = two_epoch_model()
            .field(1993.25, -37.8, 145.0, 0.55, CoordinateSystem::Geodetic)
            .unwrap();
        let field = estimate.field;
        assert_relative_eq!(
            field.f * field.f,
            field.x * field.x + field.y * field.y + field.z * field.z,
            max_relative = 1e-6
        );
    }

    #[test]
    fn poles_produce_finite_components() {
        let model = two_epoch_model();
        for latitude in [90.0, -90.0] {
            let estimate = model
                .field(1992.0, latitude, 17.0, 0.0, CoordinateSystem::Geodetic)
                .unwrap();
            assert!(estimate.field.x.is_finite());
            assert!(estimate.field.y.is_finite());
            assert!(estimate.field.z.is_finite());
            assert!(estimate.field.f.is_finite());
        }
    }
}

mod degree_truncation {
    use super::*;

    /// Table whose first 120 rows (every degree-10 coefficient) are zero and
    /// whose only signal sits at degree 11.
    fn high_degree_only_model() -> GeomagneticModel {
        let mut text = String::from("g/h n m 1990.0 1995.0 1995-00\n");
        for n in 1..=10u8 {
            for m in 0..=n {
                text.push_str(&format!("g {n} {m} 0.0 0.0 0.0\n"));
                if m > 0 {
                    text.push_str(&format!("h {n} {m} 0.0 0.0 0.0\n"));
                }
            }
        }
        text.push_str("g 11 0 40000.0 40000.0 0.0\n");
        GeomagneticModel::new(GaussCoefficients::parse(&text).unwrap())
    }

    #[test]
    fn degree_eleven_is_invisible_before_the_threshold() {
        let model = high_degree_only_model();
        let before = model
            .field(1994.9, 20.0, 20.0, 0.0, CoordinateSystem::Geodetic)
            .unwrap();
        assert_abs_diff_eq!(intensity(&before), 0.0, epsilon = 1e-12);

        let after = model
            .field(1995.0, 20.0, 20.0, 0.0, CoordinateSystem::Geodetic)
            .unwrap();
        assert!(intensity(&after) > 1.0);
    }
}

mod advisories {
    use super::*;

    #[test]
    fn definitive_interpolation_carries_no_advisory() {
        let table = GaussCoefficients::parse(
            "g/h n m 1945.0 1950.0 1950-55\n\
             g 1 0 -30594.0 -30554.0 10.0\n",
        )
        .unwrap();
        let estimate = GeomagneticModel::new(table)
            .field(1947.5, 10.0, 10.0, 0.0, CoordinateSystem::Geodetic)
            .unwrap();
        assert_eq!(estimate.advisory, None);
    }

    #[test]
    fn extrapolation_past_the_horizon_is_flagged_not_failed() {
        let estimate = two_epoch_model()
            .field(2004.0, 10.0, 10.0, 0.0, CoordinateSystem::Geodetic)
            .unwrap();
        assert_eq!(estimate.advisory, Some(Advisory::BeyondValidatedSpan));
        assert!(estimate.field.f.is_finite());
    }
}

mod loading {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn unique_temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("geomag-{}-{}", std::process::id(), name));
        path
    }

    #[test]
    fn model_loads_through_the_configured_primary_path() {
        let path = unique_temp_path("coeffs.txt");
        fs::write(
            &path,
            "g/h n m 1900.0 1900-05\n\
             g 1 0 -31543.0 0.0\n",
        )
        .unwrap();

        let config = ModelConfig {
            coefficient_file: Some(path.clone()),
        };
        let model = GeomagneticModel::load(&config).unwrap();
        let estimate = model
            .field(1900.0, 0.0, 0.0, 0.0, CoordinateSystem::Geodetic)
            .unwrap();
        assert!(estimate.field.f > 0.0);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_sources_fail_with_every_candidate_listed() {
        let config = ModelConfig {
            coefficient_file: Some(PathBuf::from("/nonexistent/geomag/coeffs.txt")),
        };
        let err = GeomagneticModel::load(&config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("/nonexistent/geomag/coeffs.txt"));
    }
}
