//! Synthesis of geomagnetic field values from epoch-indexed spherical
//! harmonic coefficient tables.
//!
//! The crate is organised as a pipeline of small components sharing one
//! immutable coefficient table:
//!
//! - [`coefficients`] parses the `g/h`-headed coefficient file into a table
//!   keyed by (epoch, degree, order)
//! - [`window`] resolves a decimal year into a bracketing epoch pair,
//!   interpolation weights and the truncation degree in force
//! - [`coordinates`] rotates geodetic queries into the geocentric frame the
//!   synthesis runs in, keeping the dip rotation for the way back
//! - [`synthesis`] runs the Schmidt quasi-normalised Legendre recurrence and
//!   accumulates the geocentric field components
//! - [`field`] rotates the result back and derives total intensity,
//!   declination and the other field elements
//!
//! [`model::GeomagneticModel`] ties the stages together behind a
//! degrees-in/nanotesla-out query surface.

pub mod coefficients;
pub mod config;
pub mod coordinates;
pub mod errors;
pub mod field;
pub mod model;
pub mod synthesis;
pub mod window;

pub use coefficients::GaussCoefficients;
pub use config::ModelConfig;
pub use coordinates::CoordinateSystem;
pub use errors::{GeomagError, GeomagResult};
pub use field::{FieldEstimate, FieldVector};
pub use model::{GeomagneticModel, Observation};
pub use window::{Advisory, EpochWindow};

/// Floating point type used throughout the crate.
pub type FloatValue = f64;

/// Fractional calendar year, e.g. `2011.37`.
pub type DecimalYear = f64;
