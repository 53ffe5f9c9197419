//! Spherical harmonic synthesis of the geocentric field components.
//!
//! One pass over the expansion terms builds the Schmidt quasi-normalised
//! associated Legendre values `p` and their colatitude-derivative analogue
//! `q` by recurrence, while accumulating the north, east and down components
//! from the epoch-interpolated Gauss coefficients. The arrays are one-based
//! to match the recurrence's index arithmetic; slot 0 stays unused.
//!
//! Terms are visited in the order (1,0), (1,1), (2,0), (2,1), (2,2), ...;
//! the bookkeeping that walks degree and order along that sequence lives in
//! [`TermIndex`] as a pure step so it can be checked in isolation, instead
//! of mutating loop counters in place the way the legacy code did.

use crate::coefficients::GaussCoefficients;
use crate::coordinates::GeocentricPosition;
use crate::window::EpochWindow;
use crate::FloatValue;
use ndarray::Array1;

/// Reference radius of the coefficient expansion (km). Not the mean Earth
/// radius: 6371.2 km is the value the coefficients were determined against.
pub const REFERENCE_RADIUS_KM: FloatValue = 6371.2;

/// Degree/order bookkeeping for one expansion term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TermIndex {
    /// One-based slot in the scratch arrays, 2..=kmx.
    k: usize,
    /// Current degree.
    n: u8,
    /// Current order; runs one past the degree before rolling over.
    m: u8,
}

impl TermIndex {
    fn first() -> Self {
        Self { k: 2, n: 0, m: 1 }
    }

    /// Settle the slot onto the degree/order it belongs to, reporting
    /// whether a new degree was entered.
    fn resolve(self) -> (Self, bool) {
        if self.m > self.n {
            (
                Self {
                    k: self.k,
                    n: self.n + 1,
                    m: 0,
                },
                true,
            )
        } else {
            (self, false)
        }
    }

    /// Move to the next slot.
    fn next(self) -> Self {
        Self {
            k: self.k + 1,
            n: self.n,
            m: self.m + 1,
        }
    }
}

/// Synthesise the geocentric field components (north, east, down) in
/// nanotesla for one query.
///
/// Every invocation allocates its own scratch arrays; the coefficient table
/// is only read, so concurrent queries need no locking.
pub fn synthesize(
    table: &GaussCoefficients,
    window: &EpochWindow,
    position: &GeocentricPosition,
    longitude_rad: FloatValue,
) -> (FloatValue, FloatValue, FloatValue) {
    let kmx = window.kmx;
    let ct = position.cos_colat;
    let st = position.sin_colat;
    let lower = window.lower_epoch;
    let upper = window.upper_epoch();

    let mut p = Array1::<FloatValue>::zeros(kmx + 1);
    let mut q = Array1::<FloatValue>::zeros(kmx + 1);
    let mut cl = Array1::<FloatValue>::zeros(window.nmx as usize + 1);
    let mut sl = Array1::<FloatValue>::zeros(window.nmx as usize + 1);

    p[1] = 1.0;
    p[3] = st;
    q[1] = 0.0;
    q[3] = ct;
    cl[1] = longitude_rad.cos();
    sl[1] = longitude_rad.sin();

    let ratio = REFERENCE_RADIUS_KM / position.radius_km;
    // (ratio)^(n + 2); advanced together with the degree.
    let mut rr = ratio * ratio;

    let (mut x, mut y, mut z) = (0.0, 0.0, 0.0);
    let mut index = TermIndex::first();

    while index.k <= kmx {
        let (resolved, new_degree) = index.resolve();
        index = resolved;
        if new_degree {
            rr *= ratio;
        }
        let (k, n, m) = (index.k, index.n, index.m);
        let nf = n as FloatValue;
        let mf = m as FloatValue;

        if m == n {
            // Sectoral seed, built from the previous degree's sectoral term.
            // Slot 3 was seeded directly.
            if k != 3 {
                let norm = (1.0 - 0.5 / mf).sqrt();
                let j = k - n as usize - 1;
                p[k] = norm * st * p[j];
                q[k] = norm * (st * q[j] + ct * p[j]);
                let mu = m as usize;
                cl[mu] = cl[mu - 1] * cl[1] - sl[mu - 1] * sl[1];
                sl[mu] = sl[mu - 1] * cl[1] + cl[mu - 1] * sl[1];
            }
        } else {
            // Three-term recurrence over the two previous degrees at the
            // same order.
            let m2 = mf * mf;
            let root = (nf * nf - m2).sqrt();
            let w_prev = (((nf - 1.0) * (nf - 1.0)) - m2).sqrt() / root;
            let w_cos = (2.0 * nf - 1.0) / root;
            let i = k - n as usize;
            let j = i - n as usize + 1;
            p[k] = w_cos * ct * p[i] - w_prev * p[j];
            q[k] = w_cos * (ct * q[i] - st * p[i]) - w_prev * q[j];
        }

        let gc = (window.tc * table.g(lower, n, m) + window.t * table.g(upper, n, m)) * rr;
        if m != 0 {
            let hc = (window.tc * table.h(lower, n, m) + window.t * table.h(upper, n, m)) * rr;
            let mu = m as usize;
            let along = gc * cl[mu] + hc * sl[mu];
            x += along * q[k];
            z -= (nf + 1.0) * along * p[k];
            let east = gc * sl[mu] - hc * cl[mu];
            if st != 0.0 {
                y += east * mf * p[k] / st;
            } else {
                // At the poles sin(colat) vanishes and m*p/sin(colat) is
                // 0/0; its limit is q*cos(colat).
                y += east * q[k] * ct;
            }
        } else {
            x += gc * q[k];
            z -= (nf + 1.0) * gc * p[k];
        }

        index = index.next();
    }

    (x, y, z)
}
