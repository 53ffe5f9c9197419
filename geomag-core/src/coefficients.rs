//! Epoch-indexed storage of Gauss coefficients.
//!
//! The coefficient file is plain text: a block of `#` comment lines, a few
//! header lines of which the last starts with the literal token `g/h`, then
//! one data row per (degree, order) pair and coefficient kind:
//!
//! ```text
//! # 12th Generation International Geomagnetic Reference Field ...
//! c/s deg ord IGRF   IGRF   ...  DGRF    IGRF    SV
//! g/h n   m   1900.0 1905.0 ...  2005.0  2010.0  2010-15
//! g   1   0   -31543 -31464 ...  -29554.63 -29496.5 11.4
//! h   1   1     5922   5909 ...   -2594.50  -2396.6 -26.3
//! ```
//!
//! The trailing column holds the secular-variation rates (nT/year) that
//! extend the last full epoch; it is stored under the epoch slot one step
//! past the last tabulated year. Historical epochs are truncated at degree
//! 10, so values from data rows past the first 120 are withheld from epochs
//! before the degree-change threshold, reproducing the truncation the
//! original distribution applied.
//!
//! The legacy distribution kept everything in one flat, one-based array
//! indexed by accumulated offsets; here each value is keyed directly by
//! (epoch, degree, order) so the truncation rule is explicit data rather
//! than array-length arithmetic.

use crate::errors::{GeomagError, GeomagResult};
use crate::FloatValue;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Spacing of tabulated epochs in years.
pub const EPOCH_STEP: i32 = 5;

/// First epoch tabulated to degree 13; earlier epochs stop at degree 10.
pub const HIGH_DEGREE_EPOCH: i32 = 1995;

/// Truncation degree for epochs before [`HIGH_DEGREE_EPOCH`].
pub const LOW_DEGREE: u8 = 10;

/// Truncation degree from [`HIGH_DEGREE_EPOCH`] onwards.
pub const HIGH_DEGREE: u8 = 13;

/// Number of data rows covering every coefficient of degree <= [`LOW_DEGREE`]:
/// 65 `g` rows plus 55 `h` rows.
const LOW_DEGREE_ROWS: usize = 120;

/// File name the coefficient table ships under.
pub const DEFAULT_COEFFICIENT_FILE: &str = "igrf12coeffs.txt";

/// Marker for the comment lines at the top of the file.
const COMMENT_MARKER: char = '#';

/// Token starting the header line that names the tabulated epochs.
const HEADER_TOKEN: &str = "g/h";

/// (epoch year, degree n, order m)
type CoefficientKey = (i32, u8, u8);

/// Immutable table of Gauss coefficients, keyed by (epoch, degree, order).
///
/// Loaded once and shared read-only by every query; values are nanotesla,
/// except under the secular-variation slot past the last epoch where they
/// are nanotesla per year.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussCoefficients {
    /// Fully tabulated epochs, ascending, spaced [`EPOCH_STEP`] years apart.
    epochs: Vec<i32>,
    g: HashMap<CoefficientKey, FloatValue>,
    h: HashMap<CoefficientKey, FloatValue>,
}

impl GaussCoefficients {
    /// Parse a coefficient table from file contents.
    ///
    /// Fails with [`GeomagError::MalformedCoefficients`] on a missing or
    /// malformed header, an unknown row tag, a non-numeric field or a row
    /// whose column count does not match the declared epochs. On failure
    /// nothing is retained.
    pub fn parse(text: &str) -> GeomagResult<Self> {
        let malformed = |line: usize, message: String| GeomagError::MalformedCoefficients {
            line,
            message,
        };

        let mut lines = text.lines().enumerate().peekable();

        // Leading comment block.
        while let Some((_, line)) = lines.peek() {
            if line.starts_with(COMMENT_MARKER) {
                lines.next();
            } else {
                break;
            }
        }

        // Remaining header lines; the one starting `g/h` names the epochs.
        let (header_no, header) = loop {
            match lines.next() {
                Some((no, line)) if line.starts_with(HEADER_TOKEN) => break (no, line),
                Some(_) => continue,
                None => {
                    return Err(malformed(
                        text.lines().count(),
                        format!("no `{HEADER_TOKEN}` header line found"),
                    ))
                }
            }
        };

        let fields: Vec<&str> = header.split_whitespace().collect();
        // Three label fields, at least one epoch, one secular-variation label.
        if fields.len() < 5 {
            return Err(malformed(
                header_no + 1,
                format!("header names no epochs: {header:?}"),
            ));
        }
        let mut epochs = Vec::with_capacity(fields.len() - 4);
        for field in &fields[3..fields.len() - 1] {
            let year: f64 = field.parse().map_err(|_| {
                malformed(header_no + 1, format!("epoch label {field:?} is not a year"))
            })?;
            epochs.push(year as i32);
        }
        for pair in epochs.windows(2) {
            if pair[1] - pair[0] != EPOCH_STEP {
                return Err(malformed(
                    header_no + 1,
                    format!(
                        "epochs {} and {} are not {EPOCH_STEP} years apart",
                        pair[0], pair[1]
                    ),
                ));
            }
        }
        let sv_epoch = epochs[epochs.len() - 1] + EPOCH_STEP;

        let mut g = HashMap::new();
        let mut h = HashMap::new();
        let mut row_index = 0usize;
        let mut withheld = 0usize;

        for (no, line) in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != epochs.len() + 4 {
                return Err(malformed(
                    no + 1,
                    format!(
                        "expected {} columns, found {}",
                        epochs.len() + 4,
                        fields.len()
                    ),
                ));
            }
            let n: u8 = fields[1]
                .parse()
                .map_err(|_| malformed(no + 1, format!("degree {:?} is not an integer", fields[1])))?;
            let m: u8 = fields[2]
                .parse()
                .map_err(|_| malformed(no + 1, format!("order {:?} is not an integer", fields[2])))?;
            if n == 0 || m > n {
                return Err(malformed(no + 1, format!("degree/order pair ({n}, {m}) is invalid")));
            }
            let store = match fields[0] {
                "g" => &mut g,
                "h" => &mut h,
                tag => return Err(malformed(no + 1, format!("unknown coefficient tag {tag:?}"))),
            };
            for (slot, field) in fields[3..].iter().enumerate() {
                let value: FloatValue = field.parse().map_err(|_| {
                    malformed(no + 1, format!("coefficient {field:?} is not a number"))
                })?;
                let epoch = *epochs.get(slot).unwrap_or(&sv_epoch);
                if row_index >= LOW_DEGREE_ROWS && epoch < HIGH_DEGREE_EPOCH {
                    // Historical epochs stop at degree 10.
                    withheld += 1;
                    continue;
                }
                store.insert((epoch, n, m), value);
            }
            row_index += 1;
        }

        if withheld > 0 {
            debug!("withheld {withheld} high-degree values from pre-{HIGH_DEGREE_EPOCH} epochs");
        }

        Ok(Self { epochs, g, h })
    }

    /// Load and parse the file at `path`.
    pub fn load(path: &Path) -> GeomagResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|_| GeomagError::CoefficientsUnavailable(vec![path.to_path_buf()]))?;
        let table = Self::parse(&text)?;
        info!(
            "loaded {} coefficients from {} for epochs {}..{}",
            table.g.len() + table.h.len(),
            path.display(),
            table.first_epoch(),
            table.last_epoch(),
        );
        Ok(table)
    }

    /// Load the table from the first readable location in the search order:
    /// the primary path, the same file name next to the running executable,
    /// then in the executable directory's parent.
    ///
    /// The search stops at the first successful parse; a candidate that
    /// exists but fails to parse is a hard [`GeomagError::MalformedCoefficients`].
    /// When every candidate is missing or unreadable the whole search fails
    /// with [`GeomagError::CoefficientsUnavailable`].
    pub fn discover(primary: Option<&Path>) -> GeomagResult<Self> {
        let primary = primary.unwrap_or(Path::new(DEFAULT_COEFFICIENT_FILE));
        let mut tried = Vec::new();
        for candidate in search_candidates(primary) {
            match fs::read_to_string(&candidate) {
                Ok(text) => {
                    let table = Self::parse(&text)?;
                    info!(
                        "loaded {} coefficients from {} for epochs {}..{}",
                        table.g.len() + table.h.len(),
                        candidate.display(),
                        table.first_epoch(),
                        table.last_epoch(),
                    );
                    return Ok(table);
                }
                Err(err) => {
                    warn!("coefficient file {} unreadable: {err}", candidate.display());
                    tried.push(candidate);
                }
            }
        }
        Err(GeomagError::CoefficientsUnavailable(tried))
    }

    /// Fully tabulated epochs, ascending.
    pub fn epochs(&self) -> &[i32] {
        &self.epochs
    }

    /// Earliest tabulated epoch.
    pub fn first_epoch(&self) -> i32 {
        self.epochs[0]
    }

    /// Last fully tabulated epoch; the secular-variation rates sit one
    /// [`EPOCH_STEP`] past it.
    pub fn last_epoch(&self) -> i32 {
        self.epochs[self.epochs.len() - 1]
    }

    /// `g` coefficient for one epoch slot. Values outside the stored
    /// truncation read as zero.
    pub fn g(&self, epoch: i32, n: u8, m: u8) -> FloatValue {
        self.g.get(&(epoch, n, m)).copied().unwrap_or(0.0)
    }

    /// `h` coefficient for one epoch slot. Values outside the stored
    /// truncation read as zero.
    pub fn h(&self, epoch: i32, n: u8, m: u8) -> FloatValue {
        self.h.get(&(epoch, n, m)).copied().unwrap_or(0.0)
    }
}

/// Candidate locations for a coefficient file, in search order.
fn search_candidates(primary: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![primary.to_path_buf()];
    if let Some(name) = primary.file_name() {
        if let Ok(exe) = std::env::current_exe() {
            if let Some(installed) = exe.parent() {
                candidates.push(installed.join(name));
                if let Some(parent) = installed.parent() {
                    candidates.push(parent.join(name));
                }
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    const SINGLE_EPOCH: &str = "\
# Synthetic table with one epoch and dipole terms only.
c/s deg ord IGRF SV
g/h n m 1900.0 1900-05
g 1 0 -31543.0 0.0
g 1 1 -2298.0 0.0
h 1 1 5922.0 0.0
";

    #[test]
    fn parses_single_epoch_table() {
        let table = GaussCoefficients::parse(SINGLE_EPOCH).unwrap();
        assert_eq!(table.epochs(), &[1900]);
        assert_eq!(table.first_epoch(), 1900);
        assert_eq!(table.last_epoch(), 1900);
        assert!(is_close!(table.g(1900, 1, 0), -31543.0));
        assert!(is_close!(table.g(1900, 1, 1), -2298.0));
        assert!(is_close!(table.h(1900, 1, 1), 5922.0));
        // Secular-variation slot sits one step past the last epoch.
        assert!(is_close!(table.g(1905, 1, 0), 0.0));
    }

    #[test]
    fn absent_coefficients_read_as_zero() {
        let table = GaussCoefficients::parse(SINGLE_EPOCH).unwrap();
        assert_eq!(table.g(1900, 5, 3), 0.0);
        assert_eq!(table.h(1900, 1, 0), 0.0);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let text = SINGLE_EPOCH.replace("\nh 1 1", "\nx 1 1");
        let err = GaussCoefficients::parse(&text).unwrap_err();
        assert!(matches!(err, GeomagError::MalformedCoefficients { .. }));
    }

    #[test]
    fn column_count_mismatch_is_rejected() {
        let text = SINGLE_EPOCH.replace("g 1 0 -31543.0 0.0", "g 1 0 -31543.0");
        let err = GaussCoefficients::parse(&text).unwrap_err();
        assert!(matches!(
            err,
            GeomagError::MalformedCoefficients { line: 4, .. }
        ));
    }

    #[test]
    fn non_numeric_value_is_rejected() {
        let text = SINGLE_EPOCH.replace("5922.0", "fivek");
        assert!(GaussCoefficients::parse(&text).is_err());
    }

    #[test]
    fn missing_header_is_rejected() {
        let err = GaussCoefficients::parse("# only comments\n# no header\n").unwrap_err();
        assert!(matches!(err, GeomagError::MalformedCoefficients { .. }));
    }

    #[test]
    fn uneven_epoch_spacing_is_rejected() {
        let text = SINGLE_EPOCH.replace("g/h n m 1900.0", "g/h n m 1900.0 1903.0");
        // Rows now have one column too few as well, but the header is
        // checked first.
        let err = GaussCoefficients::parse(&text).unwrap_err();
        assert!(matches!(
            err,
            GeomagError::MalformedCoefficients { line: 3, .. }
        ));
    }

    /// Build a two-epoch table (1990, 1995) with every row to degree 13, in
    /// the file's row order: all of degree n before n+1, `g` before `h` at
    /// each order.
    fn full_degree_table() -> String {
        let mut text = String::from("c/s deg ord DGRF IGRF SV\ng/h n m 1990.0 1995.0 1995-00\n");
        for n in 1..=13u8 {
            for m in 0..=n {
                let value = (n as f64) * 100.0 + m as f64;
                text.push_str(&format!("g {n} {m} {value} {} 0.0\n", value + 1.0));
                if m > 0 {
                    text.push_str(&format!("h {n} {m} {} {} 0.0\n", -value, -value - 1.0));
                }
            }
        }
        text
    }

    #[test]
    fn historical_epochs_are_truncated_at_degree_10() {
        let table = GaussCoefficients::parse(&full_degree_table()).unwrap();
        // Degree 10 survives everywhere.
        assert!(is_close!(table.g(1990, 10, 0), 1000.0));
        assert!(is_close!(table.g(1995, 10, 0), 1001.0));
        // Degree 11+ rows sit past the first 120 and are withheld from the
        // pre-threshold epoch only.
        assert_eq!(table.g(1990, 11, 0), 0.0);
        assert!(is_close!(table.g(1995, 11, 0), 1101.0));
        assert_eq!(table.h(1990, 13, 13), 0.0);
        assert!(is_close!(table.h(1995, 13, 13), -1314.0));
    }

    #[test]
    fn discover_reports_every_candidate_tried() {
        let err =
            GaussCoefficients::discover(Some(Path::new("/nonexistent/nowhere.txt"))).unwrap_err();
        match err {
            GeomagError::CoefficientsUnavailable(tried) => {
                assert!(!tried.is_empty());
                assert_eq!(tried[0], PathBuf::from("/nonexistent/nowhere.txt"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
