//! Multi-harmonic network polygon tables.
//!
//! NSPs publish polygon envelopes as a worksheet with one `R, X` column pair per
//! harmonic order and one row per polygon vertex:
//!
//! ```text
//!          Harmonic #2     Harmonic #3     Harmonic #4   ...
//!          R       X       R       X       R       X     ...
//! Point 1  8.78    28.99   31.38   44.89   31.9    17.34 ...
//! Point 2  11.54   24.95   36.27   34.36   35.57   9.03  ...
//! ```
//!
//! The worksheet is read from its delimited-text export. Row order is vertex
//! order and defines the polygon edges, so it is never re-sorted.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::constants::{harmonic_count, DEFAULT_FIRST_HARMONIC, DEFAULT_LAST_HARMONIC};
use crate::errors::{HarmonicsError, Result};
use crate::impedance::Impedance;
use crate::math::Scalar;
use crate::polygon::Polygon;

/// Inclusive range of harmonic orders covered by a table.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarmonicRange {
    /// Lowest harmonic order.
    pub first: u32,
    /// Highest harmonic order.
    pub last: u32,
}

impl HarmonicRange {
    /// Creates a range covering `first..=last`.
    #[must_use]
    pub const fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    /// Number of harmonic orders in the range.
    #[must_use]
    pub const fn count(&self) -> usize {
        harmonic_count(self.first, self.last)
    }

    /// True if `h` is inside the range.
    #[must_use]
    pub const fn contains(&self, h: u32) -> bool {
        h >= self.first && h <= self.last
    }

    /// Iterates the harmonic orders in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.first..=self.last
    }

    fn validate(&self) -> Result<()> {
        if self.first == 0 || self.last < self.first {
            return Err(HarmonicsError::Configuration(format!(
                "invalid harmonic range {}..={}",
                self.first, self.last
            )));
        }
        Ok(())
    }
}

impl Default for HarmonicRange {
    fn default() -> Self {
        Self::new(DEFAULT_FIRST_HARMONIC, DEFAULT_LAST_HARMONIC)
    }
}

/// Layout of a polygon table export.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    /// Harmonic orders expected, one `R, X` column pair each.
    pub range: HarmonicRange,
    /// Header lines before the first vertex row (harmonic label, R/X label).
    pub header_rows: usize,
    /// Whether the first column holds row labels such as `Point 1`.
    pub index_column: bool,
    /// Field separator.
    pub separator: char,
    /// Optional factor applied to every R and X value (e.g. a base impedance
    /// when the NSP supplies per-unit data).
    pub impedance_base: Option<Scalar>,
}

impl TableOptions {
    /// Replaces the harmonic range.
    #[must_use]
    pub fn with_range(mut self, range: HarmonicRange) -> Self {
        self.range = range;
        self
    }

    /// Replaces the separator.
    #[must_use]
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Sets the impedance base factor.
    #[must_use]
    pub fn with_impedance_base(mut self, base: Scalar) -> Self {
        self.impedance_base = Some(base);
        self
    }

    /// Sets the number of header rows.
    #[must_use]
    pub fn with_header_rows(mut self, rows: usize) -> Self {
        self.header_rows = rows;
        self
    }

    /// Sets whether the first column carries row labels.
    #[must_use]
    pub fn with_index_column(mut self, index_column: bool) -> Self {
        self.index_column = index_column;
        self
    }
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            range: HarmonicRange::default(),
            header_rows: 2,
            index_column: true,
            separator: ',',
            impedance_base: None,
        }
    }
}

/// Polygon vertices per harmonic order, as loaded from one table.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonTable {
    polygons: BTreeMap<u32, Vec<Impedance>>,
}

impl PolygonTable {
    /// Reads and parses a delimited-text polygon table from `path`.
    pub fn load(path: impl AsRef<Path>, options: &TableOptions) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "loading polygon table");
        Self::parse(&text, options)
    }

    /// Parses a delimited-text polygon table.
    ///
    /// Any error aborts the whole load; no partial table is returned. Rows with
    /// an empty cell are skipped as incomplete.
    pub fn parse(text: &str, options: &TableOptions) -> Result<Self> {
        options.range.validate()?;
        let orders = options.range.count();

        let mut rows: Vec<(usize, Vec<&str>)> = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                let mut cells: Vec<&str> = line.split(options.separator).map(str::trim).collect();
                if options.index_column && !cells.is_empty() {
                    cells.remove(0);
                }
                (idx + 1, cells)
            })
            .collect();

        if rows.len() <= options.header_rows {
            return Err(HarmonicsError::MalformedInput(
                "table has no vertex rows".into(),
            ));
        }
        let data = rows.split_off(options.header_rows);
        let header = rows;

        let columns = data[0].1.len();
        if columns % orders != 0 {
            return Err(HarmonicsError::MalformedInput(format!(
                "there are {columns} columns, expected a multiple of {orders} harmonic orders"
            )));
        }
        if columns != 2 * orders {
            return Err(HarmonicsError::MalformedInput(format!(
                "there are {columns} columns, expected {} (one R, X pair per harmonic order)",
                2 * orders
            )));
        }
        for (line, cells) in header.iter().chain(data.iter()) {
            if cells.len() != columns {
                return Err(HarmonicsError::MalformedInput(format!(
                    "line {line} has {} columns, expected {columns}",
                    cells.len()
                )));
            }
        }
        if let Some((line, labels)) = header.first() {
            check_harmonic_labels(*line, labels, &options.range)?;
        }

        let scale = options.impedance_base.unwrap_or(1.0);
        let mut vertex_rows: Vec<Vec<Scalar>> = Vec::with_capacity(data.len());
        for (line, cells) in &data {
            if cells.iter().any(|c| c.is_empty()) {
                warn!(line, "skipping incomplete polygon row");
                continue;
            }
            let mut values = Vec::with_capacity(columns);
            for (col, cell) in cells.iter().enumerate() {
                let value = cell.parse::<Scalar>().map_err(|_| {
                    HarmonicsError::MalformedInput(format!(
                        "line {line}, column {}: {cell:?} is not a number",
                        col + 1
                    ))
                })?;
                values.push(value * scale);
            }
            vertex_rows.push(values);
        }
        if vertex_rows.is_empty() {
            return Err(HarmonicsError::MalformedInput(
                "no complete vertex rows".into(),
            ));
        }

        let polygons = options
            .range
            .iter()
            .enumerate()
            .map(|(k, h)| {
                let vertices = vertex_rows
                    .iter()
                    .map(|row| Impedance::new(row[2 * k], row[2 * k + 1]))
                    .collect();
                (h, vertices)
            })
            .collect();
        debug!(orders, vertices = vertex_rows.len(), "parsed polygon table");
        Ok(Self { polygons })
    }

    /// Harmonic orders present, ascending.
    pub fn harmonics(&self) -> impl Iterator<Item = u32> + '_ {
        self.polygons.keys().copied()
    }

    /// Number of harmonic orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// True if the table holds no harmonic orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Vertices for harmonic order `h`, in row order.
    pub fn vertices(&self, h: u32) -> Result<&[Impedance]> {
        self.polygons
            .get(&h)
            .map(Vec::as_slice)
            .ok_or_else(|| HarmonicsError::MalformedInput(format!("no polygon for harmonic {h}")))
    }

    /// Validated polygon for harmonic order `h`.
    pub fn polygon(&self, h: u32) -> Result<Polygon> {
        Polygon::new(self.vertices(h)?.to_vec()).map_err(|err| match err {
            HarmonicsError::InvalidPolygon(msg) => {
                HarmonicsError::InvalidPolygon(format!("harmonic {h}: {msg}"))
            }
            other => other,
        })
    }
}

/// Labels such as `Harmonic #7` sit above each R column; when a label carries a
/// number it must match the order expected at that position.
fn check_harmonic_labels(line: usize, labels: &[&str], range: &HarmonicRange) -> Result<()> {
    for (k, h) in range.iter().enumerate() {
        let label = labels[2 * k];
        let digits: String = label
            .chars()
            .rev()
            .take_while(char::is_ascii_digit)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if let Ok(found) = digits.parse::<u32>() {
            if found != h {
                return Err(HarmonicsError::MalformedInput(format!(
                    "line {line}, column {}: label {label:?} names harmonic {found}, expected {h}",
                    2 * k + 1
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "\
,Harmonic #2,,Harmonic #3,
,R,X,R,X
Point 1,8.78,28.99,31.38,44.89
Point 2,11.54,24.95,36.27,34.36
Point 3,5.6,15.03,24.1,28.35
";

    fn small_options() -> TableOptions {
        TableOptions::default().with_range(HarmonicRange::new(2, 3))
    }

    #[test]
    fn parses_pairs_per_harmonic_in_row_order() {
        let table = PolygonTable::parse(SMALL, &small_options()).unwrap();
        assert_eq!(table.harmonics().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(
            table.vertices(3).unwrap(),
            &[
                Impedance::new(31.38, 44.89),
                Impedance::new(36.27, 34.36),
                Impedance::new(24.1, 28.35),
            ]
        );
    }

    #[test]
    fn column_count_must_divide_by_orders() {
        let text = ",a,b,c\n,R,X,R\nP1,1,2,3\n";
        let err = PolygonTable::parse(text, &small_options()).unwrap_err();
        assert!(err.to_string().contains("there are 3 columns"));
    }

    #[test]
    fn column_count_must_be_one_pair_per_order() {
        let text = "h\nl\nP1,1,2\n";
        let options = TableOptions::default().with_range(HarmonicRange::new(2, 3));
        let err = PolygonTable::parse(text, &options).unwrap_err();
        assert!(err.to_string().contains("expected 4"));
    }

    #[test]
    fn mismatched_header_label_is_rejected() {
        let text = SMALL.replace("Harmonic #3", "Harmonic #4");
        let err = PolygonTable::parse(&text, &small_options()).unwrap_err();
        assert!(err.to_string().contains("expected 3"));
    }

    #[test]
    fn incomplete_rows_are_skipped() {
        let text = format!("{SMALL}Point 4,1.0,,2.0,3.0\n");
        let table = PolygonTable::parse(&text, &small_options()).unwrap();
        assert_eq!(table.vertices(2).unwrap().len(), 3);
    }

    #[test]
    fn non_numeric_cell_aborts_load() {
        let text = SMALL.replace("24.1", "oops");
        let err = PolygonTable::parse(&text, &small_options()).unwrap_err();
        assert!(matches!(err, HarmonicsError::MalformedInput(_)));
        assert!(err.to_string().contains("line 5, column 3"));
    }

    #[test]
    fn impedance_base_scales_values() {
        let options = small_options().with_impedance_base(2.0);
        let table = PolygonTable::parse(SMALL, &options).unwrap();
        assert_eq!(table.vertices(2).unwrap()[0], Impedance::new(17.56, 57.98));
    }

    #[test]
    fn missing_harmonic_is_malformed_input() {
        let table = PolygonTable::parse(SMALL, &small_options()).unwrap();
        assert!(matches!(table.vertices(9), Err(HarmonicsError::MalformedInput(_))));
    }

    #[test]
    fn polygon_errors_name_the_harmonic() {
        let text = ",h2,,h3,\n,R,X,R,X\nP1,0,0,1,1\nP2,1,0,1,1\n";
        let table = PolygonTable::parse(text, &small_options()).unwrap();
        let err = table.polygon(3).unwrap_err();
        assert!(err.to_string().contains("harmonic 3"));
    }

    #[test]
    fn semicolon_export_without_index() {
        let text = "2;;3;\nR;X;R;X\n0;0;1;1\n4;0;5;1\n0;4;1;5\n";
        let options = small_options().with_separator(';').with_index_column(false);
        let table = PolygonTable::parse(text, &options).unwrap();
        assert!(table.polygon(2).is_ok());
    }
}
