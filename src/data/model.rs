use std::fmt;
use std::str::FromStr;

use serde_json::Value as JsonValue;

use crate::error::{FavaError, Result};

/// One source record as delivered by the service: field name → raw value.
pub type SourceRecord = serde_json::Map<String, JsonValue>;

// ---------------------------------------------------------------------------
// Field – the fixed catalog schema
// ---------------------------------------------------------------------------

macro_rules! catalog_fields {
    ($($(#[$meta:meta])* $variant:ident => $name:literal),* $(,)?) => {
        /// A column of the FAVA flare catalog.
        ///
        /// The string form is the exact key used by the remote service.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Field {
            $($(#[$meta])* $variant),*
        }

        impl Field {
            /// Every schema field, in catalog column order.
            pub const ALL: &'static [Field] = &[$(Field::$variant),*];

            /// Key of this field in the service payload.
            pub fn name(self) -> &'static str {
                match self {
                    $(Field::$variant => $name),*
                }
            }
        }

        impl FromStr for Field {
            type Err = FavaError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($name => Ok(Field::$variant),)*
                    other => Err(FavaError::UnknownField {
                        field: other.to_string(),
                    }),
                }
            }
        }
    };
}

catalog_fields! {
    FlareId => "flareID",
    Num => "num",
    /// Best available right ascension (deg, J2000).
    BestRa => "best_ra",
    /// Best available declination (deg, J2000).
    BestDec => "best_dec",
    BestR95 => "best_r95",
    BestPositionSource => "bestPositionSource",
    FavaRa => "fava_ra",
    FavaDec => "fava_dec",
    Lbin => "lbin",
    Bbin => "bbin",
    Gall => "gall",
    Galb => "galb",
    /// Start of the flaring interval (MET seconds).
    Tmin => "tmin",
    Tmax => "tmax",
    Sigma => "sigma",
    Avnev => "avnev",
    Nev => "nev",
    HeNev => "he_nev",
    HeAvnev => "he_avnev",
    HeSigma => "he_sigma",
    Sundist => "sundist",
    Varindex => "varindex",
    Favasrc => "favasrc",
    Fglassoc => "fglassoc",
    Assoc => "assoc",
    // Low-energy likelihood follow-up
    LeTs => "le_ts",
    LeTsSigma => "le_tssigma",
    LeRa => "le_ra",
    LeDec => "le_dec",
    LeGall => "le_gall",
    LeGalb => "le_galb",
    LeR95 => "le_r95",
    LeContFlag => "le_contflag",
    LeSundist => "le_sundist",
    LeDist2bb => "le_dist2bb",
    LeFfSigma => "le_ffsigma",
    LeHighTsFrac => "le_hightsfrac",
    LeGtlts => "le_gtlts",
    LeFlux => "le_flux",
    /// Spelled `fuxerr` by the service.
    LeFluxErr => "le_fuxerr",
    LeIndex => "le_index",
    LeIndexErr => "le_indexerr",
    // High-energy likelihood follow-up
    HeTs => "he_ts",
    HeTsSigma => "he_tssigma",
    HeRa => "he_ra",
    HeDec => "he_dec",
    HeGall => "he_gall",
    HeGalb => "he_galb",
    HeR95 => "he_r95",
    HeContFlag => "he_contflag",
    HeSundist => "he_sundist",
    HeDist2bb => "he_dist2bb",
    HeFfSigma => "he_ffsigma",
    HeHighTsFrac => "he_hightsfrac",
    /// Distance between the high- and low-energy positions.
    HeLeDist => "he_le_dist",
    HeGtlts => "he_gtlts",
    HeFlux => "he_flux",
    HeFluxErr => "he_fuxerr",
    HeIndex => "he_index",
    HeIndexErr => "he_indexerr",
    Week => "week",
    DateStart => "dateStart",
    DateStop => "dateStop",
}

/// Number of columns in every catalog.
pub const FIELD_COUNT: usize = Field::ALL.len();

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// CatalogValue – a single cell
// ---------------------------------------------------------------------------

/// A catalog cell: either a parsed number or the payload value as received.
///
/// Each value is coerced on its own, so one column can hold both variants.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogValue {
    Number(f64),
    /// Non-numeric payload value (text, null, bool, nested JSON).
    Raw(JsonValue),
}

impl CatalogValue {
    /// Coerce a payload value: numeric-parseable values become
    /// [`CatalogValue::Number`], everything else is kept as received.
    pub fn coerce(raw: &JsonValue) -> Self {
        match parse_number(raw) {
            Some(v) => CatalogValue::Number(v),
            None => CatalogValue::Raw(raw.clone()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CatalogValue::Number(v) => Some(*v),
            CatalogValue::Raw(_) => None,
        }
    }

    /// Text content of a raw string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CatalogValue::Raw(JsonValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CatalogValue::Number(_))
    }
}

/// JSON numbers and strings holding a float literal parse; nothing else does.
fn parse_number(raw: &JsonValue) -> Option<f64> {
    match raw {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

impl fmt::Display for CatalogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogValue::Number(v) => write!(f, "{v}"),
            CatalogValue::Raw(JsonValue::String(s)) => write!(f, "{s}"),
            CatalogValue::Raw(JsonValue::Null) => write!(f, "<null>"),
            CatalogValue::Raw(other) => write!(f, "{other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// RowMask – selected row indices
// ---------------------------------------------------------------------------

/// Ascending row indices selected from a catalog of `row_count` rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMask {
    indices: Vec<usize>,
    row_count: usize,
}

impl RowMask {
    /// Mask of the rows for which `keep` returns true.
    pub fn from_predicate(row_count: usize, mut keep: impl FnMut(usize) -> bool) -> Self {
        RowMask {
            indices: (0..row_count).filter(|&i| keep(i)).collect(),
            row_count,
        }
    }

    /// Mask from a boolean vector aligned to catalog rows.
    pub fn from_bools(flags: &[bool]) -> Self {
        Self::from_predicate(flags.len(), |i| flags[i])
    }

    pub fn to_bools(&self) -> Vec<bool> {
        let mut flags = vec![false; self.row_count];
        for &i in &self.indices {
            flags[i] = true;
        }
        flags
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Row count of the catalog this mask was computed for.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of selected rows.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, row: usize) -> bool {
        self.indices.binary_search(&row).is_ok()
    }
}

// ---------------------------------------------------------------------------
// Catalog – columnar store over the fixed schema
// ---------------------------------------------------------------------------

/// Columnar FAVA catalog: one column per [`Field`], all of equal length.
///
/// Rows are only ever added whole, so row `i` of every column belongs to the
/// same flare. Row order is append order.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    columns: [Vec<CatalogValue>; FIELD_COUNT],
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Empty catalog with every schema column present.
    pub fn new() -> Self {
        Catalog {
            columns: std::array::from_fn(|_| Vec::new()),
        }
    }

    /// Build a catalog from a batch of records.
    ///
    /// Fails on the first invalid record; the error carries its position.
    pub fn from_records(records: &[SourceRecord]) -> Result<Self> {
        let mut catalog = Catalog::new();
        for (position, record) in records.iter().enumerate() {
            let row = row_from_record(record, position)?;
            catalog.push_row(row);
        }
        Ok(catalog)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, field: Field) -> &[CatalogValue] {
        &self.columns[field as usize]
    }

    /// Column lookup by payload key.
    pub fn column_by_name(&self, name: &str) -> Result<&[CatalogValue]> {
        let field: Field = name.parse()?;
        Ok(self.column(field))
    }

    /// All columns in schema order.
    pub fn columns(&self) -> impl Iterator<Item = (Field, &[CatalogValue])> + '_ {
        Field::ALL.iter().map(move |&field| (field, self.column(field)))
    }

    /// Append one record as a new row.
    ///
    /// The record must carry exactly the schema fields. On error nothing is
    /// appended and the error names the row the record would have become.
    pub fn append_record(&mut self, record: &SourceRecord) -> Result<()> {
        let row = row_from_record(record, self.len())?;
        self.push_row(row);
        Ok(())
    }

    /// Append every row of `other`, keeping its order.
    pub fn extend(&mut self, other: Catalog) {
        for (dst, src) in self.columns.iter_mut().zip(other.columns) {
            dst.extend(src);
        }
    }

    /// New catalog holding only the rows selected by `mask`.
    pub fn take(&self, mask: &RowMask) -> Result<Catalog> {
        if mask.row_count() != self.len() {
            return Err(FavaError::MaskLengthMismatch {
                mask_rows: mask.row_count(),
                catalog_rows: self.len(),
            });
        }
        let mut selected = Catalog::new();
        for (dst, src) in selected.columns.iter_mut().zip(&self.columns) {
            *dst = mask.indices().iter().map(|&i| src[i].clone()).collect();
        }
        Ok(selected)
    }

    fn push_row(&mut self, row: Vec<CatalogValue>) {
        debug_assert_eq!(row.len(), FIELD_COUNT);
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.push(value);
        }
    }
}

/// Validate a record against the schema and coerce it into a row in
/// [`Field::ALL`] order.
fn row_from_record(record: &SourceRecord, position: usize) -> Result<Vec<CatalogValue>> {
    for key in record.keys() {
        key.parse::<Field>()?;
    }
    Field::ALL
        .iter()
        .map(|&field| {
            record
                .get(field.name())
                .map(CatalogValue::coerce)
                .ok_or(FavaError::IncompleteRecord {
                    record: position,
                    field: field.name(),
                })
        })
        .collect()
}
