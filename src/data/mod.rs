/// Data layer: catalog model, weekly download, and galactic band filtering.
///
/// Architecture:
/// ```text
///   FAVA queryDB (JSON, one request per week)
///        │
///        ▼
///   ┌──────────┐
///   │ fetcher   │  week range → source records → typed rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Catalog  │  one column per schema field, lockstep length
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  (ra, dec) → galactic b → RowMask / sub-catalog
///   └──────────┘
/// ```

pub mod fetcher;
pub mod filter;
pub mod model;
