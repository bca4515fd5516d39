//! Client for the Fermi LAT FAVA flare catalog.
//!
//! Downloads weekly source lists into a fixed-schema columnar [`Catalog`]
//! and selects sources within a galactic latitude band.
//!
//! ```no_run
//! use fava_catalog::{FavaConfig, Fetcher, select_galactic_band};
//!
//! # fn main() -> fava_catalog::Result<()> {
//! let config = FavaConfig::default();
//! let catalog = Fetcher::from_config(&config).download_range(1, 10, config.threshold)?;
//! let plane = select_galactic_band(&catalog, 10.0, false)?;
//! # let _ = plane;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coords;
pub mod data;
pub mod error;

pub use config::FavaConfig;
pub use coords::{CoordinateTransform, Fk5Galactic};
pub use data::fetcher::{query_url, Fetcher, Transport, UreqTransport};
pub use data::filter::{select_galactic_band, GalacticSelector, Selection};
pub use data::model::{Catalog, CatalogValue, Field, RowMask, SourceRecord, FIELD_COUNT};
pub use error::{FavaError, Result};
