use log::info;

use super::model::{Catalog, CatalogValue, Field, RowMask};
use crate::coords::{CoordinateTransform, Fk5Galactic};
use crate::error::{FavaError, Result};

// ---------------------------------------------------------------------------
// Selection result
// ---------------------------------------------------------------------------

/// Output of a band selection: the filtered rows or just their indices.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Catalog(Catalog),
    Mask(RowMask),
}

impl Selection {
    pub fn into_catalog(self) -> Option<Catalog> {
        match self {
            Selection::Catalog(catalog) => Some(catalog),
            Selection::Mask(_) => None,
        }
    }

    pub fn into_mask(self) -> Option<RowMask> {
        match self {
            Selection::Mask(mask) => Some(mask),
            Selection::Catalog(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Galactic latitude band selector
// ---------------------------------------------------------------------------

/// Selects catalog rows whose best position lies within a galactic latitude
/// band around the plane.
#[derive(Debug, Clone, Default)]
pub struct GalacticSelector<C = Fk5Galactic> {
    transform: C,
}

impl GalacticSelector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: CoordinateTransform> GalacticSelector<C> {
    pub fn with_transform(transform: C) -> Self {
        Self { transform }
    }

    /// Galactic latitude (deg) of every row, from `best_ra`/`best_dec`.
    ///
    /// Any row with a non-numeric or out-of-range position fails the whole
    /// call with that row's index.
    pub fn galactic_latitudes(&self, catalog: &Catalog) -> Result<Vec<f64>> {
        catalog
            .column(Field::BestRa)
            .iter()
            .zip(catalog.column(Field::BestDec))
            .enumerate()
            .map(|(row, (ra, dec))| {
                let (ra, dec) = equatorial_position(row, ra, dec)?;
                let (_l, b) = self.transform.to_galactic(ra, dec);
                Ok(b)
            })
            .collect()
    }

    /// Rows with `-half_width_deg <= b <= half_width_deg`.
    pub fn band_mask(&self, catalog: &Catalog, half_width_deg: f64) -> Result<RowMask> {
        let latitudes = self.galactic_latitudes(catalog)?;
        let band = -half_width_deg..=half_width_deg;
        Ok(RowMask::from_predicate(latitudes.len(), |i| {
            band.contains(&latitudes[i])
        }))
    }

    /// Filter `catalog` to the galactic band, or return only the row mask
    /// when `want_index_only` is set. The input catalog is not modified.
    pub fn select_galactic_band(
        &self,
        catalog: &Catalog,
        half_width_deg: f64,
        want_index_only: bool,
    ) -> Result<Selection> {
        let mask = self.band_mask(catalog, half_width_deg)?;
        info!(
            "Selected {} of {} sources within |b| <= {half_width_deg} deg",
            mask.len(),
            catalog.len()
        );

        if want_index_only {
            return Ok(Selection::Mask(mask));
        }
        Ok(Selection::Catalog(catalog.take(&mask)?))
    }
}

/// Band selection with the standard FK5 → galactic transform.
pub fn select_galactic_band(
    catalog: &Catalog,
    half_width_deg: f64,
    want_index_only: bool,
) -> Result<Selection> {
    GalacticSelector::new().select_galactic_band(catalog, half_width_deg, want_index_only)
}

fn equatorial_position(
    row: usize,
    ra: &CatalogValue,
    dec: &CatalogValue,
) -> Result<(f64, f64)> {
    let bad = |reason: String| FavaError::CoordinateTransform { row, reason };

    let ra_deg = ra
        .as_f64()
        .ok_or_else(|| bad(format!("best_ra is not numeric: {ra}")))?;
    let dec_deg = dec
        .as_f64()
        .ok_or_else(|| bad(format!("best_dec is not numeric: {dec}")))?;

    if !(0.0..=360.0).contains(&ra_deg) {
        return Err(bad(format!("best_ra {ra_deg} outside [0, 360]")));
    }
    if !(-90.0..=90.0).contains(&dec_deg) {
        return Err(bad(format!("best_dec {dec_deg} outside [-90, 90]")));
    }
    Ok((ra_deg, dec_deg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::full_record;
    use serde_json::json;

    /// Catalog whose row `i` has `best_ra = i` and `best_dec = 0`.
    fn catalog_of(n: u32) -> Catalog {
        let records: Vec<_> = (0..n).map(|i| full_record(i, i as f64, 0.0)).collect();
        Catalog::from_records(&records).unwrap()
    }

    /// Transform that reports `b = latitudes[ra]`.
    fn latitude_table(latitudes: &[f64]) -> impl Fn(f64, f64) -> (f64, f64) + '_ {
        move |ra, _dec| (0.0, latitudes[ra as usize])
    }

    fn ids(catalog: &Catalog) -> Vec<f64> {
        catalog
            .column(Field::FlareId)
            .iter()
            .filter_map(CatalogValue::as_f64)
            .collect()
    }

    #[test]
    fn band_is_inclusive() {
        let latitudes = [-10.0, -10.000_001, 0.0, 10.0, 10.5, 3.0];
        let selector = GalacticSelector::with_transform(latitude_table(&latitudes));

        let mask = selector.band_mask(&catalog_of(6), 10.0).unwrap();

        assert_eq!(mask.indices(), &[0, 2, 3, 5]);
    }

    #[test]
    fn zero_width_keeps_only_the_plane() {
        let latitudes = [0.0, 1e-12, -0.0, -1e-12];
        let selector = GalacticSelector::with_transform(latitude_table(&latitudes));

        let mask = selector.band_mask(&catalog_of(4), 0.0).unwrap();

        assert_eq!(mask.indices(), &[0, 2]);
    }

    #[test]
    fn filtered_catalog_preserves_order() {
        let latitudes = [1.0, 80.0, -2.0, 5.0, -45.0, 0.5];
        let selector = GalacticSelector::with_transform(latitude_table(&latitudes));

        let selected = selector
            .select_galactic_band(&catalog_of(6), 5.0, false)
            .unwrap()
            .into_catalog()
            .unwrap();

        assert_eq!(ids(&selected), vec![0.0, 2.0, 3.0, 5.0]);
        for (_, column) in selected.columns() {
            assert_eq!(column.len(), 4);
        }
    }

    #[test]
    fn mask_applied_equals_filtered_catalog() {
        let latitudes = [12.0, -3.0, 7.5, -7.5, 30.0];
        let selector = GalacticSelector::with_transform(latitude_table(&latitudes));
        let catalog = catalog_of(5);

        let mask = selector
            .select_galactic_band(&catalog, 8.0, true)
            .unwrap()
            .into_mask()
            .unwrap();
        let filtered = selector
            .select_galactic_band(&catalog, 8.0, false)
            .unwrap()
            .into_catalog()
            .unwrap();

        assert_eq!(catalog.take(&mask).unwrap(), filtered);
        let round_trip = RowMask::from_bools(&mask.to_bools());
        assert_eq!(catalog.take(&round_trip).unwrap(), filtered);
    }

    #[test]
    fn empty_band_gives_empty_catalog() {
        let latitudes = [45.0, -60.0];
        let selector = GalacticSelector::with_transform(latitude_table(&latitudes));

        let selected = selector
            .select_galactic_band(&catalog_of(2), 10.0, false)
            .unwrap()
            .into_catalog()
            .unwrap();

        assert!(selected.is_empty());
        assert_eq!(selected, Catalog::new());
    }

    #[test]
    fn empty_catalog_selects_nothing() {
        let mask = GalacticSelector::new()
            .band_mask(&Catalog::new(), 10.0)
            .unwrap();
        assert!(mask.is_empty());
        assert_eq!(mask.row_count(), 0);
    }

    #[test]
    fn input_catalog_is_untouched() {
        let catalog = catalog_of(3);
        let before = catalog.clone();
        select_galactic_band(&catalog, 1.0, false).unwrap();
        assert_eq!(catalog, before);
    }

    #[test]
    fn real_transform_separates_plane_from_pole() {
        let records = vec![
            full_record(1, 266.4, -28.9),  // galactic centre
            full_record(2, 192.86, 27.13), // north galactic pole
            full_record(3, 83.63, 22.01),  // Crab, b ~ -5.8
        ];
        let catalog = Catalog::from_records(&records).unwrap();

        let mask = select_galactic_band(&catalog, 10.0, true)
            .unwrap()
            .into_mask()
            .unwrap();

        assert_eq!(mask.indices(), &[0, 2]);
    }

    #[test]
    fn non_numeric_position_names_the_row() {
        let mut bad = full_record(2, 0.0, 0.0);
        bad.insert("best_dec".into(), json!("n/a"));
        let catalog =
            Catalog::from_records(&[full_record(1, 0.0, 0.0), bad]).unwrap();

        let err = select_galactic_band(&catalog, 10.0, false).unwrap_err();

        assert!(matches!(err, FavaError::CoordinateTransform { row: 1, .. }));
    }

    #[test]
    fn out_of_range_declination_is_rejected() {
        let catalog = Catalog::from_records(&[full_record(1, 10.0, 91.0)]).unwrap();
        let err = select_galactic_band(&catalog, 10.0, true).unwrap_err();
        assert!(matches!(err, FavaError::CoordinateTransform { row: 0, .. }));
        assert!(err.to_string().contains("best_dec"));
    }
}
