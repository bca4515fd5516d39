use log::{debug, info, warn};
use rayon::prelude::*;
use ureq::Agent;

use super::model::{Catalog, SourceRecord};
use crate::config::FavaConfig;
use crate::error::{FavaError, Result};

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Fetches a JSON list of source records from a URL.
///
/// Implementations report any network or parse failure as
/// [`FavaError::Fetch`] carrying the URL. No retries are expected.
pub trait Transport {
    fn get_json(&self, url: &str) -> Result<Vec<SourceRecord>>;
}

impl<F> Transport for F
where
    F: Fn(&str) -> Result<Vec<SourceRecord>>,
{
    fn get_json(&self, url: &str) -> Result<Vec<SourceRecord>> {
        self(url)
    }
}

/// Blocking HTTP transport.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(config: &FavaConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(config.timeout())
            .build()
            .into();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn get_json(&self, url: &str) -> Result<Vec<SourceRecord>> {
        let fetch_error = |reason: String| FavaError::Fetch {
            url: url.to_string(),
            reason,
        };
        let mut response = self
            .agent
            .get(url)
            .call()
            .map_err(|e: ureq::Error| fetch_error(e.to_string()))?;
        response
            .body_mut()
            .read_json::<Vec<SourceRecord>>()
            .map_err(|e| fetch_error(e.to_string()))
    }
}

/// Source-list query for one week.
pub fn query_url(base: &str, week: u32, threshold: f64) -> String {
    format!("{base}?typeOfRequest=SourceList&week={week}&threshold={threshold}")
}

// ---------------------------------------------------------------------------
// Fetcher / aggregator
// ---------------------------------------------------------------------------

/// Downloads weekly FAVA source lists into a [`Catalog`].
#[derive(Debug, Clone)]
pub struct Fetcher<T> {
    transport: T,
    api_url: String,
}

impl Fetcher<UreqTransport> {
    /// HTTP fetcher for the configured endpoint.
    pub fn from_config(config: &FavaConfig) -> Self {
        Fetcher::new(UreqTransport::new(config), config.api_url.clone())
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, api_url: impl Into<String>) -> Self {
        Self {
            transport,
            api_url: api_url.into(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn query_url(&self, week: u32, threshold: f64) -> String {
        query_url(&self.api_url, week, threshold)
    }

    /// Fetch one week, appending onto `catalog` or onto a fresh catalog.
    ///
    /// The week is appended as a whole or not at all. On error the passed
    /// catalog is dropped; use [`Fetcher::fetch_week_into`] to keep it.
    pub fn fetch_week(
        &self,
        week: u32,
        threshold: f64,
        catalog: Option<Catalog>,
    ) -> Result<Catalog> {
        let mut catalog = catalog.unwrap_or_default();
        self.fetch_week_into(week, threshold, &mut catalog)?;
        Ok(catalog)
    }

    /// In-place form of [`Fetcher::fetch_week`]. `catalog` is untouched on error.
    pub fn fetch_week_into(&self, week: u32, threshold: f64, catalog: &mut Catalog) -> Result<()> {
        let batch = self.fetch_batch(week, threshold)?;
        catalog.extend(batch);
        Ok(())
    }

    /// Fetch weeks `start..=end` in order into one catalog.
    ///
    /// Stops at the first failing week; the error names that week.
    pub fn download_range(&self, start: u32, end: u32, threshold: f64) -> Result<Catalog> {
        check_week_range(start, end)?;
        info!("Downloading FAVA weeks {start}..={end} (threshold {threshold} sigma)");

        let catalog = (start..=end).try_fold(Catalog::new(), |catalog, week| {
            self.fetch_week(week, threshold, Some(catalog))
        })?;

        info!("Downloaded data for {} sources", catalog.len());
        Ok(catalog)
    }

    fn fetch_batch(&self, week: u32, threshold: f64) -> Result<Catalog> {
        let url = self.query_url(week, threshold);
        debug!("GET {url}");

        let records = self
            .transport
            .get_json(&url)
            .map_err(|e| e.in_week(week))?;
        debug!("Week {week}: {} records", records.len());
        if records.is_empty() {
            warn!("Week {week}: no sources above {threshold} sigma");
        }

        Catalog::from_records(&records).map_err(|e| e.in_week(week))
    }
}

impl<T: Transport + Sync> Fetcher<T> {
    /// Like [`Fetcher::download_range`] but fetches up to `workers` weeks at
    /// once. Weeks are merged in week order, so the result is identical to
    /// the sequential download. On failure the lowest failing week is
    /// reported.
    pub fn download_range_parallel(
        &self,
        start: u32,
        end: u32,
        threshold: f64,
        workers: usize,
    ) -> Result<Catalog> {
        check_week_range(start, end)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .build()
            .map_err(|e| FavaError::ThreadPool(e.to_string()))?;
        info!(
            "Downloading FAVA weeks {start}..={end} (threshold {threshold} sigma, {} workers)",
            pool.current_num_threads()
        );

        let batches: Vec<Result<Catalog>> = pool.install(|| {
            (start..=end)
                .into_par_iter()
                .map(|week| self.fetch_batch(week, threshold))
                .collect()
        });

        let mut catalog = Catalog::new();
        for batch in batches {
            catalog.extend(batch?);
        }

        info!("Downloaded data for {} sources", catalog.len());
        Ok(catalog)
    }
}

/// Reject a week range whose start lies after its end.
pub fn check_week_range(start: u32, end: u32) -> Result<()> {
    if start > end {
        return Err(FavaError::InvalidWeekRange { start, end });
    }
    Ok(())
}
