//! Scan orchestration: load, enrich, detect
//!
//! A scan owns all of its mutable state through a [`ScanContext`]. Nothing
//! is shared between scans, so two scans never see each other's cache or
//! progress.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hotel_dedup::deduplication::select_for_enrichment;
use hotel_dedup::{
    consolidate, find_duplicates, DuplicateCluster, DuplicatePair, HotelId, HotelRecord,
};
use serde::{Deserialize, Serialize};

use crate::catalog::HotelInfo;
use crate::client::CatalogSource;
use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::stats::StatsSnapshot;

/// Hotels loaded at which the loading phase reports its full share
pub const LOADING_SATURATION: usize = 500;

/// Marker searched for by the description scan (case-sensitive)
pub const DESCRIPTION_ERROR_MARKER: &str = "Error";

/// Cooperative cancellation, checked between catalog requests
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPhase {
    #[default]
    Loading,
    Enriching,
    Done,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub phase: ScanPhase,
    pub hotels_loaded: usize,
    pub to_enrich: usize,
    pub enriched: usize,
    pub flags_found: usize,
    /// 0..=100
    pub percent: u8,
}

/// Progress while loading: 5% plus up to 35% as hotels arrive
pub fn loading_percent(hotels_loaded: usize) -> u8 {
    let share = (hotels_loaded as f64 / LOADING_SATURATION as f64).min(1.0);
    (5 + (35.0 * share) as u8).min(40)
}

/// Progress while enriching: 40% plus up to 50% as fetches complete
pub fn enrichment_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 40;
    }
    (40 + 50 * done / total).min(90) as u8
}

/// `HotelInfo` already fetched during this scan
///
/// Failed fetches are not cached.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentCache {
    entries: HashMap<HotelId, HotelInfo>,
}

impl EnrichmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: HotelId) -> Option<&HotelInfo> {
        self.entries.get(&id)
    }

    pub fn insert(&mut self, id: HotelId, info: HotelInfo) {
        self.entries.insert(id, info);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub type ProgressCallback = Box<dyn Fn(&ScanProgress) + Send + Sync>;

/// Per-scan state passed explicitly through every step
pub struct ScanContext {
    pub cache: EnrichmentCache,
    pub progress: ScanProgress,
    per_page: u32,
    cancel: CancelFlag,
    on_progress: Option<ProgressCallback>,
}

impl Default for ScanContext {
    fn default() -> Self {
        Self::new(ScanConfig::default().per_page)
    }
}

impl ScanContext {
    pub fn new(per_page: u32) -> Self {
        Self {
            cache: EnrichmentCache::new(),
            progress: ScanProgress::default(),
            per_page: per_page.max(1),
            cancel: CancelFlag::new(),
            on_progress: None,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.per_page)
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Called after every progress update
    pub fn on_progress(mut self, callback: impl Fn(&ScanProgress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    fn check_cancelled(&self) -> ScanResult<()> {
        if self.cancel.is_cancelled() {
            tracing::info!(phase = ?self.progress.phase, "Scan cancelled");
            return Err(ScanError::Cancelled);
        }
        Ok(())
    }

    fn report(&self) {
        if let Some(callback) = &self.on_progress {
            callback(&self.progress);
        }
    }
}

/// Result of a duplicate scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub records: Vec<HotelRecord>,
    pub pairs: Vec<DuplicatePair>,
    pub clusters: Vec<DuplicateCluster>,
    pub stats: StatsSnapshot,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Hotel whose catalog description carries an error marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionIssue {
    pub hotel_id: HotelId,
    pub name: String,
    pub stars: String,
    pub reason: String,
}

/// Load the given cities, enrich likely duplicates, then detect and group them
pub async fn run_scan<S>(
    source: &S,
    city_ids: &[u64],
    country_id: Option<u64>,
    ctx: &mut ScanContext,
) -> ScanResult<ScanOutcome>
where
    S: CatalogSource + ?Sized,
{
    if city_ids.is_empty() {
        return Err(ScanError::NoCities);
    }
    let started_at = Utc::now();
    ctx.progress = ScanProgress::default();

    tracing::info!(cities = city_ids.len(), ?country_id, "Loading hotels");
    let mut records = load_hotels(source, city_ids, country_id, ctx).await?;

    let selected = select_for_enrichment(&records);
    ctx.progress.phase = ScanPhase::Enriching;
    ctx.progress.to_enrich = selected.len();
    ctx.progress.percent = 40;
    ctx.report();
    tracing::info!(
        hotels = records.len(),
        to_enrich = selected.len(),
        "Enriching candidate hotels"
    );

    let mut position: HashMap<HotelId, usize> = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        position.entry(record.id).or_insert(i);
    }

    let total = selected.len();
    for (done, id) in selected.iter().enumerate() {
        ctx.check_cancelled()?;
        if let Some(info) = cached_info(source, &mut ctx.cache, *id).await {
            if let Some(record) = position.get(id).and_then(|&i| records.get_mut(i)) {
                if info.has_contacts() {
                    record.apply_contacts(info.site.as_deref(), info.phone.as_deref());
                }
            }
        }
        ctx.progress.enriched = done + 1;
        ctx.progress.percent = enrichment_percent(done + 1, total);
        ctx.report();
    }

    let pairs = find_duplicates(&records);
    let clusters = consolidate(&pairs);

    ctx.progress.phase = ScanPhase::Done;
    ctx.progress.flags_found = pairs.len();
    ctx.progress.percent = 100;
    ctx.report();
    tracing::info!(
        hotels = records.len(),
        flagged = pairs.len(),
        clusters = clusters.len(),
        "Scan finished"
    );

    Ok(ScanOutcome {
        records,
        pairs,
        clusters,
        stats: source.stats(),
        started_at,
        finished_at: Utc::now(),
    })
}

/// Load the given cities and report hotels whose description contains `"Error"`
pub async fn run_error_scan<S>(
    source: &S,
    city_ids: &[u64],
    country_id: Option<u64>,
    ctx: &mut ScanContext,
) -> ScanResult<Vec<DescriptionIssue>>
where
    S: CatalogSource + ?Sized,
{
    if city_ids.is_empty() {
        return Err(ScanError::NoCities);
    }
    ctx.progress = ScanProgress::default();

    let records = load_hotels(source, city_ids, country_id, ctx).await?;

    let mut seen = BTreeSet::new();
    let unique: Vec<&HotelRecord> = records.iter().filter(|r| seen.insert(r.id)).collect();

    ctx.progress.phase = ScanPhase::Enriching;
    ctx.progress.to_enrich = unique.len();
    ctx.progress.percent = 40;
    ctx.report();
    tracing::info!(hotels = unique.len(), "Checking descriptions");

    let mut issues = Vec::new();
    for (done, record) in unique.iter().enumerate() {
        ctx.check_cancelled()?;
        if let Some(info) = cached_info(source, &mut ctx.cache, record.id).await {
            let flagged = info
                .description
                .as_deref()
                .is_some_and(|d| d.contains(DESCRIPTION_ERROR_MARKER));
            if flagged {
                issues.push(DescriptionIssue {
                    hotel_id: record.id,
                    name: record.name.clone(),
                    stars: info.stars.clone().unwrap_or_default(),
                    reason: format!("Contains '{}'", DESCRIPTION_ERROR_MARKER),
                });
            }
        }
        ctx.progress.enriched = done + 1;
        ctx.progress.percent = enrichment_percent(done + 1, unique.len());
        ctx.report();
    }

    ctx.progress.phase = ScanPhase::Done;
    ctx.progress.flags_found = issues.len();
    ctx.progress.percent = 100;
    ctx.report();
    tracing::info!(issues = issues.len(), "Description check finished");

    Ok(issues)
}

/// Fetch every page of every city, skipping malformed entries
async fn load_hotels<S>(
    source: &S,
    city_ids: &[u64],
    country_id: Option<u64>,
    ctx: &mut ScanContext,
) -> ScanResult<Vec<HotelRecord>>
where
    S: CatalogSource + ?Sized,
{
    let per_page = ctx.per_page;
    let mut records = Vec::new();

    for &city_id in city_ids {
        let mut page = 1u32;
        loop {
            ctx.check_cancelled()?;
            let batch = source
                .hotels_page(city_id, country_id, page, per_page)
                .await?;
            let batch_len = batch.len();

            for raw in batch {
                match raw.into_record() {
                    Ok(record) => records.push(record),
                    Err(e) => tracing::warn!(city_id, error = %e, "Skipping hotel"),
                }
            }

            ctx.progress.hotels_loaded = records.len();
            ctx.progress.percent = loading_percent(records.len());
            ctx.report();

            if batch_len < per_page as usize {
                break;
            }
            page += 1;
        }
        tracing::debug!(city_id, pages = page, total = records.len(), "City loaded");
    }

    Ok(records)
}

/// Cached `HotelInfo`; fetch failures are logged and read as "no info"
async fn cached_info<S>(source: &S, cache: &mut EnrichmentCache, id: HotelId) -> Option<HotelInfo>
where
    S: CatalogSource + ?Sized,
{
    if let Some(info) = cache.get(id) {
        return Some(info.clone());
    }
    match source.hotel_info(id).await {
        Ok(info) => {
            cache.insert(id, info.clone());
            Some(info)
        }
        Err(e) => {
            tracing::warn!(hotel_id = id, error = %e, "hotel_info fetch failed");
            None
        }
    }
}
