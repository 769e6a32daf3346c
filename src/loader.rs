use crate::dates;
use crate::error::DashboardError;
use crate::schema::{self, SchemaReport};
use crate::table::{self, Cell, RawTable};
use crate::types::{Dataset, OrderRecord};
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub duplicate_rows: usize,
    pub kept_rows: usize,
    pub rescaled_discounts: usize,
    pub unparsed_order_dates: usize,
    pub unparsed_ship_dates: usize,
    pub schema: SchemaReport,
}

/// Storage for loaded datasets, keyed by source path.
pub trait DatasetCache: Send + Sync {
    fn get(&self, path: &Path) -> Option<(Arc<Dataset>, LoadReport)>;
    fn insert(&self, path: PathBuf, dataset: Arc<Dataset>, report: LoadReport);
    fn remove(&self, path: &Path) -> bool;
    fn clear(&self);
}

/// Process-lifetime in-memory cache. A file changed on disk is not noticed
/// until its entry is invalidated.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<PathBuf, (Arc<Dataset>, LoadReport)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while the lock was held cannot leave the map half-written, so a
    // poisoned lock is still safe to use.
    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, (Arc<Dataset>, LoadReport)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DatasetCache for MemoryCache {
    fn get(&self, path: &Path) -> Option<(Arc<Dataset>, LoadReport)> {
        self.entries()
            .get(path)
            .map(|(data, report)| (Arc::clone(data), report.clone()))
    }

    fn insert(&self, path: PathBuf, dataset: Arc<Dataset>, report: LoadReport) {
        self.entries().insert(path, (dataset, report));
    }

    fn remove(&self, path: &Path) -> bool {
        self.entries().remove(path).is_some()
    }

    fn clear(&self) {
        self.entries().clear();
    }
}

/// Loads and cleans order spreadsheets, memoized per path.
pub struct DataLoader<C: DatasetCache = MemoryCache> {
    cache: C,
}

impl DataLoader<MemoryCache> {
    pub fn new() -> Self {
        Self::with_cache(MemoryCache::new())
    }
}

impl Default for DataLoader<MemoryCache> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: DatasetCache> DataLoader<C> {
    pub fn with_cache(cache: C) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Return the cleaned dataset for `path`, reading the file only on the
    /// first call for that path.
    pub fn load(&self, path: &Path) -> Result<(Arc<Dataset>, LoadReport), DashboardError> {
        if let Some(hit) = self.cache.get(path) {
            debug!("Cache hit for {}", path.display());
            return Ok(hit);
        }
        let (dataset, report) = load_and_clean(path)?;
        info!(
            "Loaded {} ({} rows kept of {})",
            path.display(),
            report.kept_rows,
            report.total_rows
        );
        let dataset = Arc::new(dataset);
        self.cache
            .insert(path.to_path_buf(), Arc::clone(&dataset), report.clone());
        Ok((dataset, report))
    }

    /// Drop the cached entry so the next `load` re-reads the file.
    pub fn invalidate(&self, path: &Path) -> bool {
        let removed = self.cache.remove(path);
        if removed {
            info!("Invalidated cached data for {}", path.display());
        }
        removed
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

/// Rescale whole-number percentages (1, 100] to fractions; anything else is
/// returned unchanged, so applying it twice is a no-op.
pub fn normalize_discount(discount: f64) -> f64 {
    if discount > 1.0 && discount <= 100.0 {
        discount / 100.0
    } else {
        discount
    }
}

/// Drop rows equal to an earlier row, keeping first occurrences in order.
pub fn dedupe_rows(rows: Vec<Vec<Cell>>) -> (Vec<Vec<Cell>>, usize) {
    let mut seen: HashSet<Vec<Cell>> = HashSet::with_capacity(rows.len());
    let total = rows.len();
    let unique: Vec<Vec<Cell>> = rows
        .into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect();
    let dropped = total - unique.len();
    (unique, dropped)
}

pub fn load_and_clean(path: &Path) -> Result<(Dataset, LoadReport), DashboardError> {
    let raw = table::read_table(path)?;
    let (mut dataset, report) = clean_table(raw)?;
    dataset.source = path.to_path_buf();
    Ok((dataset, report))
}

/// Normalize, deduplicate and type a raw table.
pub fn clean_table(raw: RawTable) -> Result<(Dataset, LoadReport), DashboardError> {
    let total_rows = raw.rows.len();
    let (table, schema_report) = schema::normalize(raw)?;
    let (rows, duplicate_rows) = dedupe_rows(table.rows);
    let table = RawTable::new(table.headers, rows);

    let idx = |name: &str| table.column_index(name);
    let order_idx = idx(schema::ORDER_DATE)
        .ok_or_else(|| DashboardError::MissingColumn(schema::ORDER_DATE.to_string()))?;
    let product_idx = idx(schema::PRODUCT_NAME)
        .ok_or_else(|| DashboardError::MissingColumn(schema::PRODUCT_NAME.to_string()))?;

    let order_dates = dates::coerce_required(schema::ORDER_DATE, table.column(order_idx))?;
    let ship_dates = match idx(schema::SHIP_DATE) {
        Some(i) => dates::coerce_column(table.column(i)),
        None => vec![None; table.rows.len()],
    };

    let sales_idx = idx(schema::SALES);
    let profit_idx = idx(schema::PROFIT);
    let quantity_idx = idx(schema::QUANTITY);
    let discount_idx = idx(schema::DISCOUNT);
    let region_idx = idx(schema::REGION);
    let state_idx = idx(schema::STATE);
    let city_idx = idx(schema::CITY);
    let order_id_idx = idx(schema::ORDER_ID);
    let lat_idx = idx(schema::LATITUDE);
    let lon_idx = idx(schema::LONGITUDE);

    let text = |row: &[Cell], i: Option<usize>| i.map(|i| row[i].as_text()).unwrap_or_default();
    let number = |row: &[Cell], i: Option<usize>| i.and_then(|i| row[i].as_f64());

    let mut rescaled_discounts = 0usize;
    let mut records = Vec::with_capacity(table.rows.len());
    for (n, row) in table.rows.iter().enumerate() {
        let row = row.as_slice();
        let discount = number(row, discount_idx).map(|d| {
            let normalized = normalize_discount(d);
            if normalized != d {
                rescaled_discounts += 1;
            }
            normalized
        });
        records.push(OrderRecord {
            order_id: text(row, order_id_idx),
            product_name: row[product_idx].as_text(),
            sales: number(row, sales_idx),
            profit: number(row, profit_idx),
            quantity: quantity_idx.and_then(|i| row[i].as_i64()),
            discount,
            order_date: order_dates[n],
            ship_date: ship_dates[n],
            region: text(row, region_idx),
            state: text(row, state_idx),
            city: text(row, city_idx),
            latitude: number(row, lat_idx),
            longitude: number(row, lon_idx),
        });
    }

    let has_coordinates = records.iter().any(|r| r.coordinates().is_some());
    let unparsed_order_dates = records.iter().filter(|r| r.order_date.is_none()).count();
    let unparsed_ship_dates = match idx(schema::SHIP_DATE) {
        Some(i) => table
            .column(i)
            .zip(&records)
            .filter(|(cell, r)| !cell.is_empty() && r.ship_date.is_none())
            .count(),
        None => 0,
    };

    let report = LoadReport {
        total_rows,
        duplicate_rows,
        kept_rows: records.len(),
        rescaled_discounts,
        unparsed_order_dates,
        unparsed_ship_dates,
        schema: schema_report,
    };
    let dataset = Dataset {
        source: PathBuf::new(),
        records,
        has_coordinates,
    };
    Ok((dataset, report))
}
