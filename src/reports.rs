use crate::filter::{filter_records, FilterSelection};
use crate::geo;
use crate::types::{
    DashboardView, Dataset, DetailRow, Kpis, Measure, OrderRecord, ProductSummary, TopEntry,
};
use crate::util::{average, days_diff, wrap_label};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_LABEL_WIDTH: usize = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub top_n: usize,
    pub label_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            label_width: DEFAULT_LABEL_WIDTH,
        }
    }
}

/// Sum `measure` per product name, in first-seen order.
fn group_sums<'a, I>(records: I, measure: Measure) -> Vec<(String, f64)>
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut sums: Vec<(String, f64)> = Vec::new();
    for r in records {
        let value = r.measure(measure);
        match index.get(r.product_name.as_str()) {
            Some(&i) => sums[i].1 += value,
            None => {
                index.insert(r.product_name.as_str(), sums.len());
                sums.push((r.product_name.clone(), value));
            }
        }
    }
    sums
}

/// The `n` products with the largest summed `measure`, largest first.
///
/// Missing values count as zero. The sort is stable, so equal sums keep the
/// order in which their products first appear in `records`.
pub fn top_n<'a, I>(records: I, measure: Measure, n: usize) -> Vec<(String, f64)>
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    let mut sums = group_sums(records, measure);
    sums.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    sums.truncate(n);
    sums
}

/// [`top_n`] with chart labels attached.
pub fn top_entries<'a, I>(records: I, measure: Measure, n: usize, label_width: usize) -> Vec<TopEntry>
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    top_n(records, measure, n)
        .into_iter()
        .map(|(product, value)| TopEntry {
            label: wrap_label(&product, label_width),
            product,
            value,
        })
        .collect()
}

/// Sales and profit per product side by side, for the scatter view.
pub fn product_summary<'a, I>(records: I) -> Vec<ProductSummary>
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut rows: Vec<ProductSummary> = Vec::new();
    for r in records {
        let i = *index.entry(r.product_name.as_str()).or_insert_with(|| {
            rows.push(ProductSummary {
                product: r.product_name.clone(),
                sales: 0.0,
                profit: 0.0,
                quantity: 0,
                rows: 0,
            });
            rows.len() - 1
        });
        let row = &mut rows[i];
        row.sales += r.sales.unwrap_or(0.0);
        row.profit += r.profit.unwrap_or(0.0);
        row.quantity += r.quantity.unwrap_or(0);
        row.rows += 1;
    }
    rows
}

/// Every record whose product is among `top`, in record order.
pub fn top_details<'a, I>(records: I, top: &[TopEntry]) -> Vec<DetailRow>
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    let names: HashSet<&str> = top.iter().map(|t| t.product.as_str()).collect();
    records
        .into_iter()
        .filter(|r| names.contains(r.product_name.as_str()))
        .map(|r| DetailRow {
            product: r.product_name.clone(),
            sales: r.sales,
            profit: r.profit,
            quantity: r.quantity,
        })
        .collect()
}

pub fn kpis(records: &[&OrderRecord]) -> Kpis {
    let orders: HashSet<&str> = records
        .iter()
        .map(|r| r.order_id.as_str())
        .filter(|id| !id.is_empty())
        .collect();
    let discounts: Vec<f64> = records.iter().filter_map(|r| r.discount).collect();
    let ship_days: Vec<f64> = records
        .iter()
        .filter_map(|r| match (r.order_date, r.ship_date) {
            (Some(o), Some(s)) => Some(days_diff(o, s)),
            _ => None,
        })
        .collect();
    Kpis {
        total_sales: records.iter().map(|r| r.measure(Measure::Sales)).sum(),
        total_profit: records.iter().map(|r| r.measure(Measure::Profit)).sum(),
        total_quantity: records.iter().map(|r| r.quantity.unwrap_or(0)).sum(),
        orders: orders.len(),
        avg_discount: average(&discounts),
        avg_ship_days: average(&ship_days),
    }
}

/// Filter, aggregate and package one dashboard render.
pub fn render(dataset: &Dataset, selection: &FilterSelection, options: RenderOptions) -> DashboardView {
    let filtered = filter_records(&dataset.records, selection);
    let records = || filtered.iter().copied();

    let top_sales = top_entries(records(), Measure::Sales, options.top_n, options.label_width);
    let top_profit = top_entries(records(), Measure::Profit, options.top_n, options.label_width);
    let top_sales_details = top_details(records(), &top_sales);

    DashboardView {
        records: filtered.len(),
        empty: filtered.is_empty(),
        kpis: kpis(&filtered),
        products: product_summary(records()),
        map_points: geo::map_points(records(), dataset.has_coordinates),
        top_sales,
        top_profit,
        top_sales_details,
    }
}
