use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

/// One cleaned row of the order spreadsheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub product_name: String,
    pub sales: Option<f64>,
    pub profit: Option<f64>,
    pub quantity: Option<i64>,
    /// Fraction in `[0, 1]` once loaded.
    pub discount: Option<f64>,
    pub order_date: Option<NaiveDate>,
    pub ship_date: Option<NaiveDate>,
    pub region: String,
    pub state: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl OrderRecord {
    /// Empty record for a product; handy when building datasets by hand.
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            order_id: String::new(),
            product_name: product_name.into(),
            sales: None,
            profit: None,
            quantity: None,
            discount: None,
            order_date: None,
            ship_date: None,
            region: String::new(),
            state: String::new(),
            city: String::new(),
            latitude: None,
            longitude: None,
        }
    }

    pub fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Sales => self.sales.unwrap_or(0.0),
            Measure::Profit => self.profit.unwrap_or(0.0),
            Measure::Quantity => self.quantity.unwrap_or(0) as f64,
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Cleaned, deduplicated records from one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub source: PathBuf,
    pub records: Vec<OrderRecord>,
    /// At least one record carries its own latitude/longitude.
    pub has_coordinates: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Measure {
    Sales,
    Profit,
    Quantity,
}

/// One bar of a top-N chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopEntry {
    pub product: String,
    pub value: f64,
    /// Product name wrapped for the chart axis.
    pub label: String,
}

/// Per-product totals; one point of the sales/profit scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub product: String,
    pub sales: f64,
    pub profit: f64,
    pub quantity: i64,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    pub product: String,
    pub sales: Option<f64>,
    pub profit: Option<f64>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Kpis {
    pub total_sales: f64,
    pub total_profit: f64,
    pub total_quantity: i64,
    pub orders: usize,
    pub avg_discount: f64,
    pub avg_ship_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
    pub weight: f64,
}

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub records: usize,
    pub empty: bool,
    pub kpis: Kpis,
    pub top_sales: Vec<TopEntry>,
    pub top_profit: Vec<TopEntry>,
    pub products: Vec<ProductSummary>,
    pub top_sales_details: Vec<DetailRow>,
    pub map_points: Vec<MapPoint>,
}

#[derive(Debug, Tabled, Clone)]
pub struct TopRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "Product Name")]
    pub product: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct ProductRow {
    #[tabled(rename = "Product Name")]
    pub product: String,
    #[tabled(rename = "Sales")]
    pub sales: String,
    #[tabled(rename = "Profit")]
    pub profit: String,
    #[tabled(rename = "Quantity")]
    pub quantity: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct KpiRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}
