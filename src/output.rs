// Console presentation: markdown tables for the dashboard sections and a
// JSON rendering of the view model for external chart front ends.
use crate::loader::LoadReport;
use crate::types::{
    DashboardView, DetailRow, KpiRow, Kpis, ProductRow, ProductSummary, TopEntry, TopRow,
};
use crate::util::{format_int, format_number, wrap_label_with};
use tabled::{settings::Style, Table, Tabled};

pub fn view_json(view: &DashboardView) -> serde_json::Result<String> {
    serde_json::to_string_pretty(view)
}

pub fn render_table<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    match render_table(rows, max_rows) {
        Some(table_str) => println!("{}\n", table_str),
        None => println!("(no rows)\n"),
    }
}

pub fn top_rows(entries: &[TopEntry], label_width: usize) -> Vec<TopRow> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, e)| TopRow {
            rank: idx + 1,
            product: wrap_label_with(&e.product, label_width, "\n"),
            value: format_number(e.value, 2),
        })
        .collect()
}

pub fn product_rows(rows: &[ProductSummary]) -> Vec<ProductRow> {
    rows.iter()
        .map(|r| ProductRow {
            product: r.product.clone(),
            sales: format_number(r.sales, 2),
            profit: format_number(r.profit, 2),
            quantity: format_int(r.quantity),
        })
        .collect()
}

pub fn detail_rows(rows: &[DetailRow]) -> Vec<ProductRow> {
    let fmt = |v: Option<f64>| v.map(|v| format_number(v, 2)).unwrap_or_default();
    rows.iter()
        .map(|r| ProductRow {
            product: r.product.clone(),
            sales: fmt(r.sales),
            profit: fmt(r.profit),
            quantity: r.quantity.map(format_int).unwrap_or_default(),
        })
        .collect()
}

pub fn kpi_rows(kpis: &Kpis) -> Vec<KpiRow> {
    let row = |metric: &str, value: String| KpiRow {
        metric: metric.to_string(),
        value,
    };
    vec![
        row("Total Sales", format_number(kpis.total_sales, 2)),
        row("Total Profit", format_number(kpis.total_profit, 2)),
        row("Units Sold", format_int(kpis.total_quantity)),
        row("Orders", format_int(kpis.orders)),
        row("Avg Discount", format!("{}%", format_number(kpis.avg_discount * 100.0, 1))),
        row("Avg Days to Ship", format_number(kpis.avg_ship_days, 1)),
    ]
}

pub fn print_load_report(report: &LoadReport) {
    println!(
        "Processing dataset... ({} rows read, {} kept)",
        format_int(report.total_rows),
        format_int(report.kept_rows)
    );
    if report.duplicate_rows > 0 {
        println!(
            "Note: {} duplicate rows removed.",
            format_int(report.duplicate_rows)
        );
    }
    if report.rescaled_discounts > 0 {
        println!(
            "Info: {} discounts given as percentages were rescaled.",
            format_int(report.rescaled_discounts)
        );
    }
    if report.unparsed_order_dates + report.unparsed_ship_dates > 0 {
        println!(
            "Note: {} order dates and {} ship dates could not be read.",
            format_int(report.unparsed_order_dates),
            format_int(report.unparsed_ship_dates)
        );
    }
    for (from, to) in &report.schema.merged {
        println!("Info: column '{}' merged into '{}'.", from, to);
    }
    println!();
}

pub fn print_dashboard(view: &DashboardView, label_width: usize, preview_rows: usize) {
    println!("Product Sales and Profit Analysis");
    println!("({} records match the current filters)\n", format_int(view.records));
    if view.empty {
        println!("No records match the current filters.\n");
        return;
    }

    preview_table_rows(&kpi_rows(&view.kpis), usize::MAX);

    println!("Top {} Best-Selling Products\n", view.top_sales.len());
    preview_table_rows(&top_rows(&view.top_sales, label_width), usize::MAX);

    println!("Top {} Products by Profit\n", view.top_profit.len());
    preview_table_rows(&top_rows(&view.top_profit, label_width), usize::MAX);

    println!("Details for Top Best-Selling Products\n");
    preview_table_rows(&detail_rows(&view.top_sales_details), preview_rows);

    println!("Sales vs Profit by Product\n");
    preview_table_rows(&product_rows(&view.products), preview_rows);

    println!(
        "Map: {} points ({} products charted)\n",
        format_int(view.map_points.len()),
        format_int(view.products.len())
    );
}
