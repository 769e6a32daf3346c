// Canonical column contract for order spreadsheets.
//
// Upstream files drifted in header casing and spacing over time; everything
// is mapped onto one set of names here, once, at the boundary.
use crate::error::DashboardError;
use crate::table::{Cell, RawTable};
use log::debug;

pub const ORDER_DATE: &str = "Order Date";
pub const SHIP_DATE: &str = "Ship Date";
pub const SALES: &str = "Sales";
pub const PROFIT: &str = "Profit";
pub const QUANTITY: &str = "Quantity";
pub const DISCOUNT: &str = "Discount";
pub const REGION: &str = "Region";
pub const STATE: &str = "State";
pub const CITY: &str = "City";
pub const ORDER_ID: &str = "Order ID";
pub const PRODUCT_NAME: &str = "Product Name";
pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";

pub const CANONICAL_COLUMNS: &[&str] = &[
    ORDER_DATE,
    SHIP_DATE,
    SALES,
    PROFIT,
    QUANTITY,
    DISCOUNT,
    REGION,
    STATE,
    CITY,
    ORDER_ID,
    PRODUCT_NAME,
    LATITUDE,
    LONGITUDE,
];

pub const REQUIRED_COLUMNS: &[&str] = &[ORDER_DATE, PRODUCT_NAME];

// Short forms seen in exports, keyed by `header_key`.
const ALIASES: &[(&str, &str)] = &[
    ("lat", LATITUDE),
    ("lng", LONGITUDE),
    ("lon", LONGITUDE),
    ("long", LONGITUDE),
    ("product", PRODUCT_NAME),
    ("orderno", ORDER_ID),
];

/// Comparison key for headers: lowercase alphanumerics only.
pub fn header_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Canonical name for a header, if it is one of the known columns.
pub fn canonical_name(header: &str) -> Option<&'static str> {
    let key = header_key(header);
    CANONICAL_COLUMNS
        .iter()
        .copied()
        .find(|c| header_key(c) == key)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == key)
                .map(|(_, canonical)| *canonical)
        })
}

/// What normalization changed, for load diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    pub renamed: Vec<(String, String)>,
    pub merged: Vec<(String, String)>,
}

/// Trim and canonicalize headers, then fold duplicate columns into one.
///
/// When several headers map to the same canonical name, the one spelled
/// exactly like the canonical name wins (else the first); the others only
/// fill cells the winner leaves empty and are then dropped.
pub fn normalize(table: RawTable) -> Result<(RawTable, SchemaReport), DashboardError> {
    let RawTable { headers, mut rows } = table;
    let mut report = SchemaReport::default();

    let trimmed: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    let targets: Vec<String> = trimmed
        .iter()
        .map(|h| canonical_name(h).map(str::to_string).unwrap_or_else(|| h.clone()))
        .collect();

    // Output order follows first appearance of each target name.
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for (idx, target) in targets.iter().enumerate() {
        match groups.iter_mut().find(|(name, _)| name == target) {
            Some((_, members)) => members.push(idx),
            None => groups.push((target.clone(), vec![idx])),
        }
    }

    for (idx, (original, target)) in headers.iter().zip(&targets).enumerate() {
        if original != target {
            debug!("Column {} '{}' -> '{}'", idx, original, target);
            report.renamed.push((original.clone(), target.clone()));
        }
    }

    let mut columns: Vec<usize> = Vec::with_capacity(groups.len());
    for (target, members) in &mut groups {
        if let Some(pos) = members.iter().position(|&i| trimmed[i] == *target) {
            let exact = members.remove(pos);
            members.insert(0, exact);
        }
        let primary = members[0];
        for &alt in &members[1..] {
            for row in rows.iter_mut() {
                if row[primary].is_empty() && !row[alt].is_empty() {
                    row[primary] = std::mem::replace(&mut row[alt], Cell::Empty);
                }
            }
            debug!("Merged column '{}' into '{}'", headers[alt], target);
            report.merged.push((headers[alt].trim().to_string(), target.clone()));
        }
        columns.push(primary);
    }

    let new_headers: Vec<String> = groups.into_iter().map(|(name, _)| name).collect();
    let new_rows: Vec<Vec<Cell>> = rows
        .into_iter()
        .map(|mut row| {
            columns
                .iter()
                .map(|&i| std::mem::replace(&mut row[i], Cell::Empty))
                .collect()
        })
        .collect();
    let table = RawTable::new(new_headers, new_rows);

    for required in REQUIRED_COLUMNS {
        if table.column_index(required).is_none() {
            return Err(DashboardError::MissingColumn(required.to_string()));
        }
    }
    Ok((table, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn header_variants_share_a_key() {
        assert_eq!(canonical_name(" Ship date "), Some(SHIP_DATE));
        assert_eq!(canonical_name("ship Date"), Some(SHIP_DATE));
        assert_eq!(canonical_name("SHIP_DATE"), Some(SHIP_DATE));
        assert_eq!(canonical_name("order id"), Some(ORDER_ID));
        assert_eq!(canonical_name("Lat"), Some(LATITUDE));
        assert_eq!(canonical_name("Segment"), None);
    }

    #[test]
    fn headers_are_trimmed_and_unknown_columns_kept() {
        let table = RawTable::new(
            vec![" Order Date".into(), "Product Name ".into(), " Segment ".into()],
            vec![vec![text("2024-01-01"), text("Pen"), text("Consumer")]],
        );
        let (table, report) = normalize(table).unwrap();
        assert_eq!(table.headers, vec![ORDER_DATE, PRODUCT_NAME, "Segment"]);
        assert_eq!(report.renamed.len(), 3);
        assert!(report.merged.is_empty());
    }

    #[test]
    fn duplicate_date_columns_merge_preferring_canonical() {
        let table = RawTable::new(
            vec![
                "ship date".into(),
                "Order Date".into(),
                "Product Name".into(),
                "Ship Date".into(),
            ],
            vec![
                vec![text("2024-01-09"), text("2024-01-01"), text("Pen"), text("2024-01-05")],
                vec![text("2024-02-09"), text("2024-02-01"), text("Ink"), Cell::Empty],
            ],
        );
        let (table, report) = normalize(table).unwrap();
        assert_eq!(table.headers, vec![SHIP_DATE, ORDER_DATE, PRODUCT_NAME]);
        let ship = table.column_index(SHIP_DATE).unwrap();
        assert_eq!(table.rows[0][ship], text("2024-01-05"));
        assert_eq!(table.rows[1][ship], text("2024-02-09"));
        assert_eq!(report.merged, vec![("ship date".to_string(), SHIP_DATE.to_string())]);
    }

    #[test]
    fn missing_product_name_is_fatal() {
        let table = RawTable::new(vec!["Order Date".into(), "Sales".into()], vec![]);
        let err = normalize(table).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn(ref c) if c == PRODUCT_NAME));
    }

    #[test]
    fn missing_order_date_is_fatal() {
        let table = RawTable::new(vec!["Product Name".into()], vec![]);
        let err = normalize(table).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn(ref c) if c == ORDER_DATE));
    }
}
