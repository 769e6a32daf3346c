// Sidebar filter state and the record filter it drives.
use crate::dates::parse_date_text;
use crate::types::OrderRecord;
use chrono::NaiveDate;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeSet;

/// Inclusive date range; bounds given in the wrong order are swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start > end {
            debug!("Swapping inverted date range {} .. {}", start, end);
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Current filter choices. `None` on a dimension means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub date_range: Option<DateRange>,
    pub region: Option<String>,
    pub state: Option<String>,
}

/// Read a widget value, mapping the "all" sentinels and blanks to `None`.
pub fn parse_choice(value: &str) -> Option<String> {
    let value = value.trim();
    match value.to_lowercase().as_str() {
        "" | "all" | "todas" | "todos" => None,
        _ => Some(value.to_string()),
    }
}

impl FilterSelection {
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = parse_choice(region);
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = parse_choice(state);
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }

    /// Apply the typed date widget. Two blank inputs leave the date filter
    /// off; otherwise a range is always set, with a blank or unreadable side
    /// falling back to its entry in `bounds`. A range equal to `bounds` still
    /// drops records without an order date.
    pub fn with_date_input(mut self, start: &str, end: &str, bounds: (NaiveDate, NaiveDate)) -> Self {
        if start.trim().is_empty() && end.trim().is_empty() {
            self.date_range = None;
            return self;
        }
        let side = |text: &str, default: NaiveDate| {
            parse_date_text(text).unwrap_or_else(|| {
                if !text.trim().is_empty() {
                    warn!("Unreadable date '{}', using {}", text.trim(), default);
                }
                default
            })
        };
        self.date_range = Some(DateRange::new(side(start, bounds.0), side(end, bounds.1)));
        self
    }

    /// Reset the state choice when it is not offered for the selected region.
    pub fn reconcile(&mut self, records: &[OrderRecord]) {
        if let Some(state) = &self.state {
            let options = state_options(records, self.region.as_deref());
            if !options.iter().any(|s| s == state) {
                debug!(
                    "State '{}' not present in region {:?}; resetting to all",
                    state, self.region
                );
                self.state = None;
            }
        }
    }

    pub fn matches(&self, record: &OrderRecord) -> bool {
        if let Some(range) = &self.date_range {
            match record.order_date {
                Some(d) if range.contains(d) => {}
                _ => return false,
            }
        }
        if let Some(region) = &self.region {
            if record.region != *region {
                return false;
            }
        }
        if let Some(state) = &self.state {
            if record.state != *state {
                return false;
            }
        }
        true
    }
}

/// Records matching every active predicate, in dataset order.
///
/// An empty result is valid; it is only logged.
pub fn filter_records<'a>(records: &'a [OrderRecord], selection: &FilterSelection) -> Vec<&'a OrderRecord> {
    let filtered: Vec<&OrderRecord> = records.iter().filter(|r| selection.matches(r)).collect();
    if filtered.is_empty() && !records.is_empty() {
        warn!("No records match the current filter selection");
    }
    filtered
}

/// Distinct regions, sorted.
pub fn region_options(records: &[OrderRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.region.as_str())
        .filter(|r| !r.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Distinct states within `region` (all regions for `None`), sorted.
pub fn state_options(records: &[OrderRecord], region: Option<&str>) -> Vec<String> {
    records
        .iter()
        .filter(|r| region.map_or(true, |reg| r.region == reg))
        .map(|r| r.state.as_str())
        .filter(|s| !s.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Earliest and latest order date, for the default date widget.
pub fn date_bounds(records: &[OrderRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = records.iter().filter_map(|r| r.order_date);
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}
