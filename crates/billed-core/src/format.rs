//! Display formatting for bill dates and statuses

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

use crate::error::CoreError;
use crate::models::{Bill, DisplayBill};
use crate::types::BillStatus;

/// Canonical display format: `YYYY-MM-DD`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse the date forms the store hands out
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    let s = date_str.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Format a raw bill date as `YYYY-MM-DD`
pub fn format_date(date_str: &str) -> Result<String, CoreError> {
    parse_date(date_str)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .ok_or_else(|| CoreError::InvalidFormat {
            message: format!("invalid date '{}'", date_str),
        })
}

/// Display label of a raw status, `None` for unknown values
pub fn format_status(status: &str) -> Option<&'static str> {
    status.parse::<BillStatus>().ok().map(|s| s.label())
}

/// Most recent first ordering of two raw bill dates; unparseable dates go last
pub fn cmp_date_desc(a: &str, b: &str) -> Ordering {
    parse_date(b).cmp(&parse_date(a))
}

/// Sort bills most recent first.
///
/// The sort is stable: bills sharing a date keep their relative order.
pub fn sort_by_date_desc(bills: &mut [Bill]) {
    bills.sort_by(|a, b| cmp_date_desc(&a.date, &b.date));
}

/// Build the display form of a bill.
///
/// A date that fails to format is kept raw so one corrupt record does not
/// take the whole list down.
pub fn display_bill(bill: Bill) -> DisplayBill {
    let display_date = match format_date(&bill.date) {
        Ok(date) => date,
        Err(e) => {
            log::warn!("bill {}: {}, keeping raw date", bill.id, e);
            bill.date.clone()
        }
    };
    let display_status = format_status(&bill.status).map(str::to_string);
    DisplayBill {
        bill,
        display_date,
        display_status,
    }
}
