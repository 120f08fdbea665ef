//! Expense aggregation.
//!
//! Two quirks of the observed behavior are kept on purpose and should not be
//! "fixed" without a data migration:
//! - category totals sum over the entire record list in both view modes,
//!   ignoring the date truncation applied to monthly/yearly totals;
//! - yearly buckets are ordered by their year *label* as a string, which is
//!   only correct for 4-digit positive years.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate};

use models::{ExpenseAnalysis, ExpenseRecord, ViewMode, YearTotal};

/// Aggregates a flat record list into the derived totals for one view mode.
///
/// `today` is the caller's wall-clock date; it is a parameter rather than read
/// internally so the whole computation is deterministic. The function is total:
/// malformed dates drop a record from time-based totals only, and non-finite
/// amounts count as zero. No input produces an error.
pub fn analyze(records: &[ExpenseRecord], view: ViewMode, today: NaiveDate) -> ExpenseAnalysis {
    let mut analysis = match view {
        ViewMode::Monthly => analyze_monthly(records, today),
        ViewMode::Yearly => analyze_yearly(records),
    };
    // Second stage: the change derives from the finished totals array.
    analysis.monthly_change = monthly_change(&analysis.monthly_totals, today);
    analysis
}

/// Current-year totals per month, truncated at today, plus the yearly sum.
fn analyze_monthly(records: &[ExpenseRecord], today: NaiveDate) -> ExpenseAnalysis {
    let mut monthly = [0.0f64; 12];
    let mut yearly = 0.0f64;
    let mut categories: HashMap<String, f64> = HashMap::new();

    let current_month = today.month0() as usize;
    for record in records {
        let amount = coerce_amount(record.amount);

        if let Some(date) = record.date.as_deref().and_then(parse_date) {
            let on_or_before_today = date.month0() < today.month0()
                || (date.month0() == today.month0() && date.day() <= today.day());
            if date.year() == today.year() && on_or_before_today {
                monthly[date.month0() as usize] += amount;
                yearly += amount;
            }
        }

        // Categories accrue regardless of date validity or year.
        if let Some(label) = record.category_label() {
            *categories.entry(label.to_string()).or_insert(0.0) += amount;
        }
    }

    // Redundant with the date guard above; keeps future months zero even if
    // that guard is ever relaxed.
    for slot in monthly.iter_mut().skip(current_month + 1) {
        *slot = 0.0;
    }

    ExpenseAnalysis {
        monthly_totals: monthly,
        yearly_total: yearly,
        category_totals: categories,
        yearly_totals: None,
        monthly_change: None,
    }
}

/// Full-history totals grouped by calendar year. No truncation at today.
fn analyze_yearly(records: &[ExpenseRecord]) -> ExpenseAnalysis {
    // BTreeMap keyed by the year label: iteration order is the string sort
    // the output requires.
    let mut years: BTreeMap<String, f64> = BTreeMap::new();
    let mut categories: HashMap<String, f64> = HashMap::new();

    for record in records {
        let amount = coerce_amount(record.amount);

        if let Some(date) = record.date.as_deref().and_then(parse_date) {
            *years.entry(date.year().to_string()).or_insert(0.0) += amount;
        }

        if let Some(label) = record.category_label() {
            *categories.entry(label.to_string()).or_insert(0.0) += amount;
        }
    }

    let yearly_totals = years
        .into_iter()
        .map(|(year, total)| YearTotal { year, total })
        .collect();

    ExpenseAnalysis {
        monthly_totals: [0.0; 12],
        yearly_total: 0.0,
        category_totals: categories,
        yearly_totals: Some(yearly_totals),
        monthly_change: None,
    }
}

/// Percentage delta between the current month's slot and the previous one.
///
/// `None` in January (no previous slot in the same array) and for slices
/// shorter than two slots. A positive total on a zero base counts as a full
/// 100% increase; two zero months count as no change.
pub fn monthly_change(monthly_totals: &[f64], today: NaiveDate) -> Option<f64> {
    if monthly_totals.len() < 2 {
        return None;
    }
    let current = today.month0() as usize;
    if current == 0 {
        return None;
    }
    let this_month = monthly_totals.get(current).copied().unwrap_or(0.0);
    let last_month = monthly_totals.get(current - 1).copied().unwrap_or(0.0);

    let change = if last_month > 0.0 {
        (this_month - last_month) / last_month * 100.0
    } else if this_month > 0.0 {
        100.0
    } else {
        0.0
    };
    Some(change)
}

/// Loads a JSON array of expense records from disk.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<ExpenseRecord>> {
    let path = path.as_ref();
    let raw =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    let records: Vec<ExpenseRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing records JSON in {}", path.display()))?;
    Ok(records)
}

/// Parses `YYYY-MM-DD`, falling back to a full RFC 3339 datetime. Anything
/// else is treated as "no date".
#[inline]
fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

#[inline]
fn coerce_amount(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
