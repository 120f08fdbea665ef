use serde::de::{self, Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One user-entered expense as stored upstream.
///
/// Records come from a free-form document store, so no field is trusted:
/// `amount` coerces to 0.0 when absent or non-numeric, `date` stays a raw
/// string (the aggregator decides whether it parses), and `category` may be
/// absent or empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseRecord {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
}

impl ExpenseRecord {
    /// The category label, if present and non-empty.
    pub fn category_label(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

/// Which aggregation the caller wants: current-year monthly totals truncated
/// at today, or full-history totals grouped by calendar year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Monthly,
    Yearly,
}

/// Total for one calendar year. The year is kept as a label, not a number:
/// downstream ordering is by string comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearTotal {
    pub year: String,
    pub total: f64,
}

/// Derived output of one aggregation pass. Recomputed from scratch on every
/// fetch; never mutated incrementally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseAnalysis {
    /// Month-indexed sums (0 = January) for the current calendar year,
    /// truncated at today. Slots after the current month are always zero.
    pub monthly_totals: [f64; 12],
    /// Sum of the truncated monthly totals.
    pub yearly_total: f64,
    /// Per-category sums over the entire input list. Never date-filtered,
    /// in either view mode.
    pub category_totals: HashMap<String, f64>,
    /// Present only in yearly mode: one entry per calendar year in the data,
    /// ascending by year label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yearly_totals: Option<Vec<YearTotal>>,
    /// Percentage delta of the current month vs the previous one. `None` in
    /// January, when there is no previous slot in the array.
    pub monthly_change: Option<f64>,
}

/// Accepts a JSON number, a numeric string, or anything else at all; every
/// non-numeric shape coerces to 0.0 rather than failing deserialization.
fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    struct AmountVisitor;

    impl<'de> de::Visitor<'de> for AmountVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a number, a numeric string, or any coercible value")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(if v.is_finite() { v } else { 0.0 })
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            Ok(v.trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .unwrap_or(0.0))
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_none<E: de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<f64, D2::Error> {
            d.deserialize_any(AmountVisitor)
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<f64, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(0.0)
        }

        fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<f64, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(0.0)
        }
    }

    deserializer.deserialize_any(AmountVisitor)
}
