/// Query-time aggregation over a user's emissions
///
/// Running totals (`users.total_scans`, `users.total_co2`) are maintained on
/// write by [`crate::models::emission::Emission`]. Everything here is derived
/// on read from rows fetched by the record store, and is pure so it can be
/// tested without a database.
///
/// # Modules
///
/// - [`period`]: reporting periods, windows and parameter parsing
/// - [`breakdown`]: per-category totals and chart slices
/// - [`dashboard`]: period metrics and trend series
///
/// All sums use `carbon_value * quantity`, matching the running totals.

pub mod breakdown;
pub mod dashboard;
pub mod period;

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::emission::Emission;

/// Converts grams to kilograms
pub fn kilograms(grams: f64) -> f64 {
    grams / 1000.0
}

/// Summed emissions for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotal {
    pub date: NaiveDate,

    #[serde(rename = "totalCO2")]
    pub total_co2: f64,

    pub item_count: usize,
}

/// A day of history with its emissions
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyHistory {
    #[serde(flatten)]
    pub total: DailyTotal,
    pub emissions: Vec<Emission>,
}

/// Sums the emissions recorded on `date`
pub fn daily_total(emissions: &[Emission], date: NaiveDate) -> DailyTotal {
    let (total_co2, item_count) = emissions
        .iter()
        .filter(|e| e.date == date)
        .fold((0.0, 0), |(sum, n), e| (sum + e.total_carbon(), n + 1));

    DailyTotal {
        date,
        total_co2,
        item_count,
    }
}

/// Groups emissions by day, newest day first
///
/// Emissions keep their input order within a day.
pub fn group_by_date(emissions: Vec<Emission>) -> Vec<DailyHistory> {
    let mut days: BTreeMap<NaiveDate, Vec<Emission>> = BTreeMap::new();
    for emission in emissions {
        days.entry(emission.date).or_default().push(emission);
    }

    days.into_iter()
        .rev()
        .map(|(date, emissions)| DailyHistory {
            total: DailyTotal {
                date,
                total_co2: emissions.iter().map(Emission::total_carbon).sum(),
                item_count: emissions.len(),
            },
            emissions,
        })
        .collect()
}

/// Share of a daily goal, rounded to a whole percent
pub fn percent_of_goal(total_co2: f64, daily_goal: f64) -> i64 {
    if daily_goal > 0.0 {
        (total_co2 / daily_goal * 100.0).round() as i64
    } else {
        0
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, TimeZone, Utc};
    use sqlx::types::Json;
    use uuid::Uuid;

    use crate::models::category::Category;
    use crate::models::emission::{derive_date, Emission};

    /// Builds an in-memory emission scanned at 2024-03-15 12:00 UTC
    pub fn emission(name: &str, category: Category, carbon_value: f64) -> Emission {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        emission_at(name, category, carbon_value, at)
    }

    pub fn emission_at(
        name: &str,
        category: Category,
        carbon_value: f64,
        scanned_at: DateTime<Utc>,
    ) -> Emission {
        Emission {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            object_name: name.to_string(),
            category,
            carbon_value,
            carbon_footprint: crate::impact::format_carbon_footprint(carbon_value),
            lifecycle: Vec::new(),
            explanation: String::new(),
            alternatives: Json(Vec::new()),
            quantity: 1,
            image_url: None,
            notes: None,
            scanned_at,
            date: derive_date(scanned_at),
            created_at: scanned_at,
            updated_at: scanned_at,
        }
    }
}
