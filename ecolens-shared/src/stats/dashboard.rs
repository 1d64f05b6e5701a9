/// Period dashboard metrics and trend series
///
/// Given the emissions of the current and previous windows of a
/// [`Period`], produces headline metrics and a chart series:
///
/// | Period  | Window   | Trend points               |
/// |---------|----------|----------------------------|
/// | weekly  | 7 days   | 7 daily points (weekdays) |
/// | monthly | 30 days  | 4 weekly points (W1..W4)   |
/// | yearly  | 365 days | 6 monthly points (months) |
///
/// Points are ordered oldest to newest and valued in kilograms.

use chrono::{DateTime, Duration, Months, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::breakdown::totals_by_category;
use super::kilograms;
use super::period::Period;
use crate::models::emission::{CategoryTotal, Emission};

/// Placeholder shown when there is no top category or item
pub const NONE_LABEL: &str = "None";

/// Headline numbers for one period
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// "Weekly", "Monthly" or "Yearly"
    pub period: &'static str,

    pub total_scans: usize,
    pub footprint_kg: f64,
    pub previous_scans: usize,
    pub previous_footprint_kg: f64,

    /// Reduction versus the previous window; never negative
    pub improvement_percent: i64,

    pub top_category: String,
    pub top_item: String,
    pub comparison_text: String,
}

/// One point of the trend chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub value: f64,
}

/// Full dashboard payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub metrics: DashboardMetrics,
    pub trend_data: Vec<TrendPoint>,
}

/// Computes dashboard stats at `now`
///
/// `current` must hold the emissions of `period.current_window(now)` and
/// `previous` those of `period.previous_window(now)`.
pub fn compute_dashboard(
    period: Period,
    now: DateTime<Utc>,
    current: &[Emission],
    previous: &[Emission],
) -> DashboardStats {
    let current_co2: f64 = current.iter().map(Emission::total_carbon).sum();
    let previous_co2: f64 = previous.iter().map(Emission::total_carbon).sum();
    let raw_improvement = improvement_percent(previous_co2, current_co2);
    let (top_category, top_item) = top_category_and_item(current);

    DashboardStats {
        metrics: DashboardMetrics {
            period: period.label(),
            total_scans: current.len(),
            footprint_kg: kilograms(current_co2),
            previous_scans: previous.len(),
            previous_footprint_kg: kilograms(previous_co2),
            improvement_percent: raw_improvement.max(0),
            top_category,
            top_item,
            comparison_text: comparison_text(period, raw_improvement, current_co2, previous_co2),
        },
        trend_data: trend_series(period, now, current),
    }
}

/// Signed reduction of `current` relative to `previous`, in whole percent
///
/// Positive means less CO2 than before. Returns 0 without a previous total.
pub fn improvement_percent(previous_co2: f64, current_co2: f64) -> i64 {
    if previous_co2 > 0.0 {
        ((previous_co2 - current_co2) / previous_co2 * 100.0).round() as i64
    } else {
        0
    }
}

fn comparison_text(
    period: Period,
    improvement: i64,
    current_co2: f64,
    previous_co2: f64,
) -> String {
    if improvement > 0 {
        format!("You're {}% better than last {}!", improvement, period.noun())
    } else if improvement < 0 {
        format!("{}% increase from last {}", -improvement, period.noun())
    } else if previous_co2 > 0.0 || current_co2 > 0.0 {
        "Same as last period".to_string()
    } else {
        "Start scanning to track progress!".to_string()
    }
}

/// Finds the category with the highest summed CO2 and its most scanned item
///
/// Categories with equal totals resolve in declaration order; items with
/// equal scan counts resolve to the lexicographically smallest name.
pub fn top_category_and_item(emissions: &[Emission]) -> (String, String) {
    let top = totals_by_category(emissions)
        .into_iter()
        .filter(|t| t.total_co2 > 0.0)
        .fold(None, |best: Option<CategoryTotal>, t| match best {
            Some(b) if b.total_co2 >= t.total_co2 => Some(b),
            _ => Some(t),
        });

    let Some(top) = top else {
        return (NONE_LABEL.to_string(), NONE_LABEL.to_string());
    };

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for emission in emissions.iter().filter(|e| e.category == top.category) {
        *counts.entry(emission.object_name.as_str()).or_default() += 1;
    }

    let mut top_item = NONE_LABEL;
    let mut top_count = 0;
    for (name, count) in counts {
        if count > top_count {
            top_item = name;
            top_count = count;
        }
    }

    (top.category.display_name().to_string(), top_item.to_string())
}

/// Builds the trend chart for a period
pub fn trend_series(period: Period, now: DateTime<Utc>, emissions: &[Emission]) -> Vec<TrendPoint> {
    match period {
        Period::Weekly => {
            let today = now.date_naive();
            (0..7)
                .rev()
                .map(|i| {
                    let day = today - Duration::days(i);
                    let grams: f64 = emissions
                        .iter()
                        .filter(|e| e.date == day)
                        .map(Emission::total_carbon)
                        .sum();
                    TrendPoint {
                        label: day.format("%a").to_string(),
                        value: kilograms(grams),
                    }
                })
                .collect()
        }
        Period::Monthly => (0..4)
            .rev()
            .map(|i| {
                let end = now - Duration::days(7 * i);
                let start = end - Duration::days(7);
                TrendPoint {
                    label: format!("W{}", 4 - i),
                    value: kilograms(sum_between(emissions, start, end)),
                }
            })
            .collect(),
        Period::Yearly => (0..6u32)
            .rev()
            .map(|i| {
                let end = now
                    .checked_sub_months(Months::new(i))
                    .unwrap_or_else(|| now - Duration::days(30 * i64::from(i)));
                let start = end
                    .checked_sub_months(Months::new(1))
                    .unwrap_or_else(|| end - Duration::days(30));
                TrendPoint {
                    label: end.format("%b").to_string(),
                    value: kilograms(sum_between(emissions, start, end)),
                }
            })
            .collect(),
    }
}

/// Sum over `start < scanned_at <= end`
fn sum_between(emissions: &[Emission], start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    emissions
        .iter()
        .filter(|e| e.scanned_at > start && e.scanned_at <= end)
        .map(Emission::total_carbon)
        .sum()
}
