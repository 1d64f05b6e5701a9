/// Carbon impact formatting and interpretation
///
/// Converts a raw footprint in grams CO2e into display strings and into
/// equivalents relative to an ideal personal footprint:
///
/// | Baseline | Grams CO2e |
/// |----------|------------|
/// | Day      | 11 000     |
/// | Year     | 4 000 000  |
/// | Lifetime | 320 000 000 |
///
/// # Example
///
/// ```
/// use ecolens_shared::impact::{format_carbon_footprint, CarbonImpact, Severity};
///
/// assert_eq!(format_carbon_footprint(82.8), "82.80g CO₂e");
/// assert_eq!(format_carbon_footprint(2500.0), "~2.5kg CO₂e");
///
/// let impact = CarbonImpact::from_grams(11_000.0);
/// assert_eq!(impact.severity, Severity::Moderate);
/// ```

use serde::Serialize;

/// Ideal daily footprint in grams CO2e
pub const IDEAL_DAILY_GRAMS: f64 = 11_000.0;

/// Ideal yearly footprint in grams CO2e
pub const IDEAL_YEARLY_GRAMS: f64 = 4_000_000.0;

/// Ideal lifetime footprint in grams CO2e
pub const IDEAL_LIFETIME_GRAMS: f64 = 320_000_000.0;

/// Formats a number with precision that shrinks as magnitude grows
///
/// Two decimals below 100, one below 1000, none above.
pub fn format_number(value: f64) -> String {
    if value < 100.0 {
        format!("{:.2}", value)
    } else if value < 1000.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.0}", value)
    }
}

/// Formats a gram value as a footprint string
///
/// Values of a kilogram or more are shown approximately in kg.
pub fn format_carbon_footprint(grams: f64) -> String {
    if grams < 1000.0 {
        format!("{}g CO₂e", format_number(grams))
    } else {
        format!("~{:.1}kg CO₂e", grams / 1000.0)
    }
}

/// Average days per month used for month equivalents
const DAYS_PER_MONTH: f64 = 30.44;

/// Impact bucket of a footprint measured in days of an ideal budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Excellent,
    Good,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl Severity {
    /// Buckets a value expressed in ideal days
    pub fn from_days(days: f64) -> Self {
        if days < 0.1 {
            Severity::Excellent
        } else if days < 1.0 {
            Severity::Good
        } else if days < 7.0 {
            Severity::Moderate
        } else if days < 30.0 {
            Severity::High
        } else if days < 90.0 {
            Severity::VeryHigh
        } else {
            Severity::Extreme
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Excellent => "Minimal Impact",
            Severity::Good => "Low Impact",
            Severity::Moderate => "Moderate Impact",
            Severity::High => "High Impact",
            Severity::VeryHigh => "Very High Impact",
            Severity::Extreme => "Extreme Impact",
        }
    }
}

/// Footprint expressed against the ideal baselines
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonImpact {
    pub carbon_value: f64,
    pub carbon_footprint: String,
    pub equivalent_days: f64,
    pub equivalent_weeks: f64,
    pub equivalent_months: f64,
    pub annual_percent: f64,
    pub lifetime_percent: f64,
    pub severity: Severity,
    pub label: &'static str,
    pub description: String,
}

impl CarbonImpact {
    /// Computes equivalents for a footprint in grams
    ///
    /// Negative input is treated as zero.
    pub fn from_grams(grams: f64) -> Self {
        let grams = grams.max(0.0);
        let days = grams / IDEAL_DAILY_GRAMS;
        let annual_percent = grams / IDEAL_YEARLY_GRAMS * 100.0;
        let severity = Severity::from_days(days);

        Self {
            carbon_value: grams,
            carbon_footprint: format_carbon_footprint(grams),
            equivalent_days: days,
            equivalent_weeks: days / 7.0,
            equivalent_months: days / DAYS_PER_MONTH,
            annual_percent,
            lifetime_percent: grams / IDEAL_LIFETIME_GRAMS * 100.0,
            severity,
            label: severity.label(),
            description: describe(severity, days, annual_percent),
        }
    }
}

fn describe(severity: Severity, days: f64, annual_percent: f64) -> String {
    match severity {
        Severity::Excellent => "Less than 2.4 hours of ideal carbon footprint".to_string(),
        Severity::Good => format!(
            "Equivalent to {:.0} hours of ideal carbon footprint",
            days * 24.0
        ),
        Severity::Moderate => format!(
            "Equivalent to {:.1} {} of ideal carbon footprint",
            days,
            if days == 1.0 { "day" } else { "days" }
        ),
        Severity::High => format!(
            "Equivalent to {:.1} weeks of ideal carbon footprint ({:.1}% of annual budget)",
            days / 7.0,
            annual_percent
        ),
        Severity::VeryHigh => format!(
            "Equivalent to {:.1} months of ideal carbon footprint ({:.1}% of annual budget)",
            days / DAYS_PER_MONTH,
            annual_percent
        ),
        Severity::Extreme => format!(
            "Equivalent to {:.1} years of ideal carbon footprint ({:.1}% of annual budget)",
            days / 365.0,
            annual_percent
        ),
    }
}
