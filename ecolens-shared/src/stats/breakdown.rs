/// Per-category breakdown

use serde::Serialize;
use std::collections::HashMap;

use super::kilograms;
use crate::models::category::Category;
use crate::models::emission::{CategoryTotal, Emission};

/// One slice of the category breakdown chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySlice {
    /// Display name ("Food")
    pub category: &'static str,

    /// Wire key ("food")
    pub key: Category,

    /// Share of the grand total, rounded to a whole percent
    pub percentage: i64,

    /// Category total in kilograms
    pub impact_kg: f64,

    /// Category total in grams
    #[serde(rename = "totalCO2")]
    pub total_co2: f64,

    pub count: i64,
    pub color: &'static str,
}

/// Groups emissions by category
///
/// Output follows category declaration order; categories without emissions
/// are omitted.
pub fn totals_by_category(emissions: &[Emission]) -> Vec<CategoryTotal> {
    let mut sums: HashMap<Category, (f64, i64)> = HashMap::new();
    for emission in emissions {
        let entry = sums.entry(emission.category).or_insert((0.0, 0));
        entry.0 += emission.total_carbon();
        entry.1 += 1;
    }

    Category::ALL
        .into_iter()
        .filter_map(|category| {
            sums.get(&category).map(|&(total_co2, count)| CategoryTotal {
                category,
                total_co2,
                count,
            })
        })
        .collect()
}

/// Turns category totals into chart slices
///
/// Percentages are relative to the sum of all totals and are 0 when that sum
/// is 0. Slices are sorted by total descending; equal totals keep category
/// declaration order.
pub fn category_breakdown(totals: &[CategoryTotal]) -> Vec<CategorySlice> {
    let grand_total: f64 = totals.iter().map(|t| t.total_co2).sum();

    let mut slices: Vec<CategorySlice> = totals
        .iter()
        .map(|t| CategorySlice {
            category: t.category.display_name(),
            key: t.category,
            percentage: if grand_total > 0.0 {
                (t.total_co2 / grand_total * 100.0).round() as i64
            } else {
                0
            },
            impact_kg: kilograms(t.total_co2),
            total_co2: t.total_co2,
            count: t.count,
            color: t.category.color(),
        })
        .collect();

    slices.sort_by(|a, b| {
        b.total_co2
            .total_cmp(&a.total_co2)
            .then_with(|| a.key.cmp(&b.key))
    });

    slices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::test_support::emission;

    #[test]
    fn test_breakdown_percentages() {
        let emissions = vec![
            emission("Apple", Category::Food, 100.0),
            emission("Bread", Category::Food, 50.0),
            emission("Charger", Category::Electronics, 50.0),
        ];

        let slices = category_breakdown(&totals_by_category(&emissions));

        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].category, "Food");
        assert_eq!(slices[0].percentage, 75);
        assert_eq!(slices[0].count, 2);
        assert_eq!(slices[0].color, "#10b981");
        assert_eq!(slices[1].category, "Electronics");
        assert_eq!(slices[1].percentage, 25);
        assert_eq!(slices[1].impact_kg, 0.05);
    }

    #[test]
    fn test_breakdown_with_zero_total() {
        let emissions = vec![emission("Air", Category::Other, 0.0)];
        let slices = category_breakdown(&totals_by_category(&emissions));

        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].percentage, 0);
    }

    #[test]
    fn test_breakdown_empty() {
        assert!(category_breakdown(&[]).is_empty());
    }

    #[test]
    fn test_equal_totals_keep_declaration_order() {
        let totals = vec![
            CategoryTotal {
                category: Category::Packaging,
                total_co2: 10.0,
                count: 1,
            },
            CategoryTotal {
                category: Category::Beverage,
                total_co2: 10.0,
                count: 1,
            },
        ];

        let slices = category_breakdown(&totals);
        assert_eq!(slices[0].key, Category::Beverage);
        assert_eq!(slices[1].key, Category::Packaging);
    }

    #[test]
    fn test_totals_respect_quantity() {
        let mut cups = emission("Cup", Category::Beverage, 20.0);
        cups.quantity = 3;

        let totals = totals_by_category(&[cups]);
        assert_eq!(totals[0].total_co2, 60.0);
        assert_eq!(totals[0].count, 1);
    }

    #[test]
    fn test_slice_serializes_total_key() {
        let slices = category_breakdown(&totals_by_category(&[emission(
            "Apple",
            Category::Food,
            100.0,
        )]));
        let json = serde_json::to_value(&slices[0]).unwrap();
        assert_eq!(json["totalCO2"], 100.0);
        assert_eq!(json["key"], "food");
        assert_eq!(json["impactKg"], 0.1);
    }
}
