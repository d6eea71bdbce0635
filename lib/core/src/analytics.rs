//! Descriptive statistics over a catalog
//!
//! Everything here is a deterministic aggregation. Maps are ordered so the
//! serialized summary is stable between runs.

use crate::Catalog;
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of brands listed in [`CatalogAnalytics::top_brands`]
pub const TOP_BRANDS: usize = 10;

/// Product counts per price bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriceRanges {
    /// price < 100
    #[serde(rename = "Under $100")]
    pub under_100: usize,
    /// 100 <= price < 500
    #[serde(rename = "$100-$500")]
    pub from_100_to_500: usize,
    /// 500 <= price < 1000
    #[serde(rename = "$500-$1000")]
    pub from_500_to_1000: usize,
    /// 1000 <= price < 2000
    #[serde(rename = "$1000-$2000")]
    pub from_1000_to_2000: usize,
    /// price >= 2000
    #[serde(rename = "$2000+")]
    pub over_2000: usize,
}

impl PriceRanges {
    fn record(&mut self, price: f64) {
        let bucket = if price < 100.0 {
            &mut self.under_100
        } else if price < 500.0 {
            &mut self.from_100_to_500
        } else if price < 1000.0 {
            &mut self.from_500_to_1000
        } else if price < 2000.0 {
            &mut self.from_1000_to_2000
        } else {
            &mut self.over_2000
        };
        *bucket += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandCount {
    pub brand: String,
    pub count: usize,
}

/// Catalog-wide summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogAnalytics {
    pub total_products: usize,
    pub total_brands: usize,
    pub total_categories: usize,
    /// Rounded to cents; 0 for an empty catalog
    pub avg_price: f64,
    pub price_ranges: PriceRanges,
    pub brand_distribution: BTreeMap<String, usize>,
    /// Each category of each product counts once
    pub category_distribution: BTreeMap<String, usize>,
    /// Keyed "{n}.0-{n}.9" by the integer part of the rating
    pub rating_distribution: BTreeMap<String, usize>,
    /// Most common brands, ties in catalog order of first appearance
    pub top_brands: Vec<BrandCount>,
    /// Mean price per category, rounded to cents
    pub price_by_category: BTreeMap<String, f64>,
}

impl CatalogAnalytics {
    pub fn compute(catalog: &Catalog) -> Self {
        let products = catalog.products();

        let mut price_ranges = PriceRanges::default();
        let mut brand_distribution = BTreeMap::new();
        let mut brand_order: Vec<&str> = Vec::new();
        let mut category_distribution = BTreeMap::new();
        let mut category_prices: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        let mut rating_distribution = BTreeMap::new();
        let mut price_sum = 0.0;

        for product in products {
            price_sum += product.price;
            price_ranges.record(product.price);

            let count = brand_distribution.entry(product.brand.clone()).or_insert(0usize);
            if *count == 0 {
                brand_order.push(&product.brand);
            }
            *count += 1;

            for (i, category) in product.categories.iter().enumerate() {
                *category_distribution.entry(category.clone()).or_insert(0usize) += 1;
                // a repeated label still counts the product once for its mean price
                if product.categories[..i].contains(category) {
                    continue;
                }
                let (sum, n) = category_prices.entry(category.as_str()).or_insert((0.0, 0));
                *sum += product.price;
                *n += 1;
            }

            let bucket = product.rating.trunc() as i64;
            *rating_distribution
                .entry(format!("{bucket}.0-{bucket}.9"))
                .or_insert(0usize) += 1;
        }

        let avg_price = if products.is_empty() {
            0.0
        } else {
            round_cents(price_sum / products.len() as f64)
        };

        let mut top_brands: Vec<BrandCount> = brand_order
            .into_iter()
            .map(|brand| BrandCount {
                brand: brand.to_string(),
                count: brand_distribution[brand],
            })
            .collect();
        // stable: equal counts stay in first-appearance order
        top_brands.sort_by(|a, b| b.count.cmp(&a.count));
        top_brands.truncate(TOP_BRANDS);

        let price_by_category = category_prices
            .into_iter()
            .map(|(category, (sum, n))| (category.to_string(), round_cents(sum / n as f64)))
            .collect();

        Self {
            total_products: products.len(),
            total_brands: catalog.brands().len(),
            total_categories: catalog.categories().len(),
            avg_price,
            price_ranges,
            brand_distribution,
            category_distribution,
            rating_distribution,
            top_brands,
            price_by_category,
        }
    }
}

#[inline]
fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Product;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Product::new(1, "Phone A", "Acme", 99.0)
                .with_categories(["Phones"])
                .with_rating(4.5),
            Product::new(2, "Phone B", "Zeta", 100.0)
                .with_categories(["Phones", "Budget"])
                .with_rating(3.9),
            Product::new(3, "Laptop", "Acme", 2000.0)
                .with_categories(["Laptops"])
                .with_rating(4.0),
            Product::new(4, "Tablet", "Beta", 999.99)
                .with_categories(["Tablets"])
                .with_rating(4.99),
        ])
        .unwrap()
    }

    #[test]
    fn test_price_buckets_boundaries() {
        let analytics = CatalogAnalytics::compute(&catalog());
        let ranges = analytics.price_ranges;
        assert_eq!(ranges.under_100, 1);
        assert_eq!(ranges.from_100_to_500, 1);
        assert_eq!(ranges.from_500_to_1000, 1);
        assert_eq!(ranges.from_1000_to_2000, 0);
        assert_eq!(ranges.over_2000, 1);
    }

    #[test]
    fn test_distributions() {
        let analytics = CatalogAnalytics::compute(&catalog());
        assert_eq!(analytics.total_products, 4);
        assert_eq!(analytics.total_brands, 3);
        assert_eq!(analytics.total_categories, 4);
        assert_eq!(analytics.brand_distribution["Acme"], 2);
        assert_eq!(analytics.category_distribution["Phones"], 2);
        assert_eq!(analytics.rating_distribution["4.0-4.9"], 3);
        assert_eq!(analytics.rating_distribution["3.0-3.9"], 1);
    }

    #[test]
    fn test_averages_are_rounded() {
        let analytics = CatalogAnalytics::compute(&catalog());
        // (99 + 100 + 2000 + 999.99) / 4 = 799.7475
        assert_eq!(analytics.avg_price, 799.75);
        assert_eq!(analytics.price_by_category["Phones"], 99.5);
        assert_eq!(analytics.price_by_category["Laptops"], 2000.0);
    }

    #[test]
    fn test_repeated_category_label_counts_product_once() {
        let catalog = Catalog::new(vec![
            Product::new(1, "Earbuds", "Acme", 100.0).with_categories(["Audio", "Audio"]),
            Product::new(2, "Speaker", "Acme", 200.0).with_categories(["Audio"]),
        ])
        .unwrap();
        let analytics = CatalogAnalytics::compute(&catalog);
        assert_eq!(analytics.price_by_category["Audio"], 150.0);
        assert_eq!(analytics.category_distribution["Audio"], 3);
    }

    #[test]
    fn test_top_brands_ties_keep_first_appearance() {
        let analytics = CatalogAnalytics::compute(&catalog());
        let names: Vec<&str> = analytics.top_brands.iter().map(|b| b.brand.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Zeta", "Beta"]);
    }

    #[test]
    fn test_empty_catalog() {
        let analytics = CatalogAnalytics::compute(&Catalog::new(Vec::new()).unwrap());
        assert_eq!(analytics.avg_price, 0.0);
        assert!(analytics.top_brands.is_empty());
    }

    #[test]
    fn test_price_range_labels_serialize() {
        let json = serde_json::to_value(CatalogAnalytics::compute(&catalog())).unwrap();
        assert_eq!(json["price_ranges"]["Under $100"], 1);
        assert_eq!(json["price_ranges"]["$2000+"], 1);
    }
}
