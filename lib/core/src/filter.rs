// Structured product filters
use crate::{Product, QueryContext};

pub trait Filter {
    fn matches(&self, product: &Product) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    /// Category set contains the label (exact, case-sensitive)
    InCategory(String),
    /// Brand equals the label (exact, case-sensitive)
    BrandEquals(String),
    MinPrice(f64),
    MaxPrice(f64),
    MinRating(f64),
    And(Vec<FilterCondition>),
    Or(Vec<FilterCondition>),
    Not(Box<FilterCondition>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductFilter {
    condition: FilterCondition,
}

impl ProductFilter {
    pub fn new(condition: FilterCondition) -> Self {
        Self { condition }
    }

    /// AND of every filter set on the context; an empty context matches all
    pub fn from_context(ctx: &QueryContext) -> Self {
        let mut conditions = Vec::new();
        if let Some(category) = &ctx.category {
            conditions.push(FilterCondition::InCategory(category.clone()));
        }
        if let Some(brand) = &ctx.brand {
            conditions.push(FilterCondition::BrandEquals(brand.clone()));
        }
        if let Some(min) = ctx.min_price {
            conditions.push(FilterCondition::MinPrice(min));
        }
        if let Some(max) = ctx.max_price {
            conditions.push(FilterCondition::MaxPrice(max));
        }
        if let Some(min) = ctx.min_rating {
            conditions.push(FilterCondition::MinRating(min));
        }
        Self::new(FilterCondition::And(conditions))
    }

    pub fn condition(&self) -> &FilterCondition {
        &self.condition
    }

    fn matches_condition(condition: &FilterCondition, product: &Product) -> bool {
        match condition {
            FilterCondition::InCategory(category) => product.in_category(category),
            FilterCondition::BrandEquals(brand) => product.brand == *brand,
            FilterCondition::MinPrice(min) => product.price >= *min,
            FilterCondition::MaxPrice(max) => product.price <= *max,
            FilterCondition::MinRating(min) => product.rating >= *min,
            FilterCondition::And(conditions) => {
                conditions.iter().all(|c| Self::matches_condition(c, product))
            }
            FilterCondition::Or(conditions) => {
                conditions.iter().any(|c| Self::matches_condition(c, product))
            }
            FilterCondition::Not(condition) => !Self::matches_condition(condition, product),
        }
    }
}

impl Filter for ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        Self::matches_condition(&self.condition, product)
    }
}

impl<F> Filter for F
where
    F: Fn(&Product) -> bool,
{
    fn matches(&self, product: &Product) -> bool {
        self(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tv() -> Product {
        Product::new(7, "Bravia XR", "Sony", 1499.99)
            .with_categories(["TVs", "Premium"])
            .with_rating(4.6)
    }

    #[test]
    fn test_empty_context_matches_everything() {
        let filter = ProductFilter::from_context(&QueryContext::new());
        assert!(filter.matches(&tv()));
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let ctx = QueryContext::new().with_min_price(1499.99).with_max_price(1499.99);
        assert!(ProductFilter::from_context(&ctx).matches(&tv()));

        let ctx = QueryContext::new().with_max_price(1499.98);
        assert!(!ProductFilter::from_context(&ctx).matches(&tv()));
    }

    #[test]
    fn test_rating_bound_is_inclusive() {
        assert!(ProductFilter::from_context(&QueryContext::new().with_min_rating(4.6)).matches(&tv()));
        assert!(!ProductFilter::from_context(&QueryContext::new().with_min_rating(4.7)).matches(&tv()));
    }

    #[test]
    fn test_category_and_brand_are_exact() {
        let ctx = QueryContext::new().with_category("TV");
        assert!(!ProductFilter::from_context(&ctx).matches(&tv()));

        let ctx = QueryContext::new().with_brand("sony");
        assert!(!ProductFilter::from_context(&ctx).matches(&tv()));

        let ctx = QueryContext::new().with_category("Premium").with_brand("Sony");
        assert!(ProductFilter::from_context(&ctx).matches(&tv()));
    }

    #[test]
    fn test_or_and_not() {
        let filter = ProductFilter::new(FilterCondition::Or(vec![
            FilterCondition::BrandEquals("LG".into()),
            FilterCondition::Not(Box::new(FilterCondition::MinPrice(2000.0))),
        ]));
        assert!(filter.matches(&tv()));
    }

    #[test]
    fn test_closure_filter() {
        let cheap = |p: &Product| p.price < 100.0;
        assert!(!cheap.matches(&tv()));
    }
}
