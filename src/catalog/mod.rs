//! What gets loaded where: entity schemas, fragment plans and edge classes of both backends.

pub mod document;
pub mod graph;

use crate::constants::PANDEMIC_CUTOFF;
use crate::transform::error::TransformError;
use crate::transform::{Band, FragmentPlan};
use chrono::NaiveDate;

/// North (< 501), Center (501..1001), South (>= 1001). Unreadable places count as 0.
pub fn place_plan(entity: &str, column: &str) -> Result<FragmentPlan<f64>, TransformError> {
    FragmentPlan::new(
        &format!("{entity} by place"),
        column,
        vec![
            Band::new(&format!("{entity}_North"), None, Some(501.0)),
            Band::new(&format!("{entity}_Center"), Some(501.0), Some(1001.0)),
            Band::new(&format!("{entity}_South"), Some(1001.0), None),
        ],
        0.0,
    )
}

/// Cheap (< 100) and Expensive. Unreadable prices count as 0.
pub fn price_plan(entity: &str, column: &str) -> Result<FragmentPlan<f64>, TransformError> {
    FragmentPlan::new(
        &format!("{entity} by price"),
        column,
        vec![
            Band::new(&format!("{entity}_Cheap"), None, Some(100.0)),
            Band::new(&format!("{entity}_Expensive"), Some(100.0), None),
        ],
        0.0,
    )
}

/// Short (< 16), Medium (16..100), Long (>= 100).
pub fn length_plan(entity: &str, column: &str) -> Result<FragmentPlan<f64>, TransformError> {
    FragmentPlan::new(
        &format!("{entity} by length"),
        column,
        vec![
            Band::new(&format!("{entity}_Short"), None, Some(16.0)),
            Band::new(&format!("{entity}_Medium"), Some(16.0), Some(100.0)),
            Band::new(&format!("{entity}_Long"), Some(100.0), None),
        ],
        0.0,
    )
}

/// Splits on the pandemic cutoff day, which itself belongs to the post fragment.
pub fn pandemic_plan(
    entity: &str,
    column: &str,
) -> Result<FragmentPlan<NaiveDate>, TransformError> {
    let plan_name = format!("{entity} by pandemic cutoff");
    let cutoff = NaiveDate::parse_from_str(PANDEMIC_CUTOFF, "%Y-%m-%d").map_err(|err| {
        TransformError::InvalidBands {
            plan: plan_name.clone(),
            reason: err.to_string(),
        }
    })?;
    FragmentPlan::new(
        &plan_name,
        column,
        vec![
            Band::new(&format!("{entity}_Pre_Pandemic"), None, Some(cutoff)),
            Band::new(&format!("{entity}_Post_Pandemic"), Some(cutoff), None),
        ],
        NaiveDate::MIN,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(-3.0, "Customer_North")]
    #[case(500.0, "Customer_North")]
    #[case(501.0, "Customer_Center")]
    #[case(1000.0, "Customer_Center")]
    #[case(1001.0, "Customer_South")]
    fn test_place_plan_boundaries(#[case] place: f64, #[case] expected: &str) {
        let plan = place_plan("Customer", "place").unwrap();
        assert_eq!(plan.bands()[plan.band_index(Some(&place))].name, expected);
    }

    #[rstest]
    #[case(15.0, "Post_Short")]
    #[case(15.5, "Post_Short")]
    #[case(16.0, "Post_Medium")]
    #[case(99.0, "Post_Medium")]
    #[case(100.0, "Post_Long")]
    fn test_length_plan_has_no_gap(#[case] length: f64, #[case] expected: &str) {
        let plan = length_plan("Post", "length").unwrap();
        assert_eq!(plan.bands()[plan.band_index(Some(&length))].name, expected);
    }

    #[rstest]
    fn test_unreadable_values_land_in_lowest_band() {
        let price = price_plan("Product", "price").unwrap();
        assert_eq!(price.band_index(None), 0);
        let orders = pandemic_plan("Order", "OrderDate").unwrap();
        assert_eq!(orders.band_names()[orders.band_index(None)], "Order_Pre_Pandemic");
    }
}
