use serde_derive::{Deserialize, Serialize};

use crate::model::Car;

pub const FEATURED_COUNT: usize = 3;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PriceSort {
    PriceAsc,
    PriceDesc,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct CarQuery {
    /// Category display name; `All` or absent means every category.
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<PriceSort>,
}

pub fn filter_cars(cars: Vec<Car>, query: &CarQuery) -> Vec<Car> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != "All");
    let term = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut result: Vec<Car> = cars
        .into_iter()
        .filter(|car| category.is_none_or(|c| car.category.display_name() == c))
        .filter(|car| {
            term.as_ref().is_none_or(|t| {
                car.make.to_lowercase().contains(t.as_str())
                    || car.model.to_lowercase().contains(t.as_str())
            })
        })
        .collect();

    // sort_by is stable, equal prices keep store order
    match query.sort {
        Some(PriceSort::PriceAsc) => {
            result.sort_by(|a, b| a.price_per_day.total_cmp(&b.price_per_day))
        }
        Some(PriceSort::PriceDesc) => {
            result.sort_by(|a, b| b.price_per_day.total_cmp(&a.price_per_day))
        }
        None => {}
    }
    result
}

pub fn featured(mut cars: Vec<Car>) -> Vec<Car> {
    cars.truncate(FEATURED_COUNT);
    cars
}
