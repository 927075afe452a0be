//! Listing query builder.
//!
//! Turns the flat, optional query parameters of `GET /api/cars` into a typed
//! [`CarFilter`]. Every supplied criterion is ANDed; absent or blank
//! parameters impose nothing. Storage backends either translate the filter
//! into their own query language or evaluate [`CarFilter::matches`] directly.

use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::{
    car::{BodyType, Car, FuelType, ParseEnumError, Price, Transmission},
    serde::deserialize_optional_string,
};

/// Errors that can occur when building a filter from query parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid numeric value for {param}: '{value}'")]
    InvalidNumber { param: &'static str, value: String },
    #[error(transparent)]
    InvalidValue(#[from] ParseEnumError),
}

/// Raw query parameters, exactly as received.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCarsQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub make: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub min_price: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub max_price: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub min_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub max_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub min_mileage: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub max_mileage: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub fuel_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub transmission: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub body_type: Option<String>,
}

/// An inclusive range with either side optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericRange<T = u64> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: Copy + PartialOrd> NumericRange<T> {
    /// Returns `None` when neither bound is given.
    pub fn new(min: Option<T>, max: Option<T>) -> Option<Self> {
        if min.is_none() && max.is_none() {
            None
        } else {
            Some(Self { min, max })
        }
    }

    pub fn contains(&self, value: T) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// A structured listing predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarFilter {
    /// Case-insensitive substring of `make`.
    pub make: Option<String>,
    /// Case-insensitive substring of `model`.
    pub model: Option<String>,
    pub price: Option<NumericRange<Price>>,
    pub year: Option<NumericRange>,
    pub mileage: Option<NumericRange>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    pub body_type: Option<BodyType>,
}

impl CarFilter {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Whether `car` satisfies every supplied criterion.
    pub fn matches(&self, car: &Car) -> bool {
        contains_ignore_case(&car.make, self.make.as_deref())
            && contains_ignore_case(&car.model, self.model.as_deref())
            && self.price.is_none_or(|r| r.contains(car.price))
            && self.year.is_none_or(|r| r.contains(u64::from(car.year)))
            && self.mileage.is_none_or(|r| r.contains(car.mileage))
            && self.fuel_type.is_none_or(|f| f == car.fuel_type)
            && self.transmission.is_none_or(|t| t == car.transmission)
            && self.body_type.is_none_or(|b| b == car.body_type)
    }
}

impl TryFrom<ListCarsQuery> for CarFilter {
    type Error = FilterError;

    fn try_from(query: ListCarsQuery) -> Result<Self, Self::Error> {
        let price = NumericRange::new(
            parse_bound("minPrice", query.min_price)?,
            parse_bound("maxPrice", query.max_price)?,
        );
        let year = NumericRange::new(
            parse_bound("minYear", query.min_year)?,
            parse_bound("maxYear", query.max_year)?,
        );
        let mileage = NumericRange::new(
            parse_bound("minMileage", query.min_mileage)?,
            parse_bound("maxMileage", query.max_mileage)?,
        );

        Ok(Self {
            make: query.make.map(|s| s.trim().to_string()),
            model: query.model.map(|s| s.trim().to_string()),
            price,
            year,
            mileage,
            fuel_type: query.fuel_type.map(|s| s.trim().parse()).transpose()?,
            transmission: query.transmission.map(|s| s.trim().parse()).transpose()?,
            body_type: query.body_type.map(|s| s.trim().parse()).transpose()?,
        })
    }
}

fn parse_bound<T: FromStr>(
    param: &'static str,
    value: Option<String>,
) -> Result<Option<T>, FilterError> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| FilterError::InvalidNumber { param, value: raw })
        })
        .transpose()
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

/// Orders cars most-recently-added first. Ties fall back to id, descending.
pub fn sort_newest_first(cars: &mut [Car]) {
    cars.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::car::demo_cars;
    use chrono::Utc;

    fn query(pairs: &[(&str, &str)]) -> ListCarsQuery {
        let map: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }

    fn filter(pairs: &[(&str, &str)]) -> CarFilter {
        CarFilter::try_from(query(pairs)).unwrap()
    }

    fn apply(filter: &CarFilter) -> Vec<String> {
        demo_cars(Utc::now())
            .into_iter()
            .filter(|car| filter.matches(car))
            .map(|car| car.vin)
            .collect()
    }

    #[test]
    fn test_empty_query_is_empty_filter() {
        let f = filter(&[]);
        assert!(f.is_empty());
        assert_eq!(apply(&f).len(), demo_cars(Utc::now()).len());
    }

    #[test]
    fn test_blank_parameters_are_ignored() {
        let f = filter(&[("make", ""), ("minPrice", "  "), ("fuelType", "")]);
        assert!(f.is_empty());
    }

    #[test]
    fn test_range_only_built_when_a_bound_is_present() {
        let f = filter(&[("minPrice", "10000")]);
        assert_eq!(
            f.price,
            Some(NumericRange {
                min: Some(Price::from(10000)),
                max: None
            })
        );
        assert_eq!(f.year, None);
        assert_eq!(f.mileage, None);
    }

    #[test]
    fn test_make_is_case_insensitive_substring() {
        let f = filter(&[("make", "yot")]);
        let cars: Vec<_> = demo_cars(Utc::now())
            .into_iter()
            .filter(|car| f.matches(car))
            .collect();
        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0].make, "Toyota");

        assert_eq!(apply(&filter(&[("model", "MX")])).len(), 1);
    }

    #[test]
    fn test_price_range_and_fuel_type() {
        let f = filter(&[
            ("minPrice", "10000"),
            ("maxPrice", "20000"),
            ("fuelType", "Petrol"),
        ]);
        let matches: Vec<Car> = demo_cars(Utc::now())
            .into_iter()
            .filter(|car| f.matches(car))
            .collect();

        assert!(!matches.is_empty());
        for car in &matches {
            assert_eq!(car.fuel_type, FuelType::Petrol);
            assert!((10_000.0..=20_000.0).contains(&car.price.amount()));
        }
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let range = NumericRange::new(Some(100), Some(200)).unwrap();
        assert!(range.contains(100));
        assert!(range.contains(200));
        assert!(!range.contains(99));
        assert!(!range.contains(201));
        assert!(NumericRange::<u64>::new(None, None).is_none());
    }

    #[test]
    fn test_price_bounds_accept_cents() {
        let f = filter(&[("maxPrice", "14995.50")]);
        let range = f.price.unwrap();
        assert!(range.contains(Price::from(14995)));
        assert!(range.contains(Price::new(14995.5).unwrap()));
        assert!(!range.contains(Price::new(14995.51).unwrap()));

        let err = CarFilter::try_from(query(&[("minPrice", "-10")])).unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidNumber {
                param: "minPrice",
                value: "-10".to_string()
            }
        );
    }

    #[test]
    fn test_all_criteria_are_anded() {
        let f = filter(&[("bodyType", "Hatchback"), ("transmission", "Manual")]);
        let vins = apply(&f);
        assert_eq!(vins, vec!["WVWZZZAUZGW123456".to_string()]);
    }

    #[test]
    fn test_invalid_number_rejected() {
        let err = CarFilter::try_from(query(&[("maxYear", "twenty")])).unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidNumber {
                param: "maxYear",
                value: "twenty".to_string()
            }
        );
        assert!(CarFilter::try_from(query(&[("minMileage", "-1")])).is_err());
    }

    #[test]
    fn test_invalid_enum_rejected() {
        let err = CarFilter::try_from(query(&[("fuelType", "Steam")])).unwrap_err();
        assert!(matches!(err, FilterError::InvalidValue(_)));
    }

    #[test]
    fn test_sort_newest_first() {
        let now = Utc::now();
        let mut cars = demo_cars(now);
        cars.reverse();
        sort_newest_first(&mut cars);
        assert_eq!(cars[0].created_at, now);
        assert!(cars.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }
}
