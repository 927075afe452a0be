use chrono::{DateTime, Duration, Utc};

use super::types::{BodyType, Car, Condition, FuelType, Price, Transmission};
use crate::RecordId;

#[allow(clippy::too_many_arguments)]
fn listing(
    created_at: DateTime<Utc>,
    make: &str,
    model: &str,
    year: u32,
    price: u32,
    mileage: u64,
    engine_size: &str,
    fuel_type: FuelType,
    transmission: Transmission,
    color: &str,
    condition: Condition,
    body_type: BodyType,
    vin: &str,
) -> Car {
    Car {
        id: RecordId::new(),
        make: make.to_string(),
        model: model.to_string(),
        year,
        price: Price::from(price),
        mileage,
        engine_size: engine_size.to_string(),
        fuel_type,
        transmission,
        color: color.to_string(),
        description: format!("{year} {make} {model} in {color}, full service history."),
        features: Vec::new(),
        images: Vec::new(),
        condition,
        body_type,
        registration_year: year,
        vin: vin.to_string(),
        created_at,
        updated_at: created_at,
    }
}

/// Demo listings for an empty store.
///
/// Creation times are one hour apart, ending at `now`, so the first car
/// returned is also the newest.
pub fn demo_cars(now: DateTime<Utc>) -> Vec<Car> {
    let at = |hours_ago: i64| now - Duration::hours(hours_ago);

    let mut cars = vec![
        listing(
            at(0),
            "Toyota",
            "Corolla",
            2019,
            14_995,
            42_000,
            "1.8L",
            FuelType::Hybrid,
            Transmission::Automatic,
            "Silver",
            Condition::Excellent,
            BodyType::Hatchback,
            "JTDKBRFU9K3012345",
        )
        .with_features(&["Reversing camera", "Adaptive cruise control", "Apple CarPlay"]),
        listing(
            at(1),
            "Ford",
            "Ranger",
            2021,
            27_500,
            18_500,
            "2.0L",
            FuelType::Diesel,
            Transmission::Automatic,
            "Black",
            Condition::LikeNew,
            BodyType::Truck,
            "6FPPXXMJ2PMA12345",
        )
        .with_features(&["Tow bar", "4x4", "Load liner"]),
        listing(
            at(2),
            "Volkswagen",
            "Golf",
            2016,
            9_250,
            71_000,
            "1.4L",
            FuelType::Petrol,
            Transmission::Manual,
            "Blue",
            Condition::Good,
            BodyType::Hatchback,
            "WVWZZZAUZGW123456",
        ),
        listing(
            at(3),
            "Tesla",
            "Model 3",
            2022,
            32_000,
            12_000,
            "Dual Motor",
            FuelType::Electric,
            Transmission::Automatic,
            "White",
            Condition::LikeNew,
            BodyType::Sedan,
            "5YJ3E7EB2NF123456",
        )
        .with_features(&["Autopilot", "Glass roof", "Heated seats"]),
        listing(
            at(4),
            "BMW",
            "X5",
            2018,
            24_750,
            64_000,
            "3.0L",
            FuelType::Diesel,
            Transmission::Automatic,
            "Grey",
            Condition::Good,
            BodyType::Suv,
            "WBAKS410X00123456",
        ),
        listing(
            at(5),
            "Mazda",
            "MX-5",
            2015,
            11_500,
            55_000,
            "2.0L",
            FuelType::Petrol,
            Transmission::Manual,
            "Red",
            Condition::Fair,
            BodyType::Coupe,
            "JMZNDAC0600123456",
        ),
    ];

    cars.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    cars
}

impl Car {
    fn with_features(mut self, features: &[&str]) -> Self {
        self.features = features.iter().map(|f| f.to_string()).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::car::validate_car;
    use std::collections::HashSet;

    #[test]
    fn test_demo_cars_are_valid() {
        for car in demo_cars(Utc::now()) {
            assert!(validate_car(&car).is_ok(), "{} should be valid", car.title());
        }
    }

    #[test]
    fn test_demo_cars_have_unique_vins_and_ids() {
        let cars = demo_cars(Utc::now());
        let vins: HashSet<_> = cars.iter().map(|c| c.vin.clone()).collect();
        let ids: HashSet<_> = cars.iter().map(|c| c.id.clone()).collect();
        assert_eq!(vins.len(), cars.len());
        assert_eq!(ids.len(), cars.len());
    }

    #[test]
    fn test_demo_cars_newest_first() {
        let now = Utc::now();
        let cars = demo_cars(now);
        assert_eq!(cars[0].created_at, now);
        assert!(cars.windows(2).all(|w| w[0].created_at > w[1].created_at));
    }
}
