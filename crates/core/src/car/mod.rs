mod error;
mod requests;
mod seed;
mod types;

pub use error::{CarError, InvalidPrice, ParseEnumError};
pub use requests::{decode_features, decode_images, CarForm, CarUpdate, NewCar};
pub use seed::demo_cars;
pub use types::{
    validate_car, BodyType, Car, Condition, FuelType, ImageDescriptor, Price,
    Transmission,
};
