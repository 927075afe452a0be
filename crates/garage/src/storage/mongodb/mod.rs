//! MongoDB storage backend implementation.
//!
//! Cars and enquiries live in the `cars` and `enquiries` collections as typed
//! documents keyed by `ObjectId`. A unique index on `cars.vin` backs the VIN
//! rule; the listing filter is compiled to a query document.

mod conversions;
mod error;
mod query;
mod repository;

pub use repository::MongoRepository;
