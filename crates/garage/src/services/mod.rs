//! Car and enquiry services.
//!
//! Handlers stay thin: they decode the request, call a service, and turn the
//! result into a response. Services own the rules that need more than one
//! repository call (VIN uniqueness, enquiry car lookups).

mod cars;
mod enquiries;

pub use cars::CarService;
pub use enquiries::EnquiryService;

use garage_core::{
    car::CarError, enquiry::EnquiryError, filter::FilterError, storage::RepositoryError, RecordId,
};
use thiserror::Error;

/// Errors returned by the services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Car(#[from] CarError),
    #[error(transparent)]
    Enquiry(#[from] EnquiryError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("VIN must be unique")]
    DuplicateVin,
    #[error("Car {0} not found")]
    UnknownCar(RecordId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
