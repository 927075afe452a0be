mod error;
mod requests;
mod types;

pub use error::EnquiryError;
pub use requests::{validate_new_enquiry, NewEnquiry, UpdateEnquiryStatus};
pub use types::{CarRef, Enquiry, EnquiryStatus, EnquiryWithCar};
