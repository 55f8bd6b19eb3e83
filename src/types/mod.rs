pub mod outcome;
pub mod response;
pub mod trip;

pub use outcome::ParseOutcome;
pub use response::{trip_request_from_map, ParseRequestResponse};
pub use trip::{ParseRequestInput, TripRequest, REQUIRED_FIELDS};
