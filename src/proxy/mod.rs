// Proxy module - serving-side response construction
// Rebuilds client responses from stored entries and maps errors to responses.

pub mod error_handler;
pub mod freshness;
pub mod response_handler;

pub use error_handler::{error_response, ERROR_CONTENT_TYPE};
pub use freshness::ConditionalResult;
pub use response_handler::{assemble_response, AssembledResponse, ServeOutcome};
