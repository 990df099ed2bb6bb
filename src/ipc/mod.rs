mod error;
mod events;
mod handlers;
mod helpers;
mod router;
mod types;

pub use error::bad_json;
pub use events::{bulk_event, state_changed};
pub use router::handle_request;
pub use types::{AppState, Request};
