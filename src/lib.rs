pub mod error;
pub mod models;
pub mod parsers;
pub mod text;
pub mod transport;

pub use error::{Error, Result};
pub use models::{Event, EventTag, RequestParams, ALL_EVENT_TAGS};
pub use parsers::{EventParser, EventRef};
