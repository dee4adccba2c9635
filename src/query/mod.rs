pub mod service;

pub use service::{QueryService, RECENT_LIMIT};
