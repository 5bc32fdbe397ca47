pub mod buckets;
pub mod config;
pub mod error;
pub mod request;
pub mod types;

pub use buckets::*;
pub use config::Config;
pub use error::{CollectionError, ImportError};
pub use request::{CandidateSource, ImportMode, ImportRequest};
pub use types::*;
