pub mod batch;
pub mod cli;
pub mod config;
pub mod enricher;
pub mod error;
pub mod matching;
pub mod names;
pub mod profile_parser;
pub mod search;
pub mod store;
pub mod types;

pub use batch::BatchDriver;
pub use config::EnrichConfig;
pub use enricher::Enricher;
pub use error::SearchError;
pub use profile_parser::ProfileParser;
pub use search::{ExaClient, ProfileSearch};
pub use types::{BatchSummary, OutputRecord, ParsedProfile, PersonRecord, SearchCandidate};
