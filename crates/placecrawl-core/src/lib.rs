pub mod app_config;
pub mod config;
pub mod filter;
pub mod places;
pub mod request;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use places::{
    CandidateRef, CrawlResult, LatLng, OpeningHours, Period, PeriodPoint, PlaceRecord,
};
pub use request::{FilterSpec, OpeningHoursFilter, RatingRange, SearchRequest, ValidationError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
