pub mod client;
pub mod crawl;
pub mod details;
pub mod error;
pub mod output;
pub mod pagination;
pub mod retry;
pub mod types;

pub use client::{PlacesApi, PlacesClient, SearchPage};
pub use crawl::Crawler;
pub use details::resolve_details;
pub use error::{ErrorKind, PlacesError};
pub use output::{result_file_name, write_result_file, OutputError};
pub use pagination::{collect_all_candidates, MAX_PAGES, PAGE_TOKEN_DELAY};
pub use retry::RetryPolicy;

#[cfg(test)]
mod test_support;
