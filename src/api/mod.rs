// api module: CMS collection endpoints

pub mod case_studies;
pub mod client;
pub mod error;
pub mod updates;
pub mod wire;

pub use case_studies::{CASE_STUDY_FACETS, CaseStudyQuery, TagPage};
pub use client::ApiClient;
pub use error::{ApiError, ErrorKind};
pub use updates::{UPDATE_FACETS, UpdateQuery};
pub use wire::AvailableFacets;
