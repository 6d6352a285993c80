//! Embedded catalog of LLM vendor request templates, plus the helpers that
//! turn a scan's failure rate into a display color and letter grade.

pub mod catalog;
pub mod config;
pub mod embedded;
pub mod error;
pub mod logging;
pub mod report;
pub mod request;
pub mod strength;

pub use catalog::{CatalogEntry, Descriptor};
pub use request::{Modality, RequestTemplate};
pub use strength::{color_for_failure_rate, grade_for_failure_rate, ColorToken, Grade};
