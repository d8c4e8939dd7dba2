#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::missing_errors_doc,      // Internal API
    clippy::missing_panics_doc,      // Internal API
    clippy::module_name_repetitions, // e.g. ConfigError in config module
    clippy::must_use_candidate,      // Annotated selectively on critical APIs
    clippy::doc_markdown             // Internal API
)]

pub mod config;
pub mod record;
pub mod sender;
pub mod serializer;

// Re-export main types for easy access
pub use config::{Config, ConfigError, Endpoint, RetryStatusSet, Settings};
pub use record::{ProjectedRecord, RawRecord, project};
pub use sender::{DeliveryClient, DeliveryOutcome};
pub use serializer::{Payload, SerializationError, SerializerChoice};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
