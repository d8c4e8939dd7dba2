pub mod client;
pub mod outcome;

pub use client::DeliveryClient;
pub use outcome::DeliveryOutcome;
