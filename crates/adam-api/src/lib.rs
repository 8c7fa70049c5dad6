// adam-api: Async Rust client for the Plugwise Smile gateway API

pub mod api;
pub mod client;
pub mod device_data;
pub mod error;
pub mod models;
pub mod transport;
mod xml;

pub use api::SmileApi;
pub use client::SmileClient;
pub use error::Error;
pub use models::{Appliances, DeviceData, DeviceDescriptor, DomainObjects};
pub use transport::TransportConfig;
