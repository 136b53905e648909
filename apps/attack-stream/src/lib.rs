pub mod cli;
pub mod config;
pub mod error;
pub mod session;
pub mod sink;
pub mod telemetry;
pub mod transport;

pub use prediction_proto as protocol;
