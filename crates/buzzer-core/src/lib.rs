pub mod config;
pub mod controller;
pub mod error;
pub mod gpio;

pub use controller::BuzzerController;
pub use error::Error;
