pub mod basemaps;
pub mod config;
pub mod controller;
pub mod error;
pub mod group;
pub mod icon;
pub mod models;
pub mod plot;
pub mod protocol;
pub mod state;
pub mod surface;

pub use controller::StationMap;
pub use error::MapError;
