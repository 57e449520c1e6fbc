pub mod beacon;
pub mod models;
pub mod settings;
