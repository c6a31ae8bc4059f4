pub mod analytics;
pub mod data;
pub mod stock;
