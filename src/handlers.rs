pub mod analytics;
pub mod data;
