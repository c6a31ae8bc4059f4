pub mod abc_classifier;
pub mod valorisation;
pub mod analytics_service;
pub use analytics_service::AnalyticsService;
