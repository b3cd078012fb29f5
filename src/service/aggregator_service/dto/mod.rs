mod aggregator_service_config;

pub use aggregator_service_config::*;
