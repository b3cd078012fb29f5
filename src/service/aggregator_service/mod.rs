mod aggregator_ingestion_task;
mod aggregator_resort_task;
mod aggregator_service;
mod aggregator_service_impl;
mod aggregator_state;
mod dto;

pub use aggregator_service::*;
pub use aggregator_service_impl::*;
pub use dto::AggregatorServiceConfig;
