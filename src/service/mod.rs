pub mod aggregator_service;
pub mod push_service;
pub mod session_service;
