pub mod application;
pub mod dto;
pub mod error;
pub mod repository;
pub mod retry;
pub mod service;
