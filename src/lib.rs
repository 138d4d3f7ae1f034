pub mod config;
pub mod error;
pub mod fees;
pub mod payments;
pub mod portal;
pub mod quality;
pub mod routes;
pub mod service;
