pub mod asset;
#[cfg(feature = "db")]
pub mod db;
#[macro_use]
pub mod exception;
pub mod json;
pub mod log;
pub mod shutdown;
pub mod web;
