pub mod body;
pub mod error;
pub mod server;
