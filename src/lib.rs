pub mod config;
pub mod db;
pub mod domain;
pub mod session;
pub mod srs;
