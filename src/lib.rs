pub mod app;
pub mod config;
pub mod conformance;
pub mod constants;
pub mod domain;
pub mod error;
pub mod file_mapping;
pub mod keys;
pub mod output;
pub mod reader;
pub mod remote;
pub mod store;
