pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod form;
pub mod geolocation;
pub mod map;
pub mod render;
pub mod storage;
pub mod types;
pub mod utils;
