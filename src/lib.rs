pub mod combos;
pub mod config;
pub mod correction;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod export;
pub mod impact;
pub mod index;
pub mod pairs;
pub mod persist;
pub mod ranking;
pub mod render;
pub mod report;
