pub mod engine;
pub mod error;
pub mod filter;
pub mod matching;
pub mod models;
pub mod service;
pub mod serving;
pub mod table;
