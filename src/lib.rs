// src/lib.rs

//! podfilter: drops unwanted episodes from podcast RSS feeds.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
