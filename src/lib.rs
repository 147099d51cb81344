//! EpiCourier Library
//!
//! Recipe catalog, meal calendar, nutrition aggregation and insights for the
//! EpiCourier meal planner.

pub mod build_info;
pub mod config;
pub mod db;
pub mod insights;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod recommender;
pub mod tools;
