//! EpiCourier Tools module
//!
//! MCP tool implementations for the meal planner.

pub mod calendar;
pub mod insights;
pub mod nutrition;
pub mod recipes;
pub mod recommender;
pub mod reviews;
pub mod status;
