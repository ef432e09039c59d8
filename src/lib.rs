//! Airtime
//!
//! Airtime plans TV advertising buys: it decides how many spots to buy on each program so that
//! total rating points are maximised within a budget, while minimum shares of the rating points
//! come from prime time and PIB inventory.

pub mod allocation;
pub mod fixtures;
pub mod plan;
pub mod prelude;
pub mod programs;
pub mod report;
pub mod solvers;
pub mod utils;
