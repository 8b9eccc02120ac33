//! API routes

pub mod checks;
pub mod goals;
pub mod health;
pub mod recalc;
pub mod users;
