//! REST response helpers shared by module handlers.

pub mod problem;
