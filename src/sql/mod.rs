//! PostgreSQL glue: JSON parameters in, JSON rows out.

pub mod bind;
pub mod rows;
pub use bind::*;
pub use rows::*;
