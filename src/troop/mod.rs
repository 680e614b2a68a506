pub mod calculator;
pub mod error;
pub mod format;
pub mod model;
pub mod table;
