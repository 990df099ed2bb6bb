pub mod bulk;
pub mod core;
pub mod reports;
pub mod results;
pub mod students;
