pub mod dashboard;
pub mod orders;
