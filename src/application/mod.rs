pub mod catalog;
pub mod error;
pub mod jobs;
pub mod reports;
pub mod repos;
pub mod seed;
