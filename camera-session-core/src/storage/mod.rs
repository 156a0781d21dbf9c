pub mod catalog;
pub mod persistence;
