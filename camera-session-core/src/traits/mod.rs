pub mod capture_backend;
pub mod capture_delegate;
pub mod library;
pub mod outputs;
pub mod path_resolver;
pub mod permission;
