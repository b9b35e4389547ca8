pub mod aggregate;
pub mod compare;
pub mod diagnostics;
pub mod error;
pub mod types;
