pub mod files;
pub mod loader;
