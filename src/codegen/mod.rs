pub mod datatable;
pub mod kinds;
