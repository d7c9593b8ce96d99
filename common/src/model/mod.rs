pub mod csv;
pub mod field;
pub mod registration;
