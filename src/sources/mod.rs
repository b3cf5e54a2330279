pub mod csv;
pub mod data_source;
