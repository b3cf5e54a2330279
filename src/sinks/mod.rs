pub mod csv;
pub mod data_sink;
pub mod output_layout;
