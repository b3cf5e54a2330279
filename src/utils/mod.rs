pub mod columns;
pub mod filesystem;
pub mod test_data;
