pub mod data_operation;
pub mod deduplicate;
pub mod drop_null_keys;
pub mod normalize_names;
pub mod parse_timestamps;
