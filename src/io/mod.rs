pub mod csv;
pub mod json;

// Re-export commonly used functions
pub use self::csv::{read_csv, read_csv_from_reader, write_csv, write_csv_to_writer};
pub use self::json::{from_json_value, read_json, to_json, to_json_value, write_json};
