// src/export/mod.rs

pub mod csv;
pub mod parquet;
pub mod points;

pub use self::csv::write_table;
pub use self::parquet::{read_record_set, write_record_set};
pub use self::points::write_points;
