pub mod polars_utils;
pub mod reader;
pub mod writer;

pub use polars_utils::{
    any_to_days, any_to_f64, any_to_string, format_numeric, is_numeric_dtype, parse_days,
    parse_f64,
};
pub use reader::read_csv_frame;
pub use writer::write_csv_frame;
