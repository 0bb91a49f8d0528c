//! Log parsing for the `forge test -vv` console output.

pub mod parse;
pub mod row;

pub use parse::{parse_log_file, parse_output};
pub use row::Measurement;
