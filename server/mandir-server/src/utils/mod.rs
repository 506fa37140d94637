pub mod csv_io;
pub mod query_builder;

pub use csv_io::*;
pub use query_builder::*;
