pub mod errors;
pub mod loader;
pub mod model;
pub mod nested;
pub mod schema;

pub use errors::LoaderError;
pub use loader::{load_json_lines, load_json_lines_from_str};
pub use model::{CorruptRecordMode, LoadReport, LoadedSource};
pub use nested::{decode_json_record, decode_json_records};

#[cfg(test)]
mod tests;
