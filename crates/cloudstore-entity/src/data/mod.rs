//! Data (file and directory) domain entities.

pub mod model;
pub mod path;

pub use model::{CreateDataInfo, DataInfo, DataView};
pub use path::{ROOT_ID, ROOT_PATH, child_prefix, is_valid_name};
