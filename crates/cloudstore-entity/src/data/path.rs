//! Virtual path conventions shared by the metadata and physical sides.

/// Identifier of the implicit root directory.
pub const ROOT_ID: i64 = 0;

/// Virtual path of the root directory.
pub const ROOT_PATH: &str = "/";

/// Characters that may never appear in an entry name.
pub const RESERVED_CHARS: [char; 9] = ['/', '\\', ':', '*', '"', '\'', '<', '>', '|'];

/// Slash-terminated path of the children of `parent_path + name`.
pub fn child_prefix(parent_path: &str, name: &str) -> String {
    format!("{parent_path}{name}/")
}

/// Whether `name` is usable as an entry name.
///
/// `.` and `..` would resolve outside the slot on disk.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(RESERVED_CHARS)
}
