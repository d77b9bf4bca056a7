// Utils

pub mod text;

pub use text::{is_letter, ratio, split_keep_empty, SPECIAL_CHARS};
