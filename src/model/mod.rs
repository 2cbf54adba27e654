//! Value model: the dynamic value variant, ECMAScript coercions and
//! property paths

pub mod convert;
pub mod path;
pub mod value;

pub use convert::{
    NOT_AN_INDEX, compare, format_number, loose_equals, parse_numeric_string, strict_equals,
    to_array_index, to_boolean, to_number, to_string_value,
};
pub use path::{PathError, PathSegment, build_path, parse_path};
pub use value::Value;
