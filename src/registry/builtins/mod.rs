//! Standard safe-function set, grouped by category

mod array;
mod conversion;
mod datetime;
mod json;
mod math;
mod object;
mod string;

use super::function::SafeFunction;

/// Every function in the standard set.
pub(super) fn all() -> Vec<SafeFunction> {
    let mut out = Vec::new();
    out.extend(string::functions());
    out.extend(math::functions());
    out.extend(array::functions());
    out.extend(object::functions());
    out.extend(json::functions());
    out.extend(conversion::functions());
    out.extend(datetime::functions());
    out
}
