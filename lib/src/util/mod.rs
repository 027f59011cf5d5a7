mod macros;
mod path_ext;

pub use path_ext::*;
pub use macros::*;

/// The first non-empty line of `input`, trimmed.
pub fn first_line(input: &str) -> Option<&str> {
    input.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
}

/// Every non-empty line of `input`, trimmed.
pub fn non_empty_lines(input: &str) -> impl Iterator<Item = &str> {
    input.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
}
