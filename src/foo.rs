//! The library function wrapped by the `foo` command.

/// Returns `target` unchanged.
pub fn foo(target: &str) -> String {
    target.to_owned()
}
