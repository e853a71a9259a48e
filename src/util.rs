use alloc::{format, string::String};

/// Marks a branch that can only be reached when an `*_after_check` extraction
/// was called on a slot that did not pass the strict check.
///
/// # Safety
///
/// The caller must only call this from a branch that is unreachable as long
/// as its own caller upheld the "checked first" precondition.
#[cold]
#[track_caller]
pub(crate) unsafe fn unchecked_extraction() -> ! {
    if cfg!(debug_assertions) {
        unreachable!("Value was extracted from an `Any` slot without passing the strict check")
    } else {
        // SAFETY: This unsafe block *will* cause Undefined Behavior. However our
        // caller guarantees that this branch is only reached when the strict check
        // was skipped, which its own callers promised not to do.
        unsafe { core::hint::unreachable_unchecked() }
    }
}

/// Builds a schema string for a type without arguments.
pub(crate) fn schema(type_name: &str) -> String {
    format!(r#"{{"type":"{type_name}"}}"#)
}

/// Builds a schema string for a type with nested argument schemas.
pub(crate) fn schema_with_args(type_name: &str, args: &[String]) -> String {
    format!(r#"{{"type":"{type_name}","args":[{}]}}"#, args.join(","))
}
