//! Combining compliance errors with a host validator's field errors.

use compliance_core::FieldErrors;

/// Merge compliance errors with native field-validation errors.
///
/// Keys keep compliance order first, then native-only keys in their own
/// order. Under a shared key the compliance messages come first.
#[must_use]
pub fn merge_errors(compliance: FieldErrors, native: FieldErrors) -> FieldErrors {
    let mut merged = compliance;
    for (field, messages) in native {
        merged.entry(field).or_default().extend(messages);
    }
    merged.retain(|_, messages| !messages.is_empty());
    merged
}
