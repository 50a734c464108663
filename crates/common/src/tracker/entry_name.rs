//! Directory entry naming for issues.
//!
//! An issue is listed as `"<id>-<subject>"`. Lookup only needs the leading
//! run of ASCII digits, so the subject never has to be matched back: any
//! suffix after the digits is ignored. Two names sharing a numeric prefix
//! resolve to the same issue, and a subject that itself looks like
//! `<digits>-...` is not special-cased.

/// Separator between the issue id and its subject
pub const ENTRY_NAME_SEPARATOR: char = '-';

/// Replacement for characters a path component cannot carry
const REPLACEMENT: char = '_';

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryNameError {
    #[error("entry name does not start with an issue id: {0:?}")]
    NoLeadingDigits(String),
    #[error("issue id in entry name is out of range: {0:?}")]
    OutOfRange(String),
}

/// Build the directory entry name for an issue
pub fn issue_entry_name(id: u64, subject: &str) -> String {
    format!("{id}{ENTRY_NAME_SEPARATOR}{}", sanitize_component(subject))
}

/// Extract the issue id from an entry name.
///
/// Only the leading decimal digits participate; `"42-Fix bug"`, `"42"` and
/// `"42-anything else"` all yield `42`.
pub fn parse_issue_id(name: &str) -> Result<u64, EntryNameError> {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Err(EntryNameError::NoLeadingDigits(name.to_string()));
    }

    name[..digits]
        .parse::<u64>()
        .map_err(|_| EntryNameError::OutOfRange(name.to_string()))
}

/// Make a tracker-supplied string usable as a single path component.
///
/// `/` and NUL cannot appear in a directory entry name and are replaced;
/// everything else (case, unicode form, whitespace) is kept byte-for-byte.
pub fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '/' | '\0' => REPLACEMENT,
            c => c,
        })
        .collect()
}
