//! Extracts commit subjects from mailbox patches.

const SUBJECT_PREFIX: &str = "Subject: [PATCH";

/// Returns the subject of every commit in a mailbox patch.
///
/// The `[PATCH n/m]` tag is dropped. Subjects folded onto continuation
/// lines are joined with a single space.
pub(crate) fn mailbox_subjects(patch: &str) -> Vec<String> {
    let mut subjects = Vec::new();
    let mut lines = patch.lines().peekable();
    while let Some(line) = lines.next() {
        let Some(mut subject) = subject_of(line) else {
            continue;
        };
        while let Some(continuation) = lines.next_if(|next| next.starts_with([' ', '\t'])) {
            subject.push(' ');
            subject.push_str(continuation.trim());
        }
        subjects.push(subject);
    }
    subjects
}

/// Parses `Subject: [PATCH 2/3] text` into `text`.
fn subject_of(line: &str) -> Option<String> {
    let tag = line.strip_prefix(SUBJECT_PREFIX)?;
    let rest = tag.trim_start_matches(|character: char| {
        character.is_ascii_digit() || character == '/' || character == ' '
    });
    rest.strip_prefix("] ")
        .map(|subject| subject.trim_end().to_owned())
}
