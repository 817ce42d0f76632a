//! Unified diffs of buffer edits

use similar::{DiffTag, TextDiff};
use std::time::Duration;

/// Render the change from `old` to `new` as a unified diff.
///
/// Returns an empty string when the two buffers are identical.
pub fn unified_diff(old: &str, new: &str, name: &str) -> String {
    if old == new {
        return String::new();
    }

    let diff = TextDiff::from_lines(old, new);
    let mut unified = diff.unified_diff();
    unified
        .context_radius(3)
        .header(&format!("a/{}", name), &format!("b/{}", name));
    let rendered = unified.to_string();
    rendered
}

/// Count of inserted and deleted lines between two buffers
pub fn change_counts(old: &str, new: &str) -> (usize, usize) {
    use similar::ChangeTag;

    let diff = TextDiff::from_lines(old, new);
    let counts = diff
        .iter_all_changes()
        .fold((0, 0), |(ins, del), change| match change.tag() {
            ChangeTag::Insert => (ins + 1, del),
            ChangeTag::Delete => (ins, del + 1),
            ChangeTag::Equal => (ins, del),
        });
    counts
}

/// Carry a byte offset in `old` over to the same spot in `new`.
///
/// Offsets in unchanged text keep their place relative to it; offsets inside
/// replaced or deleted text move to the end of what replaced them. The result
/// is always a char boundary of `new`.
pub fn map_offset(old: &str, new: &str, offset: usize) -> usize {
    let mut offset = offset.min(old.len());
    while !old.is_char_boundary(offset) {
        offset -= 1;
    }
    if old == new {
        return offset;
    }

    let old_char = old[..offset].chars().count();
    let diff = TextDiff::configure()
        .timeout(Duration::from_millis(500))
        .diff_chars(old, new);

    let mut new_char = new.chars().count();
    for op in diff.ops() {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        if old_char >= old_range.end {
            continue;
        }
        new_char = match tag {
            DiffTag::Equal => new_range.start + (old_char - old_range.start),
            DiffTag::Delete => new_range.start,
            DiffTag::Replace => new_range.end,
            DiffTag::Insert => continue,
        };
        break;
    }

    new.char_indices()
        .nth(new_char)
        .map(|(i, _)| i)
        .unwrap_or(new.len())
}
