//! Guarded rejection-remark buffer.
//!
//! The composing textarea is seeded with an immutable `"[<name> - <role>]: "`
//! prefix. Every input event is checked: an edit that would shorten the
//! content below the prefix or corrupt the prefix text is reverted and the
//! cursor is parked just after the prefix. The invariant is simply that the
//! first N characters of the buffer always equal the canonical prefix.
use crate::stage::Role;

/// The remark text after a seeded `"[<name> - <role>]: "` prefix, or the
/// whole string when no such prefix is present. Rejection remarks arrive as
/// full editor content, so blank-checks must look past the prefix.
pub fn remark_body(remarks: &str) -> &str {
    if remarks.starts_with('[') {
        if let Some(end) = remarks.find("]: ") {
            if remarks[..end].contains(" - ") {
                return &remarks[end + 3..];
            }
        }
    }
    remarks
}

/// What happened to an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Accepted,
    /// The edit was thrown away; the caller must move the cursor here
    /// (a character offset, just past the prefix).
    Reverted { cursor: usize },
}

#[derive(Debug, Clone)]
pub struct RemarkEditor {
    prefix: String,
    // char count of the prefix, fixed at seed time
    prefix_chars: usize,
    content: String,
}

impl RemarkEditor {
    /// Seed the buffer for the acting user. The prefix is recomputed from
    /// the actor's name and role here and never changes afterwards.
    pub fn seed(actor_name: &str, role: Role) -> Self {
        let prefix = format!("[{} - {}]: ", actor_name, role.label());
        Self {
            prefix_chars: prefix.chars().count(),
            content: prefix.clone(),
            prefix,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// The user-written part after the prefix.
    pub fn body(&self) -> &str {
        &self.content[self.prefix.len()..]
    }

    pub fn has_body(&self) -> bool {
        !self.body().trim().is_empty()
    }

    /// Apply one input event carrying the field's proposed full content.
    pub fn apply_input(&mut self, proposed: &str) -> Edit {
        if proposed.starts_with(&self.prefix) {
            self.content = proposed.to_string();
            return Edit::Accepted;
        }
        Edit::Reverted {
            cursor: self.prefix_chars,
        }
    }
}
