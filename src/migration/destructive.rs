//! Classification and handling of destructive changes.
//!
//! A change kind listed in the configured destructive set is capable of
//! losing data when applied. The policy never blocks generation on its
//! own; it decides, per change, whether the forward statement is emitted
//! with a review annotation (the default) or replaced by a rejection
//! comment. In silent mode the annotation is applied unconditionally;
//! otherwise an injected confirmation hook — an interactive prompt in the
//! CLI, a closure in tests — gets the final say.

use crate::schema::diff::{Change, ChangeKind};
use std::collections::BTreeSet;

/// What happens to one destructive forward statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Emit the statement, preceded by a review comment.
    Annotate,
    /// Replace the statement with a rejection comment.
    Reject,
}

/// Confirmation hook: receives a change description, returns whether the
/// statement may be emitted.
pub type ConfirmFn<'a> = dyn FnMut(&str) -> bool + 'a;

/// The configured destructive-operation policy.
#[derive(Debug, Clone)]
pub struct DestructivePolicy {
    kinds: BTreeSet<ChangeKind>,
    silent: bool,
}

impl DestructivePolicy {
    pub fn new(kinds: impl IntoIterator<Item = ChangeKind>, silent: bool) -> Self {
        DestructivePolicy {
            kinds: kinds.into_iter().collect(),
            silent,
        }
    }

    /// The default destructive set: everything that drops or rewrites
    /// existing structure.
    pub fn default_kinds() -> Vec<ChangeKind> {
        vec![
            ChangeKind::TableRemoved,
            ChangeKind::FieldRemoved,
            ChangeKind::IndexRemoved,
            ChangeKind::TableRenamed,
            ChangeKind::FieldRenamed,
            ChangeKind::FieldModified,
        ]
    }

    /// True when the change's kind is in the destructive set.
    pub fn is_destructive(&self, change: &Change) -> bool {
        self.kinds.contains(&change.kind())
    }

    /// Decides the fate of one change. `None` means it is not destructive
    /// and needs no special handling.
    pub fn resolve(&self, change: &Change, confirm: Option<&mut ConfirmFn<'_>>) -> Option<Verdict> {
        if !self.is_destructive(change) {
            return None;
        }
        if self.silent {
            return Some(Verdict::Annotate);
        }
        match confirm {
            Some(hook) => {
                if hook(&change.describe()) {
                    Some(Verdict::Annotate)
                } else {
                    Some(Verdict::Reject)
                }
            }
            None => Some(Verdict::Annotate),
        }
    }
}
