//! Document coordinator: section locking and edit broadcast (§4.4).
//!
//! All state here is a plain `HashMap`, not a `DashMap` — the coordinator is
//! meant to be driven by exactly one owner (typically one agent's message
//! loop), the same serialization discipline the document coordinator gets
//! in §4.4 by only ever processing one `LOCK_REQUEST`/`DOC_EDIT` at a time.
//! Concurrent structures would just be overhead here.
//!
//! A document is partitioned into fixed-width [`SECTION_WIDTH`] sections;
//! `section_count` is `ceil(document_size / SECTION_WIDTH)`, at least one.
//! Sections are created lazily on first touch, but `section_idx` is always
//! bounds-checked against `section_count` first.

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::section::{LockState, Section, SECTION_WIDTH};
use crate::error::RuntimeError;
use crate::ids::AgentId;
use crate::message::{Message, MessageKind, Payload};

/// Coordinates exclusive section locks and edits across a shared document.
pub struct DocumentCoordinator {
    sections: HashMap<usize, Section>,
    section_count: usize,
}

impl DocumentCoordinator {
    /// Partition a document of `document_size` bytes into fixed-width
    /// sections. Always yields at least one section.
    pub fn new(document_size: usize) -> Self {
        let section_count = ((document_size + SECTION_WIDTH - 1) / SECTION_WIDTH).max(1);
        Self {
            sections: HashMap::new(),
            section_count,
        }
    }

    /// Total number of sections this document was partitioned into.
    pub fn section_count(&self) -> usize {
        self.section_count
    }

    fn section_mut(&mut self, idx: usize) -> Option<&mut Section> {
        if idx >= self.section_count {
            return None;
        }
        let start = idx * SECTION_WIDTH;
        let end = start + SECTION_WIDTH;
        Some(self.sections.entry(idx).or_insert_with(|| Section::new(start, end)))
    }

    /// Handle a `LOCK_REQUEST`. Returns the reply to send back to
    /// `requester`: `LockAcquired` if `section_idx` is in range and the
    /// section was free (or already held by `requester`), `LockDenied`
    /// otherwise (including when `section_idx` is out of range).
    pub fn request_lock(&mut self, section_idx: usize, requester: AgentId) -> Message {
        let granted = match self.section_mut(section_idx) {
            None => false,
            Some(section) => match section.lock {
                LockState::Free => {
                    section.lock = LockState::Held(requester);
                    true
                }
                LockState::Held(holder) => holder == requester,
            },
        };

        let kind = if granted {
            MessageKind::LockAcquired
        } else {
            MessageKind::LockDenied
        };
        Message::new(None, requester, kind, Payload::Section { section_idx })
    }

    /// Handle a `LOCK_RELEASE`. Only the current holder may release; an
    /// out-of-range or never-locked section is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Policy` if `requester` does not hold the lock.
    pub fn release_lock(&mut self, section_idx: usize, requester: AgentId) -> Result<(), RuntimeError> {
        let Some(section) = self.section_mut(section_idx) else {
            return Ok(());
        };
        match section.lock {
            LockState::Held(holder) if holder == requester => {
                section.lock = LockState::Free;
                Ok(())
            }
            LockState::Free => Ok(()),
            LockState::Held(_) => Err(RuntimeError::Policy(format!(
                "agent {requester} does not hold lock on section {section_idx}"
            ))),
        }
    }

    /// Apply a `DOC_EDIT`, requiring `editor` to hold the section's lock.
    /// `bytes` is truncated to the section's width before being stored.
    ///
    /// Returns the `DOC_UPDATE` broadcast to emit on success; the caller is
    /// responsible for excluding `editor` itself when delivering it.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Input` if `section_idx` is out of range, or
    /// `RuntimeError::Policy` if `editor` does not hold the lock.
    pub fn edit(
        &mut self,
        section_idx: usize,
        editor: AgentId,
        mut bytes: Vec<u8>,
    ) -> Result<Message, RuntimeError> {
        let section_count = self.section_count;
        let section = self.section_mut(section_idx).ok_or_else(|| {
            RuntimeError::Input(format!("section {section_idx} is out of range (0..{section_count})"))
        })?;
        if !section.is_locked_by(editor) {
            return Err(RuntimeError::Policy(format!(
                "agent {editor} must hold the lock on section {section_idx} to edit it"
            )));
        }
        bytes.truncate(section.width());
        section.content = bytes;
        Ok(Message::broadcast(
            Some(editor),
            MessageKind::DocUpdate,
            Payload::DocUpdate { section_idx },
        ))
    }

    /// Current content of a section, or an empty slice if never written or
    /// out of range.
    pub fn read(&self, section_idx: usize) -> &[u8] {
        self.sections
            .get(&section_idx)
            .map(|s| s.content.as_slice())
            .unwrap_or(&[])
    }

    /// Who currently holds a section's lock, if anyone.
    pub fn lock_holder(&self, section_idx: usize) -> Option<AgentId> {
        match self.sections.get(&section_idx).map(|s| s.lock) {
            Some(LockState::Held(holder)) => Some(holder),
            _ => None,
        }
    }
}
