//! The cell-edit session state machine.
//!
//! At most one cell is mid-edit at any time, system-wide:
//!
//! ```text
//! Idle --begin--> Editing(row_key, column_key, draft) --commit/cancel--> Idle
//! ```
//!
//! While editing, the draft value can change freely without touching the
//! underlying row. The actual row mutation on commit is the grid facade's
//! job (it owns the row set); this controller owns only the session state
//! and its transitions.

use crate::model::{CellValue, RowKey};

/// An in-flight edit: the target cell and the uncommitted draft value.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    /// Identity of the row being edited.
    pub row_key: RowKey,
    /// Key of the column being edited.
    pub column_key: String,
    /// The current draft value; not written to the row until commit.
    pub draft: CellValue,
}

/// The edit state machine. `None` session means Idle.
#[derive(Debug, Default)]
pub struct EditController {
    session: Option<EditSession>,
}

impl EditController {
    /// Creates an idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Returns `true` while a cell is mid-edit.
    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    /// Returns `true` if the given cell is the one being edited.
    pub fn is_editing_cell(&self, row_key: &RowKey, column_key: &str) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| &s.row_key == row_key && s.column_key == column_key)
    }

    /// Enters the Editing state for a cell, seeding the draft with the
    /// cell's current value.
    ///
    /// Any prior session must already be resolved: the facade commits it
    /// before calling this, so two simultaneously-true Editing states can
    /// never be observed.
    pub fn begin(&mut self, row_key: RowKey, column_key: String, initial: CellValue) {
        debug_assert!(
            self.session.is_none(),
            "edit session started while another is active"
        );
        tracing::debug!(
            target: "horizon_datagrid::editing",
            row = %row_key,
            column = %column_key,
            "begin edit"
        );
        self.session = Some(EditSession {
            row_key,
            column_key,
            draft: initial,
        });
    }

    /// Updates the draft value. No-op when idle.
    pub fn update_draft(&mut self, value: CellValue) {
        if let Some(session) = &mut self.session {
            session.draft = value;
        }
    }

    /// Leaves the Editing state, returning the session for the facade to
    /// commit. `None` when idle.
    pub fn take_for_commit(&mut self) -> Option<EditSession> {
        let session = self.session.take();
        if let Some(s) = &session {
            tracing::debug!(
                target: "horizon_datagrid::editing",
                row = %s.row_key,
                column = %s.column_key,
                "commit edit"
            );
        }
        session
    }

    /// Leaves the Editing state discarding the draft. Returns `true` if a
    /// session was actually cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.session.take() {
            Some(s) => {
                tracing::debug!(
                    target: "horizon_datagrid::editing",
                    row = %s.row_key,
                    column = %s.column_key,
                    "cancel edit"
                );
                true
            }
            None => false,
        }
    }
}
