use crate::request::{ConfirmOptions, RequestId};
use crate::view::DialogCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogPhase {
    /// Mounted but not yet shown; becomes `Opening` on the next tick.
    Closed,
    /// First frame with `open = true`.
    Opening,
    Open,
    /// Finalized; waiting for the registry to evict the request.
    Closing,
}

/// Provider-side state of one live request.
#[derive(Debug)]
pub struct DialogView {
    pub(crate) id: RequestId,
    pub(crate) options: ConfirmOptions,
    pub(crate) cursor: DialogCursor,
    phase: DialogPhase,
}

impl DialogView {
    pub(crate) fn new(id: RequestId, options: ConfirmOptions) -> Self {
        Self {
            id,
            options,
            cursor: DialogCursor::default(),
            phase: DialogPhase::Closed,
        }
    }

    pub fn id(&self) -> &RequestId {
        &self.id
    }

    pub fn options(&self) -> &ConfirmOptions {
        &self.options
    }

    pub fn phase(&self) -> DialogPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        matches!(self.phase, DialogPhase::Opening | DialogPhase::Open)
    }

    pub fn is_closing(&self) -> bool {
        self.phase == DialogPhase::Closing
    }

    pub(crate) fn advance(&mut self) -> bool {
        let next = match self.phase {
            DialogPhase::Closed => DialogPhase::Opening,
            DialogPhase::Opening => DialogPhase::Open,
            DialogPhase::Open | DialogPhase::Closing => return false,
        };
        self.phase = next;
        true
    }

    /// Returns `false` if the view was already closing.
    pub(crate) fn begin_closing(&mut self) -> bool {
        if self.phase == DialogPhase::Closing {
            return false;
        }
        self.phase = DialogPhase::Closing;
        true
    }
}
