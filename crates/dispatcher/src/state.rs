use serde::Serialize;
use std::fmt;

/// Lifecycle of a single invocation.
///
/// `Received -> Validated -> Resolved -> Requested -> Completed`, or `Failed`
/// from whichever state the first error happened in. Both ends are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationState {
    Received,
    Validated,
    Resolved,
    Requested,
    Completed,
    Failed,
}

impl InvocationState {
    fn next(&self) -> Option<InvocationState> {
        match self {
            InvocationState::Received => Some(InvocationState::Validated),
            InvocationState::Validated => Some(InvocationState::Resolved),
            InvocationState::Resolved => Some(InvocationState::Requested),
            InvocationState::Requested => Some(InvocationState::Completed),
            InvocationState::Completed | InvocationState::Failed => None,
        }
    }
}

impl fmt::Display for InvocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvocationState::Received => "received",
            InvocationState::Validated => "validated",
            InvocationState::Resolved => "resolved",
            InvocationState::Requested => "requested",
            InvocationState::Completed => "completed",
            InvocationState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Tracks one invocation through its states.
#[derive(Debug)]
pub(crate) struct Invocation {
    state: InvocationState,
}

impl Invocation {
    pub(crate) fn new() -> Self {
        Self {
            state: InvocationState::Received,
        }
    }

    pub(crate) fn state(&self) -> InvocationState {
        self.state
    }

    /// Moves to the next forward state. Transitions out of a terminal state are ignored.
    pub(crate) fn advance(&mut self) -> InvocationState {
        if let Some(next) = self.state.next() {
            tracing::trace!(from = %self.state, to = %next, "Invocation advanced.");
            self.state = next;
        }
        self.state
    }

    /// Marks the invocation failed and returns the state it failed in.
    pub(crate) fn fail(&mut self) -> InvocationState {
        let failed_at = self.state;
        self.state = InvocationState::Failed;
        failed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_forward_to_completed() {
        let mut inv = Invocation::new();
        assert_eq!(inv.advance(), InvocationState::Validated);
        assert_eq!(inv.advance(), InvocationState::Resolved);
        assert_eq!(inv.advance(), InvocationState::Requested);
        assert_eq!(inv.advance(), InvocationState::Completed);
        assert_eq!(inv.state(), InvocationState::Completed);
        assert_eq!(inv.advance(), InvocationState::Completed);
    }

    #[test]
    fn failure_remembers_where_it_happened() {
        let mut inv = Invocation::new();
        inv.advance();
        assert_eq!(inv.fail(), InvocationState::Validated);
        assert_eq!(inv.state(), InvocationState::Failed);
        assert_eq!(inv.advance(), InvocationState::Failed);
    }
}
