#![allow(dead_code)]

//! Confirmation state machine gating irreversible deletions.
//!
//! `Idle → Prompting{step} → Armed → Executing → {Completed | Failed}`
//!
//! Each prompting step requires an explicit confirmation. When a typed token
//! is required, the final step arms only on a case-insensitive exact match;
//! anything else leaves the session at the final prompting step. Cancel is
//! available from any prompting or armed state and returns to `Idle` with no
//! side effects. Terminal states reset back to `Idle` so the workflow is
//! always resumable.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationState {
    Idle,
    Prompting { step: usize },
    Armed,
    Executing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("workflow is already in progress")]
    AlreadyActive,

    #[error("no confirmation step is pending")]
    NotPrompting,

    #[error("typed confirmation does not match the required token")]
    TokenMismatch,

    #[error("workflow is not armed for execution")]
    NotArmed,

    #[error("workflow is not executing")]
    NotExecuting,

    #[error("nothing to cancel")]
    NotCancellable,
}

#[derive(Debug, Clone)]
pub struct ConfirmationSession {
    steps: usize,
    required_token: Option<String>,
    typed_text: String,
    state: ConfirmationState,
}

impl ConfirmationSession {
    /// A session with `steps` prompting steps (at least one) and an optional
    /// token the user must type before the final step can arm.
    pub fn new(steps: usize, required_token: Option<&str>) -> Self {
        Self {
            steps: steps.max(1),
            required_token: required_token.map(str::to_string),
            typed_text: String::new(),
            state: ConfirmationState::Idle,
        }
    }

    pub fn state(&self) -> ConfirmationState {
        self.state
    }

    pub fn armed(&self) -> bool {
        self.state == ConfirmationState::Armed
    }

    /// Records the user's typed text; checked when the final step confirms.
    pub fn record_input(&mut self, text: &str) {
        self.typed_text = text.to_string();
    }

    /// `Idle → Prompting{0}`.
    pub fn begin(&mut self) -> Result<ConfirmationState, TransitionError> {
        if self.state != ConfirmationState::Idle {
            return Err(TransitionError::AlreadyActive);
        }
        self.state = ConfirmationState::Prompting { step: 0 };
        Ok(self.state)
    }

    /// Confirms the current prompting step. Intermediate steps advance; the
    /// final step arms, subject to the token check. On token mismatch the
    /// state is left at the final prompting step.
    pub fn confirm(&mut self) -> Result<ConfirmationState, TransitionError> {
        match self.state {
            ConfirmationState::Prompting { step } if step + 1 < self.steps => {
                self.state = ConfirmationState::Prompting { step: step + 1 };
                Ok(self.state)
            }
            ConfirmationState::Prompting { .. } => {
                if let Some(token) = &self.required_token {
                    if !self.typed_text.eq_ignore_ascii_case(token) {
                        return Err(TransitionError::TokenMismatch);
                    }
                }
                self.state = ConfirmationState::Armed;
                Ok(self.state)
            }
            _ => Err(TransitionError::NotPrompting),
        }
    }

    /// `Prompting | Armed → Idle`, with no side effects.
    pub fn cancel(&mut self) -> Result<(), TransitionError> {
        match self.state {
            ConfirmationState::Prompting { .. } | ConfirmationState::Armed => {
                self.typed_text.clear();
                self.state = ConfirmationState::Idle;
                Ok(())
            }
            _ => Err(TransitionError::NotCancellable),
        }
    }

    /// `Armed → Executing`.
    pub fn execute(&mut self) -> Result<(), TransitionError> {
        if self.state != ConfirmationState::Armed {
            return Err(TransitionError::NotArmed);
        }
        self.state = ConfirmationState::Executing;
        Ok(())
    }

    /// `Executing → Completed`.
    pub fn complete(&mut self) -> Result<(), TransitionError> {
        if self.state != ConfirmationState::Executing {
            return Err(TransitionError::NotExecuting);
        }
        self.state = ConfirmationState::Completed;
        Ok(())
    }

    /// `Executing → Failed`.
    pub fn fail(&mut self) -> Result<(), TransitionError> {
        if self.state != ConfirmationState::Executing {
            return Err(TransitionError::NotExecuting);
        }
        self.state = ConfirmationState::Failed;
        Ok(())
    }

    /// Returns to `Idle` from any state, clearing typed input, so a failed or
    /// completed workflow never leaves the session dangling.
    pub fn reset(&mut self) {
        self.typed_text.clear();
        self.state = ConfirmationState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn session() -> ConfirmationSession {
        ConfirmationSession::new(2, Some("DELETE"))
    }

    #[test]
    fn test_full_walk_to_completed() {
        let mut s = session();
        assert_eq!(s.begin().unwrap(), ConfirmationState::Prompting { step: 0 });
        assert_eq!(s.confirm().unwrap(), ConfirmationState::Prompting { step: 1 });
        s.record_input("DELETE");
        assert_eq!(s.confirm().unwrap(), ConfirmationState::Armed);
        s.execute().unwrap();
        s.complete().unwrap();
        assert_eq!(s.state(), ConfirmationState::Completed);
    }

    #[test]
    fn test_token_match_is_case_insensitive() {
        for typed in ["delete", "DELETE", "Delete"] {
            let mut s = session();
            s.begin().unwrap();
            s.confirm().unwrap();
            s.record_input(typed);
            assert_eq!(s.confirm().unwrap(), ConfirmationState::Armed, "typed {typed:?}");
        }
    }

    #[test]
    fn test_wrong_token_keeps_final_prompting_step() {
        let mut s = session();
        s.begin().unwrap();
        s.confirm().unwrap();
        s.record_input("delet");
        assert_eq!(s.confirm().unwrap_err(), TransitionError::TokenMismatch);
        assert_eq!(s.state(), ConfirmationState::Prompting { step: 1 });
        assert!(!s.armed());

        // correcting the input arms on the next confirm
        s.record_input("delete");
        assert_eq!(s.confirm().unwrap(), ConfirmationState::Armed);
    }

    #[test]
    fn test_cannot_arm_before_final_step() {
        let mut s = ConfirmationSession::new(3, Some("DELETE"));
        s.begin().unwrap();
        s.record_input("DELETE");
        assert_eq!(s.confirm().unwrap(), ConfirmationState::Prompting { step: 1 });
        assert_eq!(s.confirm().unwrap(), ConfirmationState::Prompting { step: 2 });
        assert!(!s.armed());
        assert_eq!(s.confirm().unwrap(), ConfirmationState::Armed);
    }

    #[test]
    fn test_no_token_required_arms_on_final_confirm() {
        let mut s = ConfirmationSession::new(1, None);
        s.begin().unwrap();
        assert_eq!(s.confirm().unwrap(), ConfirmationState::Armed);
    }

    #[test]
    fn test_cancel_from_prompting_and_armed() {
        let mut s = session();
        s.begin().unwrap();
        s.cancel().unwrap();
        assert_eq!(s.state(), ConfirmationState::Idle);

        s.begin().unwrap();
        s.confirm().unwrap();
        s.record_input("DELETE");
        s.confirm().unwrap();
        assert!(s.armed());
        s.cancel().unwrap();
        assert_eq!(s.state(), ConfirmationState::Idle);
    }

    #[test]
    fn test_cancel_clears_typed_text() {
        let mut s = session();
        s.begin().unwrap();
        s.confirm().unwrap();
        s.record_input("DELETE");
        s.cancel().unwrap();

        // a new run must not inherit the old typed token
        s.begin().unwrap();
        s.confirm().unwrap();
        assert_eq!(s.confirm().unwrap_err(), TransitionError::TokenMismatch);
    }

    #[test]
    fn test_failed_workflow_is_resumable() {
        let mut s = session();
        s.begin().unwrap();
        s.confirm().unwrap();
        s.record_input("DELETE");
        s.confirm().unwrap();
        s.execute().unwrap();
        s.fail().unwrap();
        assert_eq!(s.state(), ConfirmationState::Failed);

        s.reset();
        assert_eq!(s.state(), ConfirmationState::Idle);
        assert!(s.begin().is_ok());
    }

    #[test]
    fn test_confirm_outside_prompting_rejected() {
        let mut s = session();
        assert_eq!(s.confirm().unwrap_err(), TransitionError::NotPrompting);
        s.begin().unwrap();
        s.confirm().unwrap();
        s.record_input("delete");
        s.confirm().unwrap();
        s.execute().unwrap();
        assert_eq!(s.confirm().unwrap_err(), TransitionError::NotPrompting);
    }

    #[test]
    fn test_execute_requires_armed() {
        let mut s = session();
        assert_eq!(s.execute().unwrap_err(), TransitionError::NotArmed);
        s.begin().unwrap();
        assert_eq!(s.execute().unwrap_err(), TransitionError::NotArmed);
    }

    #[test]
    fn test_double_begin_rejected() {
        let mut s = session();
        s.begin().unwrap();
        assert_eq!(s.begin().unwrap_err(), TransitionError::AlreadyActive);
    }

    proptest! {
        /// A rejected transition never moves the state.
        #[test]
        fn prop_failed_transitions_leave_state_unchanged(typed in "[a-zA-Z]{0,8}") {
            let mut s = session();
            s.begin().unwrap();
            s.confirm().unwrap();
            s.record_input(&typed);
            let before = s.state();
            let result = s.confirm();
            if typed.eq_ignore_ascii_case("DELETE") {
                prop_assert_eq!(result.unwrap(), ConfirmationState::Armed);
            } else {
                prop_assert_eq!(result.unwrap_err(), TransitionError::TokenMismatch);
                prop_assert_eq!(s.state(), before);
            }
        }
    }
}
