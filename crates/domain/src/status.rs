//! User lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use authora_core::Error;

/// Lifecycle state of a user account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    /// Invited, not yet registered.
    Invited,
    /// Registered but email/phone not confirmed.
    PendingVerification,
    /// Exists but not enabled (admin or system hold).
    Inactive,
    /// Fully verified and allowed to use the system.
    Active,
    /// Inactive for a long period, auto-marked dormant.
    Dormant,
    /// Temporarily blocked by admin or system rule.
    Suspended,
    /// Auto-locked (e.g. too many failed logins).
    Locked,
    /// Permanently blocked for policy violation.
    Banned,
    /// User voluntarily deactivated the account.
    Deactivated,
    /// Retained for records, no login allowed.
    Archived,
    /// Removal state; the record itself is kept.
    Deleted,
}

impl State {
    /// Legal targets from this state. Absence of an edge means the
    /// transition is illegal.
    ///
    /// Locked, Banned, and Archived are declared without inbound or outbound
    /// edges; they are preserved as unreachable pending a product decision.
    pub fn allowed_transitions(self) -> &'static [State] {
        use State::*;
        match self {
            Invited => &[PendingVerification, Deleted],
            PendingVerification => &[Active, Inactive, Deleted],
            Active => &[Suspended, Dormant, Deactivated, Deleted],
            Suspended => &[Active, Banned, Deleted],
            Dormant => &[Active, Deleted],
            Deactivated => &[Active, Deleted],
            Inactive | Locked | Banned | Archived | Deleted => &[],
        }
    }

    pub fn can_transition_to(self, next: State) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

impl core::fmt::Display for State {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            State::Invited => "invited",
            State::PendingVerification => "pending_verification",
            State::Inactive => "inactive",
            State::Active => "active",
            State::Dormant => "dormant",
            State::Suspended => "suspended",
            State::Locked => "locked",
            State::Banned => "banned",
            State::Deactivated => "deactivated",
            State::Archived => "archived",
            State::Deleted => "deleted",
        };
        f.write_str(name)
    }
}

/// Illegal state-change request. The status is left untouched on failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    #[error("status is already in state {0}")]
    AlreadyInState(State),

    #[error("illegal transition from {from} to {to}")]
    InvalidTransition { from: State, to: State },
}

impl From<StatusError> for Error {
    fn from(value: StatusError) -> Self {
        Error::validation(value.to_string())
    }
}

/// Current lifecycle position: state, the state it came from, and when the
/// change occurred. Owned exclusively by the User aggregate and mutated only
/// through [`Status::change_state`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub state: State,
    pub previous: Option<State>,
    pub occurred_at: DateTime<Utc>,
}

impl Status {
    pub fn new(state: State) -> Self {
        Self {
            state,
            previous: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn invited() -> Self {
        Self::new(State::Invited)
    }

    pub fn pending_verification() -> Self {
        Self::new(State::PendingVerification)
    }

    pub fn active() -> Self {
        Self::new(State::Active)
    }

    /// Move to `next` if the transition table allows it.
    pub fn change_state(&mut self, next: State) -> Result<(), StatusError> {
        if self.state == next {
            return Err(StatusError::AlreadyInState(next));
        }
        if !self.state.can_transition_to(next) {
            return Err(StatusError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        self.previous = Some(self.state);
        self.state = next;
        self.occurred_at = Utc::now();
        Ok(())
    }

    pub fn is_invited(&self) -> bool {
        self.state == State::Invited
    }

    pub fn is_pending_verification(&self) -> bool {
        self.state == State::PendingVerification
    }

    pub fn is_inactive(&self) -> bool {
        self.state == State::Inactive
    }

    pub fn is_active(&self) -> bool {
        self.state == State::Active
    }

    pub fn is_dormant(&self) -> bool {
        self.state == State::Dormant
    }

    pub fn is_suspended(&self) -> bool {
        self.state == State::Suspended
    }

    pub fn is_locked(&self) -> bool {
        self.state == State::Locked
    }

    pub fn is_banned(&self) -> bool {
        self.state == State::Banned
    }

    pub fn is_deactivated(&self) -> bool {
        self.state == State::Deactivated
    }

    pub fn is_archived(&self) -> bool {
        self.state == State::Archived
    }

    pub fn is_deleted(&self) -> bool {
        self.state == State::Deleted
    }
}
