use serde::{Deserialize, Serialize};

/// Lifecycle of a single-use invitation code. The tagged variant makes a
/// consumed invitation without a consumer unrepresentable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "UPPERCASE")]
pub enum InvitationState {
    Unconsumed,
    Consumed { consumed_by: String },
}

impl InvitationState {
    pub fn is_consumed(&self) -> bool {
        matches!(self, InvitationState::Consumed { .. })
    }
}

/// A single-use code granting enrollment into an identity group.
/// Transitions strictly Unconsumed -> Consumed, never back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub identity_group: String,
    pub code: String,
    pub name: String,
    pub email: String,
    pub created: i64,
    #[serde(flatten)]
    pub state: InvitationState,
}

impl Invitation {
    pub fn new(
        identity_group: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        created: i64,
    ) -> Self {
        Self {
            identity_group: identity_group.into(),
            code: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            created,
            state: InvitationState::Unconsumed,
        }
    }

    /// The consumed rendition of this invitation. State semantics are
    /// enforced by the ledger, not here.
    pub fn consumed_by(&self, consumer: impl Into<String>) -> Self {
        let mut consumed = self.clone();
        consumed.state = InvitationState::Consumed {
            consumed_by: consumer.into(),
        };
        consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_invitation_is_unconsumed() {
        let invitation = Invitation::new("G1", "alice", "alice@example.com", 1_700_000_000);
        assert_eq!(invitation.state, InvitationState::Unconsumed);
        assert!(!invitation.state.is_consumed());
        assert!(!invitation.code.is_empty());
    }

    #[test]
    fn test_consumed_state_carries_consumer() {
        let invitation = Invitation::new("G1", "alice", "alice@example.com", 1_700_000_000);
        let consumed = invitation.consumed_by("member-7");
        match consumed.state {
            InvitationState::Consumed { ref consumed_by } => assert_eq!(consumed_by, "member-7"),
            InvitationState::Unconsumed => panic!("expected consumed state"),
        }
        assert_eq!(consumed.code, invitation.code);
    }

    #[test]
    fn test_state_serializes_tagged() {
        let invitation = Invitation::new("G1", "alice", "alice@example.com", 1_700_000_000);
        let json = serde_json::to_string(&invitation).unwrap();
        assert!(json.contains(r#""state":"UNCONSUMED""#));

        let json = serde_json::to_string(&invitation.consumed_by("member-7")).unwrap();
        assert!(json.contains(r#""state":"CONSUMED""#));
        assert!(json.contains("member-7"));
    }
}
