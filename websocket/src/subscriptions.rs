//! Subscription protocol for WebSocket clients.

use serde::{Deserialize, Serialize};

use kycgate_types::{Role, UserId};
use kycgate_verification::StatusChange;

/// A message from a client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start (or replace) the status-change subscription.
    Subscribe {
        #[serde(default)]
        filter: SubscriptionFilter,
    },
    Unsubscribe,
    Ping,
}

/// Optional filter for a subscription. Absent lists match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFilter {
    /// Only receive changes for these users.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<UserId>>,
    /// Only receive changes for these roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
}

impl SubscriptionFilter {
    pub fn matches(&self, change: &StatusChange) -> bool {
        let user_ok = self
            .users
            .as_ref()
            .map_or(true, |users| users.contains(&change.user));
        let role_ok = self
            .roles
            .as_ref()
            .map_or(true, |roles| roles.contains(&change.role));
        user_ok && role_ok
    }
}

/// A message sent to clients.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Ack { action: String },
    Error { message: String },
    Pong,
    StatusChange(StatusChange),
}

#[cfg(test)]
mod tests {
    use super::*;
    use kycgate_types::{KycStatus, Timestamp};
    use kycgate_verification::ChangeCause;

    fn change(user: &str, role: Role) -> StatusChange {
        StatusChange {
            user: UserId::new(user).unwrap(),
            role,
            status: KycStatus::Approved,
            correlation_id: None,
            decision_reason: None,
            cause: ChangeCause::Webhook,
            at: Timestamp::new(0),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = SubscriptionFilter::default();
        assert!(filter.matches(&change("alice", Role::Buyer)));
        assert!(filter.matches(&change("bob", Role::Seller)));
    }

    #[test]
    fn filters_by_user_and_role() {
        let filter = SubscriptionFilter {
            users: Some(vec![UserId::new("alice").unwrap()]),
            roles: Some(vec![Role::Seller]),
        };
        assert!(filter.matches(&change("alice", Role::Seller)));
        assert!(!filter.matches(&change("alice", Role::Buyer)));
        assert!(!filter.matches(&change("bob", Role::Seller)));
    }

    #[test]
    fn client_messages_parse() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"action":"subscribe","filter":{"users":["alice"],"roles":["buyer"]}}"#,
        )
        .unwrap();
        assert!(matches!(msg, ClientMessage::Subscribe { ref filter } if filter.roles == Some(vec![Role::Buyer])));
        let msg: ClientMessage = serde_json::from_str(r#"{"action":"subscribe"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Subscribe {
                filter: SubscriptionFilter::default()
            }
        );
        assert!(serde_json::from_str::<ClientMessage>(r#"{"action":"subscribe","filter":{"roles":["admin"]}}"#).is_err());
    }

    #[test]
    fn status_changes_are_tagged() {
        let json = serde_json::to_value(ServerMessage::StatusChange(change("alice", Role::Buyer)))
            .unwrap();
        assert_eq!(json["type"], "status_change");
        assert_eq!(json["user"], "alice");
        assert_eq!(json["status"], "approved");
        assert_eq!(json["cause"], "webhook");
    }
}
