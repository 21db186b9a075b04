use serde::{Deserialize, Serialize};

use crate::broadcast::BroadcastJob;

/// `{orderId, userId}` pair carried by claim events in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSignal {
    pub order_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimReply {
    pub success: bool,
    pub message: String,
}

/// Frames a client sends, e.g. `{"event":"register","data":"U1"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    Register(String),
    ClaimOrder(ClaimSignal),
}

/// Frames the server pushes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// One offer, sent to a single connection.
    OrderCancelled(BroadcastJob),
    /// Sent to every connection once a claim is final.
    OrderClaimed(ClaimSignal),
    /// Answer to a `claimOrder` frame, sent to the claiming connection only.
    ClaimResult(ClaimReply),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_frames_parse() {
        let register: ClientEvent = serde_json::from_str(r#"{"event":"register","data":"U1"}"#).unwrap();
        assert_eq!(register, ClientEvent::Register("U1".into()));

        let claim: ClientEvent =
            serde_json::from_str(r#"{"event":"claimOrder","data":{"orderId":"o1","userId":"U2"}}"#).unwrap();
        assert_eq!(
            claim,
            ClientEvent::ClaimOrder(ClaimSignal { order_id: "o1".into(), user_id: "U2".into() })
        );
    }

    #[test]
    fn test_server_frames_use_event_names() {
        let frame = ServerEvent::OrderClaimed(ClaimSignal { order_id: "o1".into(), user_id: "U2".into() });
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["event"], "orderClaimed");
        assert_eq!(json["data"]["orderId"], "o1");
    }
}
