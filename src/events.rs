//! Player events pushed by the node through `event` frames.

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum NodeEvent {
    #[serde(rename_all = "camelCase")]
    TrackStartEvent { guild_id: String, track: String },

    #[serde(rename_all = "camelCase")]
    TrackEndEvent {
        guild_id: String,
        track: Option<String>,
        reason: String,
    },

    #[serde(rename_all = "camelCase")]
    TrackExceptionEvent {
        guild_id: String,
        track: Option<String>,
        #[serde(alias = "error")]
        exception: TrackException,
    },

    #[serde(rename_all = "camelCase")]
    TrackStuckEvent {
        guild_id: String,
        track: Option<String>,
        threshold_ms: u64,
    },

    #[serde(rename_all = "camelCase")]
    WebSocketClosedEvent {
        guild_id: String,
        code: u16,
        reason: String,
        by_remote: bool,
    },

    #[serde(other)]
    Unknown,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum TrackException {
    Detailed {
        message: Option<String>,
        severity: Option<String>,
        cause: Option<String>,
    },
    /// Older nodes only send a string.
    Message(String),
}

impl NodeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            NodeEvent::TrackStartEvent { .. } => "track_start",
            NodeEvent::TrackEndEvent { .. } => "track_end",
            NodeEvent::TrackExceptionEvent { .. } => "track_exception",
            NodeEvent::TrackStuckEvent { .. } => "track_stuck",
            NodeEvent::WebSocketClosedEvent { .. } => "websocket_closed",
            NodeEvent::Unknown => "unknown",
        }
    }

    pub fn guild_id(&self) -> Option<&str> {
        match self {
            NodeEvent::TrackStartEvent { guild_id, .. }
            | NodeEvent::TrackEndEvent { guild_id, .. }
            | NodeEvent::TrackExceptionEvent { guild_id, .. }
            | NodeEvent::TrackStuckEvent { guild_id, .. }
            | NodeEvent::WebSocketClosedEvent { guild_id, .. } => Some(guild_id),
            NodeEvent::Unknown => None,
        }
    }

    /// Whether the event means the current track is no longer playing.
    pub fn ends_track(&self) -> bool {
        match self {
            NodeEvent::TrackEndEvent { reason, .. } => reason != "REPLACED",
            NodeEvent::TrackExceptionEvent { .. } | NodeEvent::TrackStuckEvent { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_track_end() {
        let event: NodeEvent = serde_json::from_value(json!({
            "op": "event",
            "type": "TrackEndEvent",
            "guildId": "81384788765712384",
            "track": "QAAAjQIAJVJpY2sgQXN0bGV5",
            "reason": "FINISHED"
        }))
        .unwrap();

        assert_eq!(event.name(), "track_end");
        assert_eq!(event.guild_id(), Some("81384788765712384"));
        assert!(event.ends_track());
    }

    #[test]
    fn replaced_track_does_not_end_playback() {
        let event: NodeEvent = serde_json::from_value(json!({
            "type": "TrackEndEvent",
            "guildId": "1",
            "track": "abc",
            "reason": "REPLACED"
        }))
        .unwrap();

        assert!(!event.ends_track());
    }

    #[test]
    fn decodes_exception_in_both_shapes() {
        let detailed: NodeEvent = serde_json::from_value(json!({
            "type": "TrackExceptionEvent",
            "guildId": "1",
            "track": "abc",
            "exception": { "message": "boom", "severity": "COMMON", "cause": "io" }
        }))
        .unwrap();
        assert!(matches!(
            detailed,
            NodeEvent::TrackExceptionEvent {
                exception: TrackException::Detailed { .. },
                ..
            }
        ));

        let legacy: NodeEvent = serde_json::from_value(json!({
            "type": "TrackExceptionEvent",
            "guildId": "1",
            "track": "abc",
            "error": "boom"
        }))
        .unwrap();
        assert_eq!(
            legacy,
            NodeEvent::TrackExceptionEvent {
                guild_id: "1".into(),
                track: Some("abc".into()),
                exception: TrackException::Message("boom".into()),
            }
        );
    }

    #[test]
    fn unknown_event_types_are_tolerated() {
        let event: NodeEvent = serde_json::from_value(json!({
            "type": "SegmentSkipped",
            "guildId": "1"
        }))
        .unwrap();

        assert_eq!(event, NodeEvent::Unknown);
        assert_eq!(event.guild_id(), None);
    }
}
