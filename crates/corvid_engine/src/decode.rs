use corvid_core::PushEvent;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("push frame is not JSON: {0}")]
    Malformed(String),
    #[error("unsupported push event type '{0}'")]
    UnknownType(String),
    #[error("push event '{kind}' is invalid: {message}")]
    Invalid { kind: String, message: String },
}

/// Decode one text frame from the push channel.
///
/// Frames are first read as loose JSON so an unknown `type` can be told apart
/// from a known event with missing or mistyped fields.
pub fn decode_push_frame(text: &str) -> Result<PushEvent, DecodeError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|err| DecodeError::Malformed(err.to_string()))?;

    let kind = value
        .get("type")
        .and_then(|kind| kind.as_str())
        .map(str::to_string)
        .ok_or_else(|| DecodeError::Malformed("missing 'type' field".into()))?;

    if !is_known_kind(&kind) {
        return Err(DecodeError::UnknownType(kind));
    }

    serde_json::from_value(value).map_err(|err| DecodeError::Invalid {
        kind,
        message: err.to_string(),
    })
}

fn is_known_kind(kind: &str) -> bool {
    matches!(
        kind,
        "status" | "info" | "progress" | "processing" | "completed" | "error" | "cancelled"
    )
}
