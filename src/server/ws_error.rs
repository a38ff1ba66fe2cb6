/// Centralized helper for WebSocket error frames.
///
/// All error frames share the `error` event shape so clients parse them like
/// any other server event.
use super::messages::ServerWsMessage;

/// Formats a WebSocket error message as a JSON string.
///
/// # Arguments
/// - `code`: Unique error code (e.g. "INVALID_MESSAGE").
/// - `message`: Human-readable error message.
pub fn ws_error_message(code: &str, message: &str) -> String {
    serde_json::to_string(&ServerWsMessage::error(code, message)).unwrap_or_else(|_| {
        format!(r#"{{"event":"error","data":{{"code":"{}","message":""}}}}"#, code)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_frame_shape() {
        let value: serde_json::Value =
            serde_json::from_str(&ws_error_message("INVALID_MESSAGE", "Invalid \"client\" message")).unwrap();
        assert_eq!(value["event"], "error");
        assert_eq!(value["data"]["code"], "INVALID_MESSAGE");
        assert_eq!(value["data"]["message"], "Invalid \"client\" message");
    }
}
