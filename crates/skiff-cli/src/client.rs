use serde_json::Value;

/// Join the control plane base URL and an API path.
pub fn api_url(control_url: &str, path: &str) -> String {
    format!("{}{}", control_url.trim_end_matches('/'), path)
}

/// Human-readable message from an error response body.
///
/// Falls back to the raw body when it is not the control plane's error
/// envelope.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            let err = v.get("error")?;
            let code = err.get("code")?.as_str()?;
            let message = err.get("message")?.as_str()?;
            Some(format!("{message} ({code})"))
        })
        .unwrap_or_else(|| body.to_string())
}
