use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct QuestClaims {
    user_name: String,
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, String> {
    // Payloads arrive with or without padding.
    let unpadded = segment.trim().trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(unpadded)
        .map_err(|e| format!("invalid base64 payload: {}", e))
}

/// Extracts the account identity from a three-segment bearer token.
pub fn decode_username(token: &str) -> Result<String, String> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(format!("expected 3 token segments, found {}", segments.len()));
    }

    let payload = decode_segment(segments[1])?;
    let claims: QuestClaims =
        serde_json::from_slice(&payload).map_err(|e| format!("invalid token payload: {}", e))?;

    let username = claims.user_name.trim();
    if username.is_empty() {
        return Err("token payload has an empty user_name".to_string());
    }
    Ok(username.to_string())
}

#[cfg(test)]
pub(crate) fn encode_test_token(payload: &serde_json::Value) -> String {
    use base64::engine::general_purpose::URL_SAFE;
    format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.signature",
        URL_SAFE.encode(payload.to_string())
    )
}
