use reqwest::header::{self, HeaderMap, HeaderValue};

const ACCEPT: &str = "application/json, text/plain, */*";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderScope {
    /// Plain reads: auth check, user info, lists.
    Read,
    /// Token refresh, sent with an `Origin` like the web app does.
    Revalidate,
    /// Claim/complete calls carrying a JSON body.
    Mutation,
}

pub struct QuestHeaderContext<'a> {
    pub site_origin: &'a str,
    pub bearer: Option<&'a str>,
    pub scope: HeaderScope,
}

/// Builds the browser-like header set the quest web app sends.
pub fn build_quest_headers(context: QuestHeaderContext<'_>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let origin = context.site_origin.trim_end_matches('/');

    headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE),
    );
    if let Ok(value) = HeaderValue::from_str(crate::constants::USER_AGENT.as_str()) {
        headers.insert(header::USER_AGENT, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{}/home", origin)) {
        headers.insert(header::REFERER, value);
    }
    headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));

    match context.scope {
        HeaderScope::Read => {}
        HeaderScope::Revalidate => {
            if let Ok(value) = HeaderValue::from_str(origin) {
                headers.insert(header::ORIGIN, value);
            }
        }
        HeaderScope::Mutation => {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
    }

    if let Some(token) = context.bearer {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                headers.insert(header::AUTHORIZATION, value);
            }
            Err(e) => tracing::warn!("Token is not a valid header value, sending unauthenticated: {}", e),
        }
    }

    headers
}
