//! Endpoint resolution from user-supplied base URLs.
//!
//! Base URLs arrive in messy shapes: trailing slashes, the full completions
//! path already appended, dashboard URLs copied straight from a provider
//! console, or a `target=vendor/model` query parameter that names the model
//! to use. Resolution normalizes all of these to one POST endpoint plus the
//! effective model id.

use url::Url;

/// SiliconFlow console URLs carry the model in `target=` but point at the
/// dashboard host, not the API.
const SILICONFLOW_DASHBOARD_HOST: &str = "cloud.siliconflow.cn";
const SILICONFLOW_API_ROOT: &str = "https://api.siliconflow.cn/v1";

const COMPLETIONS_PATH: &str = "/chat/completions";

/// A resolved chat-completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub model: String,
}

/// Normalizes `base_url` into the completions endpoint, applying any
/// `target=` model override.
///
/// Unparseable URLs are passed through as-is; the HTTP client will reject
/// them with a transport error, which is more informative than guessing.
pub fn resolve_endpoint(base_url: &str, default_model: &str) -> Endpoint {
    let mut model = default_model.to_string();
    let mut base = base_url.trim().to_string();

    if base.contains('?') {
        match Url::parse(&base) {
            Ok(parsed) => {
                if let Some(target) = parsed
                    .query_pairs()
                    .find(|(k, _)| k == "target")
                    .map(|(_, v)| v.into_owned())
                {
                    model = target;
                }
                if parsed.host_str() == Some(SILICONFLOW_DASHBOARD_HOST) {
                    base = SILICONFLOW_API_ROOT.to_string();
                } else {
                    // Keep scheme, host, and path; drop the query.
                    base = format!("{}{}", parsed.origin().ascii_serialization(), parsed.path());
                }
            }
            Err(e) => {
                tracing::warn!(base_url, error = %e, "failed to parse base url");
            }
        }
    }

    let base = base.trim_end_matches('/');
    let url = if base.ends_with(COMPLETIONS_PATH) {
        base.to_string()
    } else {
        format!("{base}{COMPLETIONS_PATH}")
    };

    Endpoint { url, model }
}
