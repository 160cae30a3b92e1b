// src/services/gateway.rs
//! Resolves the base URL the client prefixes onto every endpoint.

/// Port the retrieval service listens on during local development.
pub const LOCAL_BACKEND_URL: &str = "http://localhost:8000";

/// Path the deployed site reverse-proxies to the retrieval service.
pub const PROXIED_API_PATH: &str = "/api";

/// Where the client is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Rendered in a browser tab served from `hostname`.
    Browser { hostname: String },
    /// Anything without a page origin (server-side rendering, CLI, tests).
    Server,
}

impl ExecutionContext {
    pub fn browser(hostname: impl Into<String>) -> Self {
        ExecutionContext::Browser {
            hostname: hostname.into(),
        }
    }
}

/// Pick the base URL for `ctx`.
///
/// A non-blank `env_override` always wins. Otherwise a browser on
/// `localhost` talks to the backend port directly, any other browser goes
/// through the same-origin `/api` proxy, and a server context gets an empty
/// string. Never fails; an empty result yields relative endpoint paths.
pub fn resolve_base_url(ctx: &ExecutionContext, env_override: Option<&str>) -> String {
    if let Some(url) = env_override.map(str::trim).filter(|u| !u.is_empty()) {
        return url.trim_end_matches('/').to_string();
    }

    match ctx {
        ExecutionContext::Browser { hostname } if hostname == "localhost" => {
            LOCAL_BACKEND_URL.to_string()
        }
        ExecutionContext::Browser { .. } => PROXIED_API_PATH.to_string(),
        ExecutionContext::Server => String::new(),
    }
}

/// Join a base URL and an endpoint path without doubling the slash.
pub fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
