// src/config.rs
use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::services::client::DEFAULT_TOP_K;
use crate::services::gateway::{ExecutionContext, LOCAL_BACKEND_URL, resolve_base_url};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_STATIC_DIR: &str = "public";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: Option<String>,
    pub hostname: Option<String>,
    pub top_k: u32,
    pub bind_addr: String,
    pub upstream_url: String,
    pub static_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: None,
            hostname: None,
            top_k: DEFAULT_TOP_K,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            upstream_url: LOCAL_BACKEND_URL.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl Settings {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let top_k = match non_blank("TEXTBOOK_TOP_K") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    warn!(value = %raw, "invalid TEXTBOOK_TOP_K, using default");
                    defaults.top_k
                }
            },
            None => defaults.top_k,
        };

        Self {
            api_url: non_blank("TEXTBOOK_API_URL"),
            hostname: non_blank("TEXTBOOK_HOSTNAME"),
            top_k,
            bind_addr: non_blank("TEXTBOOK_BIND_ADDR").unwrap_or(defaults.bind_addr),
            upstream_url: non_blank("TEXTBOOK_UPSTREAM_URL").unwrap_or(defaults.upstream_url),
            static_dir: non_blank("TEXTBOOK_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
        }
    }

    pub fn execution_context(&self) -> ExecutionContext {
        match &self.hostname {
            Some(host) => ExecutionContext::browser(host.clone()),
            None => ExecutionContext::Server,
        }
    }

    pub fn base_url(&self) -> String {
        resolve_base_url(&self.execution_context(), self.api_url.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let s = settings(&[]);
        assert_eq!(s, Settings::default());
        assert_eq!(s.base_url(), "");
    }

    #[test]
    fn hostname_drives_browser_heuristic() {
        assert_eq!(
            settings(&[("TEXTBOOK_HOSTNAME", "localhost")]).base_url(),
            "http://localhost:8000"
        );
        assert_eq!(
            settings(&[("TEXTBOOK_HOSTNAME", "docs.example.org")]).base_url(),
            "/api"
        );
    }

    #[test]
    fn api_url_overrides_hostname() {
        let s = settings(&[
            ("TEXTBOOK_HOSTNAME", "localhost"),
            ("TEXTBOOK_API_URL", "https://rag.example.org"),
        ]);
        assert_eq!(s.base_url(), "https://rag.example.org");
    }

    #[test]
    fn bad_top_k_falls_back() {
        assert_eq!(settings(&[("TEXTBOOK_TOP_K", "zero")]).top_k, 3);
        assert_eq!(settings(&[("TEXTBOOK_TOP_K", "0")]).top_k, 3);
        assert_eq!(settings(&[("TEXTBOOK_TOP_K", " 7 ")]).top_k, 7);
    }

    #[test]
    fn bad_top_k_is_logged_once_a_subscriber_exists() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_ansi(false)
            .finish();

        let s = tracing::subscriber::with_default(subscriber, || {
            settings(&[("TEXTBOOK_TOP_K", "zero")])
        });

        assert_eq!(s.top_k, 3);
        let logged = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("invalid TEXTBOOK_TOP_K"));
        assert!(logged.contains("zero"));
    }
}
