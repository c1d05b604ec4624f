//! Shared services the host lends to every instance.
//!
//! Services are passed by reference into each props bundle and are read-only
//! for the instance's full lifetime; no kick may mutate them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Palette handed to kicks so they render in the host's look.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    /// Colors as hex strings, e.g. "#1e1e2e".
    pub background: String,
    pub text: String,
    pub accent: String,
    pub is_light: bool,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".into(),
            background: "#1e1e2e".into(),
            text: "#cdd6f4".into(),
            accent: "#cba6f7".into(),
            is_light: false,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".into(),
            background: "#eff1f5".into(),
            text: "#4c4f69".into(),
            accent: "#8839ef".into(),
            is_light: true,
        }
    }

    /// Named palette lookup; unknown names fall back to dark.
    pub fn named(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// Request a kick asks the host to perform on its behalf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub body: Option<String>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".into(),
            url: url.into(),
            body: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

/// Network utility lent to kicks. Implementations decide transport, policy
/// and credentials; kicks only see this surface.
pub trait KickFetch: Send + Sync {
    fn fetch(&self, request: FetchRequest) -> anyhow::Result<FetchResponse>;
}

/// Refuses every request. Hosts that expose no networking use this.
#[derive(Debug, Default)]
pub struct NoNetwork;

impl KickFetch for NoNetwork {
    fn fetch(&self, request: FetchRequest) -> anyhow::Result<FetchResponse> {
        anyhow::bail!("network access is not available in this host (requested {})", request.url)
    }
}

/// Read-only bundle shared by reference across all instances.
#[derive(Clone)]
pub struct HostServices {
    pub theme: Arc<Theme>,
    pub fetch: Arc<dyn KickFetch>,
}

impl HostServices {
    pub fn new(theme: Theme, fetch: Arc<dyn KickFetch>) -> Self {
        Self {
            theme: Arc::new(theme),
            fetch,
        }
    }
}

impl Default for HostServices {
    fn default() -> Self {
        Self::new(Theme::default(), Arc::new(NoNetwork))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_network_refuses() {
        let err = NoNetwork
            .fetch(FetchRequest::get("https://example.test"))
            .unwrap_err();
        assert!(err.to_string().contains("example.test"));
    }

    #[test]
    fn unknown_theme_falls_back_to_dark() {
        assert!(!Theme::named("solarized").is_light);
        assert!(Theme::named("light").is_light);
    }
}
