//! Configuration system (layered: code > env > defaults).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;

/// Global default config (lazy-initialized from env).
static DEFAULT_CONFIG: OnceLock<BridgeConfig> = OnceLock::new();

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";
pub const DEFAULT_ASSISTANT_MODEL: &str = "gpt-4o";
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(1000);
pub const DEFAULT_INSTRUCTIONS: &str =
    "You are an AI assistant inside a chat channel. Answer concisely. \
     Use the web_search tool when a question needs current information.";

/// Service keys used for credentials and base URLs.
pub const OPENAI: &str = "openai";
pub const TAVILY: &str = "tavily";

/// Layered configuration for the bridge.
///
/// Credentials and base URLs are shared across clones, so a config handed to
/// the search tool sees keys set later by the caller.
#[derive(Clone)]
pub struct BridgeConfig {
    api_keys: Arc<RwLock<HashMap<String, String>>>,
    base_urls: Arc<RwLock<HashMap<String, String>>>,
    assistant_model: String,
    instructions: String,
    throttle: Duration,
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let services: Vec<String> = self
            .api_keys
            .read()
            .map(|keys| keys.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("BridgeConfig")
            .field("api_keys", &services)
            .field("base_urls", &self.base_urls)
            .field("assistant_model", &self.assistant_model)
            .field("throttle", &self.throttle)
            .finish()
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeConfig {
    /// Create an empty config with defaults and no credentials.
    pub fn new() -> Self {
        Self {
            api_keys: Arc::new(RwLock::new(HashMap::new())),
            base_urls: Arc::new(RwLock::new(HashMap::new())),
            assistant_model: DEFAULT_ASSISTANT_MODEL.to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            throttle: DEFAULT_THROTTLE,
        }
    }

    /// Load from environment variables (OPENAI_API_KEY, TAVILY_API_KEY, etc.).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();

        let key_mappings = [("OPENAI_API_KEY", OPENAI), ("TAVILY_API_KEY", TAVILY)];
        for &(env_var, service) in &key_mappings {
            if let Some(key) = lookup(env_var).filter(|k| !k.trim().is_empty()) {
                config.set_api_key(service, key);
            }
        }

        let url_mappings = [("OPENAI_BASE_URL", OPENAI), ("TAVILY_BASE_URL", TAVILY)];
        for &(env_var, service) in &url_mappings {
            if let Some(url) = lookup(env_var) {
                config.set_base_url(service, url);
            }
        }

        if let Some(model) = lookup("OPENAI_ASSISTANT_MODEL") {
            config.assistant_model = model;
        }
        if let Some(instructions) = lookup("BRIDGE_ASSISTANT_INSTRUCTIONS") {
            config.instructions = instructions;
        }
        match lookup("BRIDGE_THROTTLE_MS").map(|raw| raw.parse::<u64>()) {
            Some(Ok(ms)) => config.throttle = Duration::from_millis(ms),
            Some(Err(err)) => {
                tracing::warn!(error = %err, "ignoring invalid BRIDGE_THROTTLE_MS");
            }
            None => {}
        }

        config
    }

    /// Get (or create) the global default config.
    pub fn global() -> &'static BridgeConfig {
        DEFAULT_CONFIG.get_or_init(Self::from_env)
    }

    pub fn set_api_key(&self, service: &str, key: String) {
        if let Ok(mut keys) = self.api_keys.write() {
            keys.insert(service.to_string(), key);
        }
    }

    pub fn get_api_key(&self, service: &str) -> Option<String> {
        self.api_keys.read().ok()?.get(service).cloned()
    }

    pub fn set_base_url(&self, service: &str, url: String) {
        if let Ok(mut urls) = self.base_urls.write() {
            urls.insert(service.to_string(), url.trim_end_matches('/').to_string());
        }
    }

    pub fn get_base_url(&self, service: &str) -> Option<String> {
        self.base_urls.read().ok()?.get(service).cloned()
    }

    /// Base URL for a service, falling back to the public endpoint.
    pub fn base_url_or_default(&self, service: &str) -> String {
        self.get_base_url(service).unwrap_or_else(|| {
            match service {
                TAVILY => DEFAULT_TAVILY_BASE_URL,
                _ => DEFAULT_OPENAI_BASE_URL,
            }
            .to_string()
        })
    }

    pub fn has_credentials(&self, service: &str) -> bool {
        self.get_api_key(service).is_some()
    }

    pub fn with_assistant_model(mut self, model: impl Into<String>) -> Self {
        self.assistant_model = model.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn assistant_model(&self) -> &str {
        &self.assistant_model
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Minimum interval between partial message pushes.
    pub fn throttle(&self) -> Duration {
        self.throttle
    }
}
