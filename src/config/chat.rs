use serde::Deserialize;

/// Connection settings for the generative-text service behind the
/// mental-health chat.
#[derive(Deserialize, Debug, Clone)]
pub struct ChatSettings {
    pub base_url: String,
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
}

fn default_timeout_secs() -> u64 {
    25
}

fn default_max_retries() -> usize {
    2
}

fn default_retry_interval_ms() -> u64 {
    1000
}

impl ChatSettings {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url,
            model,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_interval_ms: default_retry_interval_ms(),
        }
    }
}
