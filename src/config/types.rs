use std::time::Duration;

use serde::Deserialize;

use crate::args::{ScenarioKind, parse_duration_arg};

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub page_path: Option<String>,
    pub action_path: Option<String>,
    pub page_url: Option<String>,
    pub action_url: Option<String>,
    pub requests: Option<usize>,
    pub delay: Option<DurationValue>,
    pub timeout: Option<DurationValue>,
    pub reset_wait: Option<DurationValue>,
    pub code: Option<String>,
    pub rate_limit: Option<u64>,
    pub window: Option<DurationValue>,
    pub scenario: Option<ScenarioKind>,
    pub strict: Option<bool>,
    pub no_color: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, String> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err("Duration must be > 0.".to_owned())
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration_arg(text).map_err(|err| err.to_string()),
        }
    }
}
