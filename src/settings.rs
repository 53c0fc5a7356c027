//! Delivery preferences and the config keys that drive them.

use crate::enums::DeliveryPreference;
use crate::error::ConfigError;
use crate::evaluate::MatchOptions;
use crate::types::Notice;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

pub const NOTIFICATION_PREFERENCE_KEY: &str = "notification_preference";
pub const TTS_PREFERENCE_KEY: &str = "tts_preference";
pub const SHOW_PLATFORM_KEY: &str = "show_platform";

/// Operator preferences, kept in sync with config key/value updates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub notification: DeliveryPreference,
    pub tts: DeliveryPreference,
    /// Show each user's platform in the roster.
    pub show_platform: bool,
    pub matching: MatchOptions,
}

/// A speech request for one notice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    /// Flush queued speech instead of waiting behind it.
    pub interrupt: bool,
}

impl Preferences {
    /// Builds preferences from the config store's key/value map. Keys the
    /// preferences do not use are ignored.
    pub fn from_config_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut prefs = Preferences::default();
        for (key, value) in map {
            prefs.apply(key, value)?;
        }
        Ok(prefs)
    }

    /// Loads preferences from YAML.
    pub fn from_yaml(input: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(input).map_err(|e| ConfigError {
            key: "preferences".to_string(),
            message: e.to_string(),
        })
    }

    /// Applies one config update. Returns whether the key is a preference.
    ///
    /// An unparsable value is rejected and leaves the preferences unchanged.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            NOTIFICATION_PREFERENCE_KEY => self.notification = delivery_value(key, value)?,
            TTS_PREFERENCE_KEY => self.tts = delivery_value(key, value)?,
            SHOW_PLATFORM_KEY => self.show_platform = flag_value(key, value)?,
            _ => {
                debug!(%key, "ignoring config key");
                return Ok(false);
            }
        }
        debug!(%key, %value, "preference updated");
        Ok(true)
    }

    /// Config key/value pairs for the current preferences.
    pub fn to_config_pairs(&self) -> [(&'static str, &'static str); 3] {
        [
            (NOTIFICATION_PREFERENCE_KEY, self.notification.as_config_value()),
            (TTS_PREFERENCE_KEY, self.tts.as_config_value()),
            (SHOW_PLATFORM_KEY, if self.show_platform { "1" } else { "0" }),
        ]
    }

    pub fn should_notify(&self, notice: &Notice) -> bool {
        self.notification.allows(notice.local, notice.send_notification)
    }

    pub fn should_speak(&self, notice: &Notice) -> bool {
        self.tts.allows(notice.local, notice.send_tts)
    }

    /// What to say for `notice`, if anything. `Maximum` notices cut off
    /// whatever is being read out.
    pub fn speech_request(&self, notice: &Notice) -> Option<SpeechRequest> {
        self.should_speak(notice).then(|| SpeechRequest {
            text: notice.speech_text(),
            interrupt: notice.level.interrupts_speech(),
        })
    }
}

fn delivery_value(key: &str, value: &str) -> Result<DeliveryPreference, ConfigError> {
    DeliveryPreference::from_config_value(value).ok_or_else(|| {
        warn!(%key, %value, "rejected delivery preference");
        ConfigError {
            key: key.to_string(),
            message: format!("expected \"0\", \"1\" or \"2\", got {:?}", value),
        }
    })
}

fn flag_value(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => {
            warn!(%key, value = %other, "rejected flag value");
            Err(ConfigError {
                key: key.to_string(),
                message: format!("expected \"0\" or \"1\", got {:?}", other),
            })
        }
    }
}
