use std::time::Duration;

use schematic::Config;
use serde::Serialize;

use crate::{
    Result,
    assignment::{AssignKeyValue, KvAssignment, missing_key},
};

#[derive(Debug, Clone, PartialEq, Serialize, Config)]
#[config(rename_all = "snake_case")]
pub struct ChatConfig {
    /// How long a tool-call annotation stays emphasized, in milliseconds.
    #[setting(default = 3000)]
    pub annotation_delay_ms: u64,

    /// Interval between tool-server status checks, in seconds. `0` disables
    /// polling.
    #[setting(default = 30)]
    pub status_poll_secs: u64,
}

impl ChatConfig {
    #[must_use]
    pub const fn annotation_delay(&self) -> Duration {
        Duration::from_millis(self.annotation_delay_ms)
    }

    #[must_use]
    pub const fn status_poll_interval(&self) -> Option<Duration> {
        match self.status_poll_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl AssignKeyValue for ChatConfig {
    fn assign(&mut self, kv: KvAssignment) -> Result<()> {
        match kv.key_string().as_str() {
            "annotation_delay_ms" => self.annotation_delay_ms = kv.try_u64()?,
            "status_poll_secs" => self.status_poll_secs = kv.try_u64()?,
            _ => return missing_key(&kv),
        }

        Ok(())
    }
}
