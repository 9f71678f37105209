use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::cooldown::{clamp_cooldown, DEFAULT_COOLDOWN_SECS};
use crate::engine::dedup::DEFAULT_DEDUP_CAPACITY;

pub const DEFAULT_SOURCE_CHANNEL_ID: i64 = -1002682552255;
pub const DEFAULT_TARGET_CHANNEL_ID: i64 = -1002887687164;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BotSettings {
    /// Only messages posted on behalf of this channel are read.
    pub source_channel_id: i64,

    /// Where predictions go when no redirect is configured.
    pub default_target_channel_id: i64,

    pub cooldown_secs: u64,

    // source channel → target channel
    pub redirects: BTreeMap<i64, i64>,

    /// When set, only this user may run admin commands.
    pub admin_user_id: Option<i64>,

    pub dedup_capacity: usize,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            source_channel_id: DEFAULT_SOURCE_CHANNEL_ID,
            default_target_channel_id: DEFAULT_TARGET_CHANNEL_ID,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            redirects: BTreeMap::new(),
            admin_user_id: None,
            dedup_capacity: DEFAULT_DEDUP_CAPACITY,
        }
    }
}

impl BotSettings {
    pub fn target_channel(&self, source: i64) -> i64 {
        self.redirects
            .get(&source)
            .copied()
            .unwrap_or(self.default_target_channel_id)
    }

    pub fn set_redirect(&mut self, source: i64, target: i64) {
        self.redirects.insert(source, target);
    }

    pub fn clear_redirects(&mut self) {
        self.redirects.clear();
    }

    pub fn is_admin(&self, user_id: Option<i64>) -> bool {
        match self.admin_user_id {
            None => true,
            Some(admin) => user_id == Some(admin),
        }
    }

    /// Bring out-of-range values back into their accepted range.
    pub fn normalized(mut self) -> Self {
        self.cooldown_secs = clamp_cooldown(self.cooldown_secs);
        self.dedup_capacity = self.dedup_capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_falls_back_to_default() {
        let mut settings = BotSettings::default();
        assert_eq!(settings.target_channel(-1), DEFAULT_TARGET_CHANNEL_ID);
        settings.set_redirect(-1, -2);
        assert_eq!(settings.target_channel(-1), -2);
        settings.clear_redirects();
        assert_eq!(settings.target_channel(-1), DEFAULT_TARGET_CHANNEL_ID);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let settings: BotSettings =
            serde_json::from_str(r#"{"cooldown_secs": 5, "redirects": {"-10": -20}}"#).unwrap();
        let settings = settings.normalized();
        assert_eq!(settings.cooldown_secs, 30);
        assert_eq!(settings.source_channel_id, DEFAULT_SOURCE_CHANNEL_ID);
        assert_eq!(settings.target_channel(-10), -20);
    }

    #[test]
    fn admin_check() {
        let mut settings = BotSettings::default();
        assert!(settings.is_admin(None));
        settings.admin_user_id = Some(42);
        assert!(settings.is_admin(Some(42)));
        assert!(!settings.is_admin(Some(7)));
        assert!(!settings.is_admin(None));
    }
}
