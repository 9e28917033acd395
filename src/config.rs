//! Demo configuration.
//!
//! A demo is a list of tabs, each driving one observer variant on its own
//! event name. The default reproduces the four-tab sample app.

use crate::error::{Error, Result};
use crate::observers::Variant;
use crate::types::EventName;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One tab of the demo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabConfig {
    /// Label shown for the tab; also used as the notification sender.
    pub title: String,

    /// Event posted and observed by this tab.
    pub event_name: EventName,

    /// Observer strategy created by this tab.
    pub variant: Variant,
}

impl TabConfig {
    pub fn new(title: impl Into<String>, event_name: impl Into<EventName>, variant: Variant) -> Self {
        Self {
            title: title.into(),
            event_name: event_name.into(),
            variant,
        }
    }

    /// Tab `index` (1-based) of the sample app.
    pub fn numbered(index: usize, variant: Variant) -> Self {
        Self::new(
            format!("Variant {index}"),
            format!("Tab_{index}_Notification"),
            variant,
        )
    }

    pub fn headline(&self) -> &'static str {
        self.variant.title()
    }

    pub fn message(&self) -> &'static str {
        self.variant.summary()
    }
}

/// Configuration for a [`Demo`](crate::harness::Demo).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoConfig {
    pub tabs: Vec<TabConfig>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            tabs: Variant::ALL
                .into_iter()
                .enumerate()
                .map(|(i, variant)| TabConfig::numbered(i + 1, variant))
                .collect(),
        }
    }
}

impl DemoConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DemoConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Tabs must exist, have non-empty event names, and not share them.
    pub fn validate(&self) -> Result<()> {
        if self.tabs.is_empty() {
            return Err(Error::InvalidConfig("no tabs configured".to_string()));
        }

        let mut seen = HashSet::new();
        for tab in &self.tabs {
            if tab.event_name.as_str().is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "tab {:?} has an empty event name",
                    tab.title
                )));
            }
            if !seen.insert(&tab.event_name) {
                return Err(Error::InvalidConfig(format!(
                    "event name {} is used by more than one tab",
                    tab.event_name
                )));
            }
        }
        Ok(())
    }
}
