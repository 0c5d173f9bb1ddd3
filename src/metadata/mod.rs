//! Version metadata
//!
//! Settings, slot schema, global variable names and root flow of the version
//! (project) a session runs. Fetched once per turn through a `VersionFetcher`.

pub mod fetcher;

use serde::{Deserialize, Serialize};

use crate::types::{Permission, RepeatType, SessionType};

pub use fetcher::{FileVersionFetcher, StaticVersionFetcher, VersionFetcher};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VersionMetadata {
    pub platform_data: PlatformData,

    /// Global variable names declared by the version
    #[serde(default)]
    pub variables: Vec<String>,

    #[serde(rename = "rootDiagramID")]
    pub root_diagram_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlatformData {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub slots: Vec<Slot>,
}

/// Version settings; every field may be omitted
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub permissions: Option<Vec<Permission>>,
    pub repeat: Option<RepeatType>,
    pub session: Option<SessionSettings>,
}

impl Settings {
    pub fn permissions_or_default(&self) -> Vec<Permission> {
        self.permissions.clone().unwrap_or_default()
    }

    pub fn repeat_or_default(&self) -> RepeatType {
        self.repeat.unwrap_or_default()
    }

    /// Session settings, falling back to a plain restart when omitted
    pub fn session_or_default(&self) -> SessionSettings {
        self.session.clone().unwrap_or_else(SessionSettings::restart)
    }
}

/// What to do with an existing stack at the start of a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSettings {
    #[serde(rename = "type", default = "continue_type")]
    pub session_type: SessionType,

    /// Resume prompt target; only meaningful for `RESUME`
    #[serde(default)]
    pub resume: Option<String>,

    /// Continue past the resume prompt without waiting for the user
    #[serde(default)]
    pub follow: Option<bool>,
}

fn continue_type() -> SessionType {
    SessionType::Continue
}

impl SessionSettings {
    pub fn restart() -> Self {
        Self {
            session_type: SessionType::Restart,
            resume: None,
            follow: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Slot {
    pub name: String,
    #[serde(rename = "type", default)]
    pub slot_type: Option<String>,
}
