//! Well-known keys
//!
//! Session storage, frame storage and turn state are addressed through these
//! enums so that a typo cannot silently create a new key.

use serde::{Deserialize, Serialize};

/// Keys of the session-scoped storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageKey {
    /// Number of sessions this user has started
    Sessions,
    Locale,
    User,
    /// Device capability descriptor from the request
    SupportedInterfaces,
    /// Permissions the skill asks the platform for
    Permissions,
    Repeat,
    /// Last text rendered to the user
    Output,
    /// Active audio stream descriptor
    StreamPlay,
    /// Scratch stream state that must never survive into a new turn
    StreamTemp,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Sessions => "sessions",
            StorageKey::Locale => "locale",
            StorageKey::User => "user",
            StorageKey::SupportedInterfaces => "supportedInterfaces",
            StorageKey::Permissions => "alexaPermissions",
            StorageKey::Repeat => "repeat",
            StorageKey::Output => "output",
            StorageKey::StreamPlay => "streamPlay",
            StorageKey::StreamTemp => "streamTemp",
        }
    }
}

/// Keys of a frame's local storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameKey {
    /// Frame was entered as a command rather than by natural fallthrough
    CalledCommand,
    /// Last text spoken while this frame was on top
    Speak,
}

impl FrameKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameKey::CalledCommand => "calledCommand",
            FrameKey::Speak => "speak",
        }
    }
}

/* ===================== Variable Names ===================== */

/// Reserved variable names bound by the session initializer
pub mod var {
    pub const TIMESTAMP: &str = "timestamp";
    pub const LOCALE: &str = "locale";
    pub const USER_ID: &str = "user_id";
    pub const SESSIONS: &str = "sessions";
    pub const PLATFORM: &str = "platform";

    /// Hidden system bag, only visible to code blocks
    pub const SYSTEM_BAG: &str = "voiceflow";

    /// Raw platform system descriptor from the request
    pub const RAW_SYSTEM: &str = "_system";

    /// Fields of the hidden system bag
    pub mod bag {
        pub const PERMISSIONS: &str = "permissions";
        pub const CAPABILITIES: &str = "capabilities";
        pub const EVENTS: &str = "events";
        pub const RESUME: &str = "resume";
    }
}
