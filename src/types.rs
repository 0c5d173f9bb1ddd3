use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::metadata::SessionSettings;

/// How a new turn relates to the stack left by the previous one
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionType {
    /// Discard the stack and start again from the root flow
    #[default]
    Restart,
    /// Ask the user whether to pick up where they left off
    Resume,
    /// Silently continue from the top of the stack
    Continue,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RepeatType {
    Off,
    Dialog,
    #[default]
    All,
}

impl RepeatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatType::Off => "OFF",
            RepeatType::Dialog => "DIALOG",
            RepeatType::All => "ALL",
        }
    }
}

/// Platform permissions a version may request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Permission {
    #[serde(rename = "alexa::profile:name:read")]
    UserName,
    #[serde(rename = "alexa::profile:given_name:read")]
    UserGivenName,
    #[serde(rename = "alexa::profile:email:read")]
    UserEmail,
    #[serde(rename = "alexa::profile:mobile_number:read")]
    UserPhone,
    #[serde(rename = "read::alexa:device:all:address")]
    DeviceAddress,
    #[serde(rename = "alexa::devices:all:geolocation:read")]
    Geolocation,
    #[serde(rename = "alexa::alerts:reminders:skill:readwrite")]
    Reminders,
    #[serde(rename = "alexa::household:lists:read")]
    ListsRead,
    /// Any permission string this crate does not know by name
    #[serde(untagged)]
    Other(String),
}

impl Permission {
    pub fn as_str(&self) -> &str {
        match self {
            Permission::UserName => "alexa::profile:name:read",
            Permission::UserGivenName => "alexa::profile:given_name:read",
            Permission::UserEmail => "alexa::profile:email:read",
            Permission::UserPhone => "alexa::profile:mobile_number:read",
            Permission::DeviceAddress => "read::alexa:device:all:address",
            Permission::Geolocation => "alexa::devices:all:geolocation:read",
            Permission::Reminders => "alexa::alerts:reminders:skill:readwrite",
            Permission::ListsRead => "alexa::household:lists:read",
            Permission::Other(raw) => raw,
        }
    }
}

/// Value of the `action` field of a stream descriptor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum StreamAction {
    Start,
    Pause,
    Resume,
    Nothing,
    End,
}

impl StreamAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamAction::Start => "START",
            StreamAction::Pause => "PAUSE",
            StreamAction::Resume => "RESUME",
            StreamAction::Nothing => "NOTHING",
            StreamAction::End => "END",
        }
    }
}

/* ===================== Inbound Request ===================== */

/// The parts of an inbound request the session initializer reads
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TurnRequest {
    pub locale: String,
    pub user_id: String,

    /// Device capability descriptor; absent for devices that report none
    #[serde(default)]
    pub supported_interfaces: Option<JsonValue>,

    /// Raw platform system descriptor, exposed to code blocks as `_system`
    #[serde(default)]
    pub system: Option<JsonValue>,

    /// Session directive supplied by the platform; wins over version settings
    #[serde(default)]
    pub session: Option<SessionSettings>,
}

impl TurnRequest {
    pub fn new(locale: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// Project a platform request envelope onto a `TurnRequest`
    ///
    /// Reads `request.locale`, `context.System.user.userId` and
    /// `context.System.device.supportedInterfaces`.
    pub fn from_envelope(envelope: &JsonValue) -> Result<Self, serde_json::Error> {
        let parsed: Envelope = serde_json::from_value(envelope.clone())?;
        let system = envelope.pointer("/context/System").cloned();

        Ok(Self {
            locale: parsed.request.locale,
            user_id: parsed.context.system.user.user_id,
            supported_interfaces: parsed
                .context
                .system
                .device
                .and_then(|d| d.supported_interfaces),
            system,
            session: None,
        })
    }
}

#[derive(Deserialize)]
struct Envelope {
    request: EnvelopeRequest,
    context: EnvelopeContext,
}

#[derive(Deserialize)]
struct EnvelopeRequest {
    locale: String,
}

#[derive(Deserialize)]
struct EnvelopeContext {
    #[serde(rename = "System")]
    system: EnvelopeSystem,
}

#[derive(Deserialize)]
struct EnvelopeSystem {
    user: EnvelopeUser,
    device: Option<EnvelopeDevice>,
}

#[derive(Deserialize)]
struct EnvelopeUser {
    #[serde(rename = "userId")]
    user_id: String,
}

#[derive(Deserialize)]
struct EnvelopeDevice {
    #[serde(rename = "supportedInterfaces")]
    supported_interfaces: Option<JsonValue>,
}
