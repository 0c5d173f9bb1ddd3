//! Turn initialization
//!
//! Runs before the interpreter on every turn. Refreshes session storage and
//! system variables from the request and version metadata, then primes the
//! stack in one of three ways:
//!
//! - **restart**: flush and push the root flow
//! - **resume**: push a resume prompt frame above the interrupted flow
//! - **continue**: keep the stack and repeat the last spoken text
//!
//! Nothing is mutated until the version fetch has succeeded.

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, info_span, Instrument};

use crate::error::InitError;
use crate::metadata::{SessionSettings, VersionFetcher, VersionMetadata};
use crate::runtime::{
    json_to_val, var, Context, ExecutionStack, Frame, FrameKey, OutputRenderer, StorageKey, Val,
    VariableStore,
};
use crate::types::{SessionType, StreamAction, TurnRequest};

/// Platform tag merged into variables when none is configured
pub const DEFAULT_PLATFORM: &str = "alexa";

/* ===================== Branch Decision ===================== */

/// How the stack was primed for this turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionBranch {
    Restart,
    Resume { target: String, follow: Option<bool> },
    Continue,
}

impl fmt::Display for SessionBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionBranch::Restart => write!(f, "restart"),
            SessionBranch::Resume { .. } => write!(f, "resume"),
            SessionBranch::Continue => write!(f, "continue"),
        }
    }
}

/// Pick the branch for this turn; first match wins
///
/// Restart when the stack is empty, the session type is `RESTART`, or flow
/// code set the hidden `resume` flag to `false`. Resume when the session type
/// is `RESUME` and a non-empty target is configured. Continue otherwise.
pub fn decide_branch(
    stack: &ExecutionStack,
    variables: &VariableStore,
    session: &SessionSettings,
) -> SessionBranch {
    if stack.is_empty()
        || session.session_type == SessionType::Restart
        || resume_disabled(variables)
    {
        return SessionBranch::Restart;
    }

    match (&session.session_type, &session.resume) {
        (SessionType::Resume, Some(target)) if !target.is_empty() => SessionBranch::Resume {
            target: target.clone(),
            follow: session.follow,
        },
        _ => SessionBranch::Continue,
    }
}

fn resume_disabled(variables: &VariableStore) -> bool {
    variables
        .get(var::SYSTEM_BAG)
        .and_then(|bag| bag.field(var::bag::RESUME))
        .and_then(Val::as_bool)
        == Some(false)
}

/* ===================== Initializer ===================== */

#[derive(Debug, Clone)]
pub struct SessionInitializer {
    platform: String,
}

impl Default for SessionInitializer {
    fn default() -> Self {
        Self::new(DEFAULT_PLATFORM)
    }
}

impl SessionInitializer {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Fetch the version and initialize the turn
    ///
    /// A fetch failure is returned before the context is touched.
    pub async fn initialize(
        &self,
        fetcher: &dyn VersionFetcher,
        context: &mut Context,
        request: &TurnRequest,
    ) -> Result<SessionBranch, InitError> {
        let span = info_span!(
            "initialize_turn",
            turn_id = %context.turn.id,
            user_id = %request.user_id
        );

        async {
            let version = fetcher.fetch_version().await?;
            debug!(
                root_diagram_id = %version.root_diagram_id,
                slots = version.platform_data.slots.len(),
                globals = version.variables.len(),
                "fetched version"
            );

            self.apply(&version, context, request)
        }
        .instrument(span)
        .await
    }

    /// Initialize the turn from already fetched metadata
    pub fn apply(
        &self,
        version: &VersionMetadata,
        context: &mut Context,
        request: &TurnRequest,
    ) -> Result<SessionBranch, InitError> {
        let settings = &version.platform_data.settings;

        context.storage.delete(StorageKey::StreamTemp);

        let sessions = bump_session_count(context);
        debug!(sessions, "session counter");

        // Request-derived attributes can change between sessions on one stack
        context.storage.set(StorageKey::Locale, request.locale.as_str());
        context.storage.set(StorageKey::User, request.user_id.as_str());
        context.storage.set(
            StorageKey::SupportedInterfaces,
            optional_json(request.supported_interfaces.as_ref()),
        );

        let permissions: Vec<Val> = settings
            .permissions_or_default()
            .iter()
            .map(|p| Val::from(p.as_str()))
            .collect();
        context
            .storage
            .set(StorageKey::Permissions, Val::List(permissions));
        context
            .storage
            .set(StorageKey::Repeat, settings.repeat_or_default().as_str());

        let system = self.system_variables(context, request, sessions);
        context.variables.merge(system);

        context
            .variables
            .initialize(version.variables.iter().cloned(), Val::Num(0.0));
        context.variables.initialize(
            version.platform_data.slots.iter().map(|slot| slot.name.clone()),
            Val::Num(0.0),
        );

        end_active_stream(context);

        let session = request
            .session
            .clone()
            .unwrap_or_else(|| settings.session_or_default());
        let branch = decide_branch(&context.stack, &context.variables, &session);

        match &branch {
            SessionBranch::Restart => restart(context, &version.root_diagram_id),
            SessionBranch::Resume { target, follow } => resume(context, target, *follow)?,
            SessionBranch::Continue => continue_session(context)?,
        }

        info!(
            branch = %branch,
            stack_depth = context.stack.len(),
            variables = context.variables.len(),
            new_stack = context.turn.new_stack,
            "session initialized"
        );

        Ok(branch)
    }

    /// System variables that always reflect the current request
    fn system_variables(
        &self,
        context: &Context,
        request: &TurnRequest,
        sessions: f64,
    ) -> HashMap<String, Val> {
        let storage_val = |key| context.storage.get(key).cloned().unwrap_or(Val::Null);

        let mut bag = HashMap::from([
            (
                var::bag::PERMISSIONS.to_string(),
                storage_val(StorageKey::Permissions),
            ),
            (
                var::bag::CAPABILITIES.to_string(),
                storage_val(StorageKey::SupportedInterfaces),
            ),
            (var::bag::EVENTS.to_string(), Val::List(Vec::new())),
        ]);

        // The resume flag is written by flow code and must survive the refresh
        if let Some(flag) = context
            .variables
            .get(var::SYSTEM_BAG)
            .and_then(|prev| prev.field(var::bag::RESUME))
        {
            bag.insert(var::bag::RESUME.to_string(), flag.clone());
        }

        HashMap::from([
            (var::TIMESTAMP.to_string(), Val::Num(0.0)),
            (var::LOCALE.to_string(), storage_val(StorageKey::Locale)),
            (var::USER_ID.to_string(), storage_val(StorageKey::User)),
            (var::SESSIONS.to_string(), Val::Num(sessions)),
            (var::PLATFORM.to_string(), Val::from(self.platform.as_str())),
            (var::SYSTEM_BAG.to_string(), Val::Obj(bag)),
            (
                var::RAW_SYSTEM.to_string(),
                optional_json(request.system.as_ref()),
            ),
        ])
    }
}

/* ===================== Steps ===================== */

/// Start the first session at 1, otherwise increment
fn bump_session_count(context: &mut Context) -> f64 {
    let next = context
        .storage
        .update_in_place(StorageKey::Sessions, |current| {
            match current.as_ref().and_then(Val::as_num).filter(|n| *n >= 1.0) {
                Some(n) => Val::Num(n + 1.0),
                None => Val::Num(1.0),
            }
        });

    next.as_num().unwrap_or(1.0)
}

/// Flip an active stream to END, keeping the rest of its descriptor
fn end_active_stream(context: &mut Context) {
    let active = matches!(
        context.storage.get(StorageKey::StreamPlay),
        Some(Val::Obj(_))
    );
    if !active {
        return;
    }

    context
        .storage
        .update_in_place(StorageKey::StreamPlay, |current| {
            let mut stream = current.unwrap_or(Val::Null);
            if let Some(fields) = stream.as_obj_mut() {
                fields.insert("action".to_string(), Val::from(StreamAction::End.as_str()));
            }
            stream
        });
    debug!("ended active stream");
}

fn restart(context: &mut Context, root_diagram_id: &str) {
    context.stack.flush();
    context.stack.push(Frame::new(root_diagram_id));
    context.turn.new_stack = true;
}

fn resume(context: &mut Context, target: &str, follow: Option<bool>) -> Result<(), InitError> {
    // The resume prompt behaves like a command invocation from the current flow
    context.stack.top_mut()?.set(FrameKey::CalledCommand, true);

    // At most one resume frame: drop an old one and everything above it
    if let Some(index) = context.stack.find_index(Frame::is_resume) {
        let removed = context.stack.pop_to(index)?;
        debug!(index, removed = removed.len(), "removed previous resume frame");
    }

    context.stack.push(Frame::resume(target, follow));
    Ok(())
}

fn continue_session(context: &mut Context) -> Result<(), InitError> {
    let top = context.stack.top_mut()?;
    top.delete(FrameKey::CalledCommand);

    // The stored value is repeated as-is; only the rendered speech is text
    let last_speak = top
        .get(FrameKey::Speak)
        .cloned()
        .unwrap_or_else(|| Val::from(""));

    context.trace.speak(&last_speak.to_string());
    context.storage.set(StorageKey::Output, last_speak);
    Ok(())
}

fn optional_json(value: Option<&JsonValue>) -> Val {
    value.map(json_to_val).unwrap_or(Val::Null)
}
