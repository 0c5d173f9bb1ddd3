//! Tests for turn initialization
//!
//! Organized by step: storage refresh, variables, stream, then branches

use super::*;
use crate::error::InitError;
use crate::metadata::{StaticVersionFetcher, VersionMetadata};
use crate::runtime::{
    var, Context, ExecutionStack, Frame, FrameKey, FrameKind, SessionState, StorageKey,
    TraceEvent, Val, RESUME_DIAGRAM_ID,
};
use crate::types::TurnRequest;
use maplit::hashmap;
use serde_json::json;

/* ===================== Test Helpers ===================== */

/// Helper: build version metadata with the given settings and declarations
fn version_with(settings: serde_json::Value) -> VersionMetadata {
    serde_json::from_value(json!({
        "platformData": {
            "settings": settings,
            "slots": [{ "name": "city" }, { "name": "size" }]
        },
        "variables": ["score", "name"],
        "rootDiagramID": "root"
    }))
    .expect("valid version metadata")
}

fn restart_version() -> VersionMetadata {
    version_with(json!({}))
}

fn resume_version(target: &str) -> VersionMetadata {
    version_with(json!({ "session": { "type": "RESUME", "resume": target, "follow": true } }))
}

fn continue_version() -> VersionMetadata {
    version_with(json!({ "session": { "type": "CONTINUE" } }))
}

fn request() -> TurnRequest {
    TurnRequest {
        locale: "en-US".to_string(),
        user_id: "user-1".to_string(),
        supported_interfaces: Some(json!({ "AudioPlayer": {} })),
        system: Some(json!({ "user": { "userId": "user-1" } })),
        session: None,
    }
}

fn context_with_stack(ids: &[&str]) -> Context {
    Context::from_state(SessionState {
        stack: ExecutionStack::from_frames(ids.iter().map(|id| Frame::new(*id)).collect()),
        ..Default::default()
    })
}

fn stack_ids(context: &Context) -> Vec<String> {
    context
        .stack
        .frames()
        .iter()
        .map(|f| f.diagram_id().to_string())
        .collect()
}

fn apply(version: &VersionMetadata, context: &mut Context) -> SessionBranch {
    SessionInitializer::default()
        .apply(version, context, &request())
        .expect("initialization failed")
}

/* ===================== Storage ===================== */

#[test]
fn test_first_session_counter_starts_at_one() {
    let mut context = Context::default();

    apply(&restart_version(), &mut context);

    assert_eq!(
        context.storage.get(StorageKey::Sessions),
        Some(&Val::Num(1.0))
    );
}

#[test]
fn test_session_counter_increments() {
    for n in [1.0, 2.0, 41.0] {
        let mut context = context_with_stack(&["root"]);
        context.storage.set(StorageKey::Sessions, n);

        apply(&continue_version(), &mut context);

        assert_eq!(
            context.storage.get(StorageKey::Sessions),
            Some(&Val::Num(n + 1.0))
        );
    }
}

#[test]
fn test_invalid_session_counter_counts_as_absent() {
    let mut context = Context::default();
    context.storage.set(StorageKey::Sessions, "garbage");

    apply(&restart_version(), &mut context);

    assert_eq!(
        context.storage.get(StorageKey::Sessions),
        Some(&Val::Num(1.0))
    );
}

#[test]
fn test_request_attributes_overwrite_storage() {
    let mut context = Context::default();
    context.storage.set(StorageKey::Locale, "de-DE");
    context.storage.set(StorageKey::User, "someone-else");

    apply(&restart_version(), &mut context);

    assert_eq!(
        context.storage.get(StorageKey::Locale),
        Some(&Val::Str("en-US".into()))
    );
    assert_eq!(
        context.storage.get(StorageKey::User),
        Some(&Val::Str("user-1".into()))
    );
    assert_eq!(
        context.storage.get(StorageKey::SupportedInterfaces),
        Some(&Val::Obj(hashmap! { "AudioPlayer".to_string() => Val::Obj(Default::default()) }))
    );
}

#[test]
fn test_missing_settings_apply_defaults() {
    let mut context = Context::default();

    apply(&restart_version(), &mut context);

    assert_eq!(
        context.storage.get(StorageKey::Permissions),
        Some(&Val::List(vec![]))
    );
    assert_eq!(
        context.storage.get(StorageKey::Repeat),
        Some(&Val::Str("ALL".into()))
    );
}

#[test]
fn test_settings_overwrite_permissions_and_repeat() {
    let mut context = Context::default();
    let version = version_with(json!({
        "permissions": ["alexa::profile:name:read"],
        "repeat": "OFF"
    }));

    apply(&version, &mut context);

    assert_eq!(
        context.storage.get(StorageKey::Permissions),
        Some(&Val::List(vec![Val::from("alexa::profile:name:read")]))
    );
    assert_eq!(
        context.storage.get(StorageKey::Repeat),
        Some(&Val::Str("OFF".into()))
    );
}

#[test]
fn test_stale_stream_temp_is_cleared() {
    let mut context = Context::default();
    context.storage.set(StorageKey::StreamTemp, "leftover");

    apply(&restart_version(), &mut context);

    assert_eq!(context.storage.get(StorageKey::StreamTemp), None);
}

/* ===================== Variables ===================== */

#[test]
fn test_system_variables_always_overwrite() {
    let mut context = context_with_stack(&["root"]);
    context.storage.set(StorageKey::Sessions, 4.0);
    context.variables.set(var::LOCALE, "fr-FR");
    context.variables.set(var::TIMESTAMP, 1_700_000_000.0);
    context.variables.set(var::PLATFORM, "google");

    apply(&continue_version(), &mut context);

    let vars = &context.variables;
    assert_eq!(vars.get(var::LOCALE), Some(&Val::Str("en-US".into())));
    assert_eq!(vars.get(var::USER_ID), Some(&Val::Str("user-1".into())));
    assert_eq!(vars.get(var::SESSIONS), Some(&Val::Num(5.0)));
    assert_eq!(vars.get(var::TIMESTAMP), Some(&Val::Num(0.0)));
    assert_eq!(vars.get(var::PLATFORM), Some(&Val::Str("alexa".into())));
    assert_eq!(
        vars.get(var::RAW_SYSTEM).and_then(|s| s.field("user")),
        Some(&Val::Obj(hashmap! { "userId".to_string() => Val::from("user-1") }))
    );
}

#[test]
fn test_system_bag_contents() {
    let mut context = Context::default();
    let version = version_with(json!({ "permissions": ["alexa::profile:email:read"] }));

    apply(&version, &mut context);

    let bag = context.variables.get(var::SYSTEM_BAG).unwrap();
    assert_eq!(
        bag.field(var::bag::PERMISSIONS),
        Some(&Val::List(vec![Val::from("alexa::profile:email:read")]))
    );
    assert!(bag.field(var::bag::CAPABILITIES).unwrap().field("AudioPlayer").is_some());
    assert_eq!(bag.field(var::bag::EVENTS), Some(&Val::List(vec![])));
    assert_eq!(bag.field(var::bag::RESUME), None);
}

#[test]
fn test_configured_platform_tag() {
    let mut context = Context::default();

    SessionInitializer::new("google")
        .apply(&restart_version(), &mut context, &request())
        .unwrap();

    assert_eq!(
        context.variables.get(var::PLATFORM),
        Some(&Val::Str("google".into()))
    );
}

#[test]
fn test_globals_and_slots_are_seeded_without_clobbering() {
    let mut context = context_with_stack(&["root"]);
    context.variables.set("score", 99.0);
    context.variables.set("city", "Oslo");

    apply(&continue_version(), &mut context);

    let vars = &context.variables;
    assert_eq!(vars.get("score"), Some(&Val::Num(99.0)));
    assert_eq!(vars.get("name"), Some(&Val::Num(0.0)));
    assert_eq!(vars.get("city"), Some(&Val::Str("Oslo".into())));
    assert_eq!(vars.get("size"), Some(&Val::Num(0.0)));
}

/* ===================== Stream ===================== */

#[test]
fn test_active_stream_is_ended_keeping_metadata() {
    let mut context = Context::default();
    context.storage.set(
        StorageKey::StreamPlay,
        Val::Obj(hashmap! {
            "action".to_string() => Val::from("START"),
            "url".to_string() => Val::from("https://cdn.example.com/track.mp3"),
            "offset".to_string() => Val::Num(3200.0),
        }),
    );

    apply(&restart_version(), &mut context);

    assert_eq!(
        context.storage.get(StorageKey::StreamPlay),
        Some(&Val::Obj(hashmap! {
            "action".to_string() => Val::from("END"),
            "url".to_string() => Val::from("https://cdn.example.com/track.mp3"),
            "offset".to_string() => Val::Num(3200.0),
        }))
    );
}

#[test]
fn test_no_stream_no_mutation() {
    let mut context = Context::default();

    apply(&restart_version(), &mut context);

    assert_eq!(context.storage.get(StorageKey::StreamPlay), None);
}

/* ===================== Restart ===================== */

#[test]
fn test_empty_stack_without_session_settings_restarts() {
    let mut context = Context::default();

    let branch = apply(&restart_version(), &mut context);

    assert_eq!(branch, SessionBranch::Restart);
    assert_eq!(stack_ids(&context), vec!["root"]);
    assert!(context.turn.new_stack);
}

#[test]
fn test_empty_stack_restarts_even_when_resume_configured() {
    let mut context = Context::default();

    let branch = apply(&resume_version("resume-prompt"), &mut context);

    assert_eq!(branch, SessionBranch::Restart);
    assert_eq!(stack_ids(&context), vec!["root"]);
}

#[test]
fn test_restart_setting_flushes_existing_stack() {
    let mut context = context_with_stack(&["root", "order", "payment"]);

    let branch = apply(&restart_version(), &mut context);

    assert_eq!(branch, SessionBranch::Restart);
    assert_eq!(stack_ids(&context), vec!["root"]);
    assert!(context.trace.is_empty());
}

#[test]
fn test_resume_flag_false_forces_restart() {
    let mut context = context_with_stack(&["root", "order"]);
    context.variables.set(
        var::SYSTEM_BAG,
        Val::Obj(hashmap! { var::bag::RESUME.to_string() => Val::Bool(false) }),
    );

    let branch = apply(&resume_version("resume-prompt"), &mut context);

    assert_eq!(branch, SessionBranch::Restart);
    assert_eq!(stack_ids(&context), vec!["root"]);
    // The flag outlives the refresh of the system bag
    assert_eq!(
        context
            .variables
            .get(var::SYSTEM_BAG)
            .and_then(|bag| bag.field(var::bag::RESUME)),
        Some(&Val::Bool(false))
    );
}

#[test]
fn test_resume_flag_true_does_not_restart() {
    let mut context = context_with_stack(&["root"]);
    context.variables.set(
        var::SYSTEM_BAG,
        Val::Obj(hashmap! { var::bag::RESUME.to_string() => Val::Bool(true) }),
    );

    let branch = apply(&continue_version(), &mut context);

    assert_eq!(branch, SessionBranch::Continue);
}

/* ===================== Resume ===================== */

#[test]
fn test_resume_pushes_frame_on_unchanged_stack() {
    let mut context = context_with_stack(&["root", "order"]);

    let branch = apply(&resume_version("X"), &mut context);

    assert_eq!(
        branch,
        SessionBranch::Resume {
            target: "X".to_string(),
            follow: Some(true),
        }
    );
    assert_eq!(stack_ids(&context), vec!["root", "order", RESUME_DIAGRAM_ID]);
    assert_eq!(
        context.stack.get(1).unwrap().get(FrameKey::CalledCommand),
        Some(&Val::Bool(true))
    );
    assert_eq!(
        context.stack.top().unwrap().kind,
        FrameKind::Resume {
            target: "X".to_string(),
            follow: Some(true),
        }
    );
    assert!(!context.turn.new_stack);
}

#[test]
fn test_resume_replaces_existing_resume_frame_and_everything_above() {
    let mut context = context_with_stack(&["root", "order"]);
    context.stack.push(Frame::resume("old", None));
    context.stack.push(Frame::new("help"));
    context.stack.push(Frame::new("faq"));
    let resume_index = 2;

    apply(&resume_version("new"), &mut context);

    assert_eq!(context.stack.len(), resume_index + 1);
    assert_eq!(stack_ids(&context), vec!["root", "order", RESUME_DIAGRAM_ID]);
    assert_eq!(context.stack.find_index(|f| f.diagram_id() == "help"), None);
    assert_eq!(context.stack.find_index(|f| f.diagram_id() == "faq"), None);
    assert_eq!(
        context.stack.top().unwrap().kind,
        FrameKind::Resume {
            target: "new".to_string(),
            follow: Some(true),
        }
    );
}

#[test]
fn test_resume_without_target_continues() {
    let mut context = context_with_stack(&["root"]);
    let version = version_with(json!({ "session": { "type": "RESUME" } }));

    let branch = apply(&version, &mut context);

    assert_eq!(branch, SessionBranch::Continue);
    assert_eq!(stack_ids(&context), vec!["root"]);
}

#[test]
fn test_resume_with_empty_target_continues() {
    let mut context = context_with_stack(&["root"]);
    let version = version_with(json!({ "session": { "type": "RESUME", "resume": "" } }));

    let branch = apply(&version, &mut context);

    assert_eq!(branch, SessionBranch::Continue);
    assert_eq!(stack_ids(&context), vec!["root"]);
    assert_eq!(context.stack.find_index(Frame::is_resume), None);
}

#[test]
fn test_request_session_directive_wins_over_settings() {
    let mut context = context_with_stack(&["root"]);
    let mut request = request();
    request.session = Some(serde_json::from_value(json!({ "type": "RESUME", "resume": "R" })).unwrap());

    let branch = SessionInitializer::default()
        .apply(&restart_version(), &mut context, &request)
        .unwrap();

    assert_eq!(
        branch,
        SessionBranch::Resume {
            target: "R".to_string(),
            follow: None,
        }
    );
}

/* ===================== Continue ===================== */

#[test]
fn test_continue_repeats_last_speak() {
    let mut context = context_with_stack(&["root", "order"]);
    {
        let top = context.stack.top_mut().unwrap();
        top.set(FrameKey::Speak, "Hello");
        top.set(FrameKey::CalledCommand, true);
    }
    let before: Vec<String> = stack_ids(&context);

    let branch = apply(&continue_version(), &mut context);

    assert_eq!(branch, SessionBranch::Continue);
    assert_eq!(stack_ids(&context), before);
    let top = context.stack.top().unwrap();
    assert_eq!(top.get(FrameKey::CalledCommand), None);
    assert_eq!(top.get(FrameKey::Speak), Some(&Val::Str("Hello".into())));
    assert_eq!(
        context.storage.get(StorageKey::Output),
        Some(&Val::Str("Hello".into()))
    );
    assert_eq!(
        context.trace.events(),
        &[TraceEvent::Speak {
            message: "Hello".to_string()
        }]
    );
    assert!(!context.turn.new_stack);
}

#[test]
fn test_continue_keeps_non_text_speak_value() {
    let mut context = context_with_stack(&["root"]);
    let speak = Val::Obj(hashmap! { "ssml".to_string() => Val::from("<speak>Hi</speak>") });
    context
        .stack
        .top_mut()
        .unwrap()
        .set(FrameKey::Speak, speak.clone());

    apply(&continue_version(), &mut context);

    assert_eq!(context.storage.get(StorageKey::Output), Some(&speak));
    assert_eq!(
        context.trace.events(),
        &[TraceEvent::Speak {
            message: r#"{"ssml":"<speak>Hi</speak>"}"#.to_string()
        }]
    );
}

#[test]
fn test_continue_without_speak_uses_empty_text() {
    let mut context = context_with_stack(&["root"]);

    apply(&continue_version(), &mut context);

    assert_eq!(
        context.storage.get(StorageKey::Output),
        Some(&Val::Str(String::new()))
    );
    assert_eq!(
        context.trace.events(),
        &[TraceEvent::Speak {
            message: String::new()
        }]
    );
}

/* ===================== Fetch ===================== */

#[tokio::test]
async fn test_initialize_with_fetcher() {
    let fetcher = StaticVersionFetcher::new(restart_version());
    let mut context = Context::default();

    let branch = SessionInitializer::default()
        .initialize(&fetcher, &mut context, &request())
        .await
        .unwrap();

    assert_eq!(branch, SessionBranch::Restart);
    assert_eq!(stack_ids(&context), vec!["root"]);
}

#[tokio::test]
async fn test_fetch_failure_leaves_context_untouched() {
    let fetcher = StaticVersionFetcher::unavailable();
    let mut context = context_with_stack(&["root", "order"]);
    context.storage.set(StorageKey::Sessions, 2.0);
    context.storage.set(StorageKey::StreamTemp, "tmp");
    let before = context.to_state();

    let err = SessionInitializer::default()
        .initialize(&fetcher, &mut context, &request())
        .await
        .unwrap_err();

    assert!(matches!(err, InitError::Fetch(_)));
    assert_eq!(context.to_state(), before);
    assert!(!context.turn.new_stack);
    assert!(context.trace.is_empty());
}

/* ===================== Branch Decision ===================== */

#[test]
fn test_decide_branch_precedence() {
    let stack = ExecutionStack::from_frames(vec![Frame::new("root")]);
    let variables = Default::default();
    let resume = resume_version("X").platform_data.settings.session_or_default();

    assert!(matches!(
        decide_branch(&stack, &variables, &resume),
        SessionBranch::Resume { .. }
    ));
    assert_eq!(
        decide_branch(&ExecutionStack::new(), &variables, &resume),
        SessionBranch::Restart
    );
}
