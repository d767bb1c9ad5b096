//! Tests for context builder

use ops_assistant_agent::context::SYSTEM_PROMPT;
use ops_assistant_agent::ContextBuilder;
use ops_assistant_provider::ToolCall;
use serde_json::json;

#[test]
fn test_system_prompt_names_platform_tools() {
    for tool in [
        "get_job_templates",
        "launch_job_template",
        "get_job_status",
        "get_job_output",
        "get_host_inventories",
    ] {
        assert!(SYSTEM_PROMPT.contains(tool), "{tool}");
    }
    assert!(SYSTEM_PROMPT.contains("MUST use tools"));
    assert!(SYSTEM_PROMPT.contains("Never make up template/job IDs."));
}

#[test]
fn test_system_prompt_with_time() {
    let prompt = ContextBuilder::new().build_system_prompt();

    assert!(prompt.starts_with(SYSTEM_PROMPT));
    assert!(prompt.contains("## Current Time"));
}

#[test]
fn test_system_prompt_without_time() {
    let prompt = ContextBuilder::new().with_time(false).build_system_prompt();
    assert_eq!(prompt, SYSTEM_PROMPT);
}

#[test]
fn test_custom_prompt() {
    let builder = ContextBuilder::default()
        .with_prompt("You triage disk alerts.")
        .with_time(false);
    assert_eq!(builder.build_system_prompt(), "You triage disk alerts.");
}

#[test]
fn test_build_messages() {
    let builder = ContextBuilder::new().with_time(false);

    let messages = builder.build_messages("Server web01 is out of disk space");

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, "system");
    assert_eq!(messages[0].content.as_deref(), Some(SYSTEM_PROMPT));
    assert_eq!(messages[1].role, "user");
    assert_eq!(
        messages[1].content.as_deref(),
        Some("Server web01 is out of disk space")
    );
}

#[test]
fn test_add_assistant_message_and_tool_result() {
    let mut messages = ContextBuilder::new().build_messages("Launch template 7");
    let calls = vec![ToolCall {
        id: "call_9".to_string(),
        name: "launch_job_template".to_string(),
        arguments: json!({"template_id": 7}),
    }];

    ContextBuilder::add_assistant_message(&mut messages, Some("Launching."), &calls);
    ContextBuilder::add_tool_result(&mut messages, "call_9", "launch_job_template", "job 101 started");

    assert_eq!(messages.len(), 4);

    let assistant = &messages[2];
    assert_eq!(assistant.role, "assistant");
    assert_eq!(assistant.content.as_deref(), Some("Launching."));
    let defs = assistant.tool_calls.as_ref().unwrap();
    assert_eq!(defs[0].function.arguments["template_id"], 7);

    let tool = &messages[3];
    assert_eq!(tool.role, "tool");
    assert_eq!(tool.tool_call_id.as_deref(), Some("call_9"));
    assert_eq!(tool.name.as_deref(), Some("launch_job_template"));
    assert_eq!(tool.content.as_deref(), Some("job 101 started"));
}
