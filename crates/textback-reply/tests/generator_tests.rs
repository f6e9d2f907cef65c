mod common;

use common::{StubChat, StubIndex};
use textback_core::config::Settings;
use textback_core::types::Role;
use textback_core::Error;
use textback_reply::prompt::SYSTEM_PROMPT;
use textback_reply::{finalize, ReplyGenerator};

#[test]
fn prompt_carries_context_and_user_turn() {
    let index = StubIndex::with(&["hey\nheyy", "wyd\nnothing much", "u up\nmaybe", "never returned"]);
    let chat = StubChat::always("  heyy, whats up \n");
    let generator = ReplyGenerator::new(&index, &chat);

    let reply = generator.generate("hi").expect("reply");

    assert_eq!(reply, "heyy, whats up");
    assert_eq!(index.last_k.get(), Some(3));
    let calls = chat.calls.borrow();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.model, "gpt-4o");
    assert!((call.temperature - 0.85).abs() < f32::EPSILON);
    assert_eq!(call.messages.len(), 2);
    assert_eq!(call.messages[0].role, Role::System);
    assert_eq!(call.messages[0].content, SYSTEM_PROMPT);
    assert_eq!(call.messages[1].role, Role::User);
    assert_eq!(call.messages[1].content, "hey\nheyy\nwyd\nnothing much\nu up\nmaybe\nUser: hi\nYou:");
}

#[test]
fn empty_index_still_prompts_with_empty_context() {
    let index = StubIndex::with(&[]);
    let chat = StubChat::always("hey");
    ReplyGenerator::new(&index, &chat).generate("yo").expect("reply");
    assert_eq!(chat.calls.borrow()[0].messages[1].content, "\nUser: yo\nYou:");
}

#[test]
fn settings_drive_model_temperature_and_k() {
    let mut settings = Settings::default();
    settings.generation.model = "gpt-4o-mini".into();
    settings.generation.temperature = 0.2;
    settings.retrieval.k = 1;
    let index = StubIndex::with(&["a", "b"]);
    let chat = StubChat::always("ok");

    ReplyGenerator::from_settings(&index, &chat, &settings).generate("x").unwrap();

    assert_eq!(index.last_k.get(), Some(1));
    let calls = chat.calls.borrow();
    assert_eq!(calls[0].model, "gpt-4o-mini");
    assert!((calls[0].temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(calls[0].messages[1].content, "a\nUser: x\nYou:");
}

#[test]
fn generation_failure_propagates() {
    let index = StubIndex::with(&["a"]);
    let chat = StubChat::scripted(vec![Err(Error::Generation("rate limited (429)".into()))], "unused");
    let err = ReplyGenerator::new(&index, &chat).generate("x").unwrap_err();
    assert!(matches!(err, Error::Generation(_)));
}

#[test]
fn index_failure_skips_generation() {
    let index = StubIndex::failing();
    let chat = StubChat::always("unused");
    let err = ReplyGenerator::new(&index, &chat).generate("x").unwrap_err();
    assert!(matches!(err, Error::Index(_)));
    assert!(chat.calls.borrow().is_empty());
}

#[test]
fn blank_completion_trims_to_an_empty_reply() {
    let index = StubIndex::with(&["a"]);
    let chat = StubChat::always("   \n");
    let reply = ReplyGenerator::new(&index, &chat).generate("x").expect("blank text is still a reply");
    assert_eq!(reply, "");
}

#[test]
fn stubbed_reply_flows_through_post_processing() {
    let index = StubIndex::with(&["hey\nwyd"]);
    let chat = StubChat::always("relaxin', text me l8r");
    let reply = ReplyGenerator::new(&index, &chat).generate("wyd").unwrap();
    assert_eq!(finalize(&reply).into_parts(), vec!["relaxin", "text me l8r"]);
}
