mod common;

use std::cell::Cell;
use std::io::Cursor;
use std::time::Duration;

use common::{CountingDelay, StubChat, StubIndex};
use textback_core::config::SessionSettings;
use textback_core::Error;
use textback_reply::{ChatSession, FixedDelay, ReplyGenerator, SessionStats, TurnState};

struct Transcript {
    out: String,
    err: String,
}

fn run_session(index: &StubIndex, chat: &StubChat, input: &str, settings: SessionSettings, delays: &Cell<usize>) -> (Result<SessionStats, Error>, Transcript) {
    let generator = ReplyGenerator::new(index, chat);
    let delay = Box::new(CountingDelay { delay: Duration::ZERO, calls: delays });
    let mut session = ChatSession::new(generator, delay, settings);
    let mut out = Vec::new();
    let mut err = Vec::new();
    let result = session.run(Cursor::new(input.to_string()), &mut out, &mut err);
    assert_eq!(session.state(), TurnState::AwaitingInput);
    (result, Transcript { out: String::from_utf8(out).unwrap(), err: String::from_utf8(err).unwrap() })
}

#[test]
fn double_text_prints_two_labelled_lines_with_one_pause() {
    let index = StubIndex::with(&["hey"]);
    let chat = StubChat::always("relaxin', text me l8r");
    let delays = Cell::new(0);

    let (result, t) = run_session(&index, &chat, "wyd\n", SessionSettings::default(), &delays);

    let stats = result.expect("session");
    assert_eq!(stats, SessionStats { turns: 1, failed: 0, double_texts: 1 });
    assert_eq!(delays.get(), 1);
    assert!(t.err.is_empty());
    assert_eq!(
        t.out,
        "Enter a message: Bot is replying...\n\nYou: relaxin\nYou: text me l8r\n\nEnter a message: \n"
    );
}

#[test]
fn single_reply_never_pauses() {
    let index = StubIndex::with(&["hey"]);
    let chat = StubChat::always("just chilling rn, maybe ill text u later tonight if im not busy");
    let delays = Cell::new(0);

    let (result, t) = run_session(&index, &chat, "wyd\nand now?\n", SessionSettings::default(), &delays);

    assert_eq!(result.unwrap().turns, 2);
    assert_eq!(delays.get(), 0);
    assert_eq!(t.out.matches("You: just chilling rn, maybe ill text u later tonight if im not busy\n").count(), 2);
}

#[test]
fn blank_lines_do_not_reach_the_services() {
    let index = StubIndex::with(&["hey"]);
    let chat = StubChat::always("hey");
    let delays = Cell::new(0);

    let (result, _) = run_session(&index, &chat, "\n   \n", SessionSettings::default(), &delays);

    assert_eq!(result.unwrap().turns, 0);
    assert!(chat.calls.borrow().is_empty());
    assert_eq!(index.last_k.get(), None);
}

#[test]
fn failed_turn_is_reported_and_loop_continues() {
    let index = StubIndex::with(&["hey"]);
    let chat = StubChat::scripted(vec![Err(Error::Generation("server error (500): boom".into()))], "hey there");
    let delays = Cell::new(0);

    let (result, t) = run_session(&index, &chat, "one\ntwo\n", SessionSettings::default(), &delays);

    assert_eq!(result.unwrap(), SessionStats { turns: 1, failed: 1, double_texts: 0 });
    assert_eq!(t.err, "Reply failed: Generation error: server error (500): boom\n");
    assert!(!t.out.contains("Reply failed"));
    assert!(t.out.contains("You: hey there"));
}

#[test]
fn fail_fast_stops_on_first_error() {
    let index = StubIndex::with(&["hey"]);
    let chat = StubChat::scripted(vec![Err(Error::Generation("nope".into()))], "never shown");
    let delays = Cell::new(0);
    let settings = SessionSettings { fail_fast: true, ..SessionSettings::default() };

    let (result, t) = run_session(&index, &chat, "one\ntwo\n", settings, &delays);

    assert!(matches!(result, Err(Error::Generation(_))));
    assert!(!t.out.contains("never shown"));
    assert!(t.err.is_empty());
    assert_eq!(chat.calls.borrow().len(), 1);
}

#[test]
fn label_and_prompt_come_from_settings() {
    let index = StubIndex::with(&[]);
    let chat = StubChat::always("heyy, whats up");
    let settings = SessionSettings { label: "Her".into(), prompt: "> ".into(), ..SessionSettings::default() };
    let generator = ReplyGenerator::new(&index, &chat);
    let mut session = ChatSession::new(generator, Box::new(FixedDelay(Duration::ZERO)), settings);
    let mut out = Vec::new();

    session.run(Cursor::new("hi\n"), &mut out, std::io::sink()).unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.starts_with("> Bot is replying..."));
    assert!(out.contains("Her: heyy\nHer: whats up\n"));
}

#[test]
fn trailing_comma_sends_an_empty_second_message() {
    let index = StubIndex::with(&["hey"]);
    let chat = StubChat::always("hey,");
    let delays = Cell::new(0);

    let (result, t) = run_session(&index, &chat, "yo\n", SessionSettings::default(), &delays);

    assert_eq!(result.unwrap().double_texts, 1);
    assert_eq!(delays.get(), 1);
    assert!(t.out.contains("You: hey\nYou: \n"));
}

#[test]
fn blank_completion_prints_an_empty_reply() {
    let index = StubIndex::with(&["hey"]);
    let chat = StubChat::always("  \n");
    let delays = Cell::new(0);

    let (result, t) = run_session(&index, &chat, "yo\n", SessionSettings::default(), &delays);

    assert_eq!(result.unwrap(), SessionStats { turns: 1, failed: 0, double_texts: 0 });
    assert!(t.err.is_empty());
    assert!(t.out.contains("Bot is replying...\n\nYou: \n"));
}
