//! The interactive loop: read a line, generate, present, repeat.
use std::io::{BufRead, Write};

use textback_core::config::SessionSettings;
use textback_core::traits::DelayProvider;
use textback_core::Result;

use crate::generator::ReplyGenerator;
use crate::postprocess::{finalize, Outgoing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingInput,
    Generating,
    Presenting,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub turns: usize,
    pub failed: usize,
    pub double_texts: usize,
}

pub struct ChatSession<'a> {
    generator: ReplyGenerator<'a>,
    delay: Box<dyn DelayProvider + 'a>,
    settings: SessionSettings,
    state: TurnState,
}

impl<'a> ChatSession<'a> {
    pub fn new(generator: ReplyGenerator<'a>, delay: Box<dyn DelayProvider + 'a>, settings: SessionSettings) -> Self {
        Self { generator, delay, settings, state: TurnState::AwaitingInput }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    fn transition(&mut self, next: TurnState) {
        if self.state != next {
            tracing::trace!(from = ?self.state, to = ?next, "turn state");
        }
        self.state = next;
    }

    /// Runs until `input` hits EOF. A failed turn is reported as one line on
    /// `err` and the loop continues, unless `fail_fast` is set.
    pub fn run<R: BufRead, W: Write, E: Write>(&mut self, mut input: R, mut out: W, mut err: E) -> Result<SessionStats> {
        let mut stats = SessionStats::default();
        loop {
            self.transition(TurnState::AwaitingInput);
            write!(out, "{}", self.settings.prompt)?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }
            let user_input = line.trim();
            // Blank lines never reach the index or the chat service.
            if user_input.is_empty() {
                continue;
            }

            self.transition(TurnState::Generating);
            let reply = match self.generator.generate(user_input) {
                Ok(reply) => reply,
                Err(e) if self.settings.fail_fast => return Err(e),
                Err(e) => {
                    stats.failed += 1;
                    tracing::error!(error = %e, "turn failed");
                    writeln!(err, "Reply failed: {}", e)?;
                    err.flush()?;
                    writeln!(out)?;
                    continue;
                }
            };

            self.transition(TurnState::Presenting);
            writeln!(out, "Bot is replying...")?;
            writeln!(out)?;
            let outgoing = finalize(&reply);
            if outgoing.is_double() {
                stats.double_texts += 1;
            }
            self.present(outgoing, &mut out)?;
            writeln!(out)?;
            stats.turns += 1;
        }
        self.transition(TurnState::AwaitingInput);
        Ok(stats)
    }

    fn present<W: Write>(&mut self, outgoing: Outgoing, out: &mut W) -> Result<()> {
        for (i, part) in outgoing.into_parts().iter().enumerate() {
            if i > 0 {
                out.flush()?;
                let pause = self.delay.next_delay();
                tracing::debug!(?pause, "double-text pause");
                std::thread::sleep(pause);
            }
            writeln!(out, "{}: {}", self.settings.label, part)?;
        }
        Ok(())
    }
}
