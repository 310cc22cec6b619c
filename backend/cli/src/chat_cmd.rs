//! Interactive terminal chat client.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use llamachat_chat::{ChatSession, HttpTransport};
use markdown::{Mount, RevealDelays, Revealer, Tag};

use crate::console::Console;
use crate::terminal::TerminalView;

pub async fn run(api_url: &str, delays: RevealDelays) -> Result<()> {
    let console = Console::detect();
    let view = Arc::new(TerminalView::new(console.ansi()));
    let transcript = Mount::new(Tag::Transcript).with_scroll_container(view.clone());
    let session = ChatSession::new(
        Arc::new(HttpTransport::new(api_url)),
        transcript,
        Revealer::new(delays),
    );

    console.note(&format!(
        "Chatting via `{api_url}`. `/clear` resets the conversation, `/quit` or Ctrl-C exits."
    ));

    let repl = Repl {
        console,
        session: &session,
        view: &view,
    };
    let input = BufReader::new(tokio::io::stdin());
    repl.run(input, interrupts()).await
}

/// Forwards every Ctrl-C for the rest of the process.
fn interrupts() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

struct Repl<'a> {
    console: Console,
    session: &'a ChatSession,
    view: &'a TerminalView,
}

impl Repl<'_> {
    /// Reads lines until EOF, `/quit`, or an interrupt that has no reveal to
    /// cut short.
    async fn run(
        &self,
        input: impl AsyncBufRead + Unpin,
        mut interrupts: mpsc::UnboundedReceiver<()>,
    ) -> Result<()> {
        let mut lines = input.lines();
        loop {
            self.console.prompt()?;
            let line = tokio::select! {
                line = lines.next_line() => line?,
                Some(()) = interrupts.recv() => {
                    println!();
                    break;
                }
            };
            let Some(line) = line else {
                break;
            };
            match line.trim() {
                "" => continue,
                "/quit" | "/exit" => break,
                "/clear" => {
                    self.session.clear().await;
                    self.view.mark();
                    self.console.note("Conversation cleared");
                }
                text => {
                    let keep_going = self.send(text, &mut interrupts).await;
                    self.view.mark();
                    println!();
                    if !keep_going {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Sends one message. An interrupt cuts the reply's reveal short; one
    /// that arrives while nothing is being revealed abandons the message
    /// and returns `false`.
    async fn send(&self, text: &str, interrupts: &mut mpsc::UnboundedReceiver<()>) -> bool {
        let sending = self.session.send(text);
        tokio::pin!(sending);

        let result = loop {
            tokio::select! {
                result = &mut sending => break result,
                Some(()) = interrupts.recv() => match self.session.active_reveal() {
                    Some(reveal) => reveal.cancel(),
                    None => return false,
                },
            }
        };

        match result {
            Ok(Some(state)) => debug!(%state, "Message finished"),
            Ok(None) => {}
            Err(e) => self.console.error(&e.to_string()),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use llamachat_chat::{ChatTransport, MessageState};
    use llamachat_core::ChatError;
    use tokio::io::AsyncWriteExt;

    const REPLY: &str = "a reply long enough that revealing it takes a good while";

    struct SlowTransport {
        latency: Duration,
    }

    #[async_trait]
    impl ChatTransport for SlowTransport {
        async fn send(&self, _message: &str) -> Result<String, ChatError> {
            tokio::time::sleep(self.latency).await;
            Ok(REPLY.to_string())
        }

        async fn clear(&self) -> Result<(), ChatError> {
            Ok(())
        }
    }

    fn session(latency: Duration) -> ChatSession {
        ChatSession::new(
            Arc::new(SlowTransport { latency }),
            Mount::new(Tag::Transcript),
            Revealer::new(RevealDelays::from_millis(10, 10, 10)),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_at_prompt_exits() {
        let session = session(Duration::ZERO);
        let view = TerminalView::new(false);
        let repl = Repl {
            console: Console::plain(),
            session: &session,
            view: &view,
        };
        // Keep the writer alive so the input never reaches EOF.
        let (_writer, reader) = tokio::io::duplex(64);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(()).unwrap();

        repl.run(BufReader::new(reader), rx).await.unwrap();
        assert!(session.state().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_cuts_reveal_short_and_keeps_reading() {
        let session = session(Duration::ZERO);
        let view = TerminalView::new(false);
        let repl = Repl {
            console: Console::plain(),
            session: &session,
            view: &view,
        };
        let (mut writer, reader) = tokio::io::duplex(64);
        let (tx, rx) = mpsc::unbounded_channel();

        let drive = async {
            writer.write_all(b"hello\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(55)).await;
            assert_eq!(session.state(), Some(MessageState::Streaming));
            tx.send(()).unwrap();
            while session.state() != Some(MessageState::Settled) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            writer.write_all(b"/quit\n").await.unwrap();
        };
        let (result, ()) = tokio::join!(repl.run(BufReader::new(reader), rx), drive);
        result.unwrap();

        let shown = session.transcript().snapshot().unwrap().text_content();
        let reply = shown.strip_prefix("hello").unwrap();
        assert!(!reply.is_empty());
        assert!(reply.len() < REPLY.len());
        assert!(REPLY.starts_with(reply));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_while_pending_exits() {
        let session = session(Duration::from_secs(30));
        let view = TerminalView::new(false);
        let repl = Repl {
            console: Console::plain(),
            session: &session,
            view: &view,
        };
        let (mut writer, reader) = tokio::io::duplex(64);
        let (tx, rx) = mpsc::unbounded_channel();

        let drive = async {
            writer.write_all(b"hello\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_eq!(session.state(), Some(MessageState::Pending));
            tx.send(()).unwrap();
        };
        let (result, ()) = tokio::join!(repl.run(BufReader::new(reader), rx), drive);
        result.unwrap();
        assert_eq!(session.state(), Some(MessageState::Pending));
    }
}
