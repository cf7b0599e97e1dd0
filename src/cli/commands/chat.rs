//! Chat Command
//!
//! Line-oriented mentor chat over stdin, grounded in the whole project.
//!
//! Usage:
//!   codementor chat <PATH>
//!
//! `/exit` or `/quit` ends the session; so does end of input.

use std::path::Path;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::analysis::ChatSession;
use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::constants::chat::{EMPTY_REPLY_FALLBACK, SEND_FAILURE_FALLBACK};
use crate::types::Result;

const EXIT_COMMANDS: &[&str] = &["/exit", "/quit"];

pub async fn run(path: &Path) -> Result<()> {
    let ctx = CommandContext::load(path)?;
    let files = ctx.load_files()?;
    let provider = ctx.chat_provider()?;

    let output = Output::new();
    output.header(&format!("Mentor chat ({})", provider.model()));
    output.info(&format!(
        "{} files loaded. Type /exit to leave.",
        files.len()
    ));

    let session = ChatSession::open(&files, provider).with_timeout(ctx.timeouts().chat_request);
    let stdin = BufReader::new(tokio::io::stdin());
    repl(session, stdin, &output).await
}

/// Read lines until exit, printing one reply per non-blank line
pub(crate) async fn repl<R>(mut session: ChatSession, input: R, output: &Output) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        output.prompt("you> ");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();

        if text.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&text) {
            break;
        }

        let reply = reply_text(session.send(text).await);
        output.reply(&reply);
    }

    output.info(&format!(
        "Session {} closed after {} messages.",
        session.id(),
        session.history().len()
    ));
    Ok(())
}

/// What the user sees for a send outcome
pub(crate) fn reply_text(outcome: Result<String>) -> String {
    match outcome {
        Ok(reply) if reply.trim().is_empty() => EMPTY_REPLY_FALLBACK.to_string(),
        Ok(reply) => reply,
        Err(err) => {
            warn!("Chat send failed: {}", err);
            SEND_FAILURE_FALLBACK.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testing::MockProvider;
    use crate::types::{ErrorCategory, MentorError, ProjectFile};
    use std::sync::Arc;

    #[test]
    fn test_reply_text_fallbacks() {
        assert_eq!(reply_text(Ok("Use modules.".to_string())), "Use modules.");
        assert_eq!(reply_text(Ok(String::new())), EMPTY_REPLY_FALLBACK);
        assert_eq!(reply_text(Err(MentorError::EmptyMessage)), SEND_FAILURE_FALLBACK);
    }

    #[tokio::test]
    async fn test_repl_skips_blank_lines_and_stops_on_exit() {
        let mock = Arc::new(MockProvider::new());
        mock.push_ok("first reply");
        mock.push_err(ErrorCategory::Network, "connection reset");

        let session = ChatSession::open(&[ProjectFile::new("a.js", "var a;")], mock.clone());
        let input: &[u8] = b"hello\n\n   \nagain\n/exit\nnever sent\n";

        repl(session, input, &Output::new()).await.unwrap();

        assert_eq!(mock.converse_calls(), 2);
        let calls = mock.chat_requests();
        assert_eq!(calls[0].1[0].text, "hello");
        assert_eq!(calls[1].1.last().unwrap().text, "again");
    }

    #[tokio::test]
    async fn test_repl_ends_at_eof() {
        let mock = Arc::new(MockProvider::new());
        let session = ChatSession::open(&[ProjectFile::new("a.js", "var a;")], mock.clone());

        repl(session, &b""[..], &Output::new()).await.unwrap();
        assert_eq!(mock.converse_calls(), 0);
    }
}
