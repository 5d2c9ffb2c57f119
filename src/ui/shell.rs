//! Line-oriented chat loop.
//!
//! The shell keeps no conversation state of its own: after every command it
//! re-reads [`ConversationController::conversation`] and prints whatever is
//! new.

use std::error::Error;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::core::app::ConversationController;
use crate::core::message::{Message, Role};
use crate::core::model_adapter::ReplyGenerator;

const HELP_TEXT: &str = "Commands:\n  /clear    Forget the conversation and start over\n  /history  Show the whole conversation again\n  /help     Show this help\n  /quit     Exit (Ctrl+D works too)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Send(String),
    Clear,
    History,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

pub fn parse_line(line: &str) -> ShellCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ShellCommand::Empty;
    }

    match trimmed {
        "/clear" => ShellCommand::Clear,
        "/history" => ShellCommand::History,
        "/help" => ShellCommand::Help,
        "/quit" | "/exit" => ShellCommand::Quit,
        _ if trimmed.starts_with('/') && !trimmed.starts_with("//") => {
            let name = trimmed.split_whitespace().next().unwrap_or(trimmed);
            ShellCommand::Unknown(name.to_string())
        }
        _ => {
            // "//" escapes a message that really starts with a slash
            let text = match trimmed.strip_prefix("//") {
                Some(rest) => format!("/{rest}"),
                None => trimmed.to_string(),
            };
            ShellCommand::Send(text)
        }
    }
}

pub fn render_message(message: &Message) -> String {
    let label = match message.role() {
        Role::User => "You",
        Role::Assistant => "Agent",
    };
    format!("{label}: {}", message.content())
}

fn render_from<W: Write>(
    messages: &[Message],
    start: usize,
    skip_user: bool,
    output: &mut W,
) -> std::io::Result<()> {
    for message in messages.iter().skip(start) {
        if skip_user && message.is_user() {
            continue;
        }
        writeln!(output, "{}", render_message(message))?;
        writeln!(output)?;
    }
    Ok(())
}

/// Runs the chat loop until `/quit` or end of input. The session must
/// already be started.
pub async fn run_shell<G, R, W>(
    controller: &mut ConversationController<G>,
    input: R,
    output: &mut W,
) -> Result<(), Box<dyn Error>>
where
    G: ReplyGenerator,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    render_from(controller.conversation().messages(), 0, false, output)?;

    let before = controller.conversation().len();
    if controller.maybe_autoreply().await? {
        render_from(controller.conversation().messages(), before, false, output)?;
    }

    let mut lines = input.lines();
    loop {
        write!(output, "> ")?;
        output.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(output)?;
            break;
        };

        match parse_line(&line) {
            ShellCommand::Empty => {}
            ShellCommand::Send(text) => {
                let before = controller.conversation().len();
                controller.submit_user_message(&text).await?;
                render_from(controller.conversation().messages(), before, true, output)?;
            }
            ShellCommand::Clear => {
                controller.clear();
                writeln!(output, "Conversation cleared.")?;
                controller.start_session();
                render_from(controller.conversation().messages(), 0, false, output)?;
            }
            ShellCommand::History => {
                render_from(controller.conversation().messages(), 0, false, output)?;
            }
            ShellCommand::Help => writeln!(output, "{HELP_TEXT}")?,
            ShellCommand::Quit => break,
            ShellCommand::Unknown(name) => {
                writeln!(output, "Unknown command {name}. Type /help for a list.")?;
            }
        }
    }

    Ok(())
}
