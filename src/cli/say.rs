//! Shell-less "say" command

use std::error::Error;
use std::io::Write;

use crate::core::app::ConversationController;
use crate::core::model_adapter::ReplyGenerator;

/// Opens the saved session, sends `prompt` as one turn, and prints only the
/// assistant's answer (plus an autoreply when one was produced first).
pub async fn run_say<G: ReplyGenerator, W: Write>(
    controller: &mut ConversationController<G>,
    prompt: &[String],
    output: &mut W,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        return Err("Usage: gemchat say <prompt>".into());
    }

    controller.start_session();

    if controller.maybe_autoreply().await? {
        if let Some(autoreply) = controller.conversation().last() {
            writeln!(output, "{}", autoreply.content())?;
            writeln!(output)?;
        }
    }

    controller.submit_user_message(&prompt).await?;
    if let Some(reply) = controller.conversation().last() {
        writeln!(output, "{}", reply.content())?;
    }
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::ControllerOptions;
    use crate::core::memory::MemoryStore;
    use crate::core::message::Message;
    use crate::utils::test_utils::{sample_conversation, ScriptedGenerator};
    use tempfile::TempDir;

    fn controller_in(
        temp_dir: &TempDir,
        generator: ScriptedGenerator,
        autoreply: bool,
    ) -> ConversationController<ScriptedGenerator> {
        ConversationController::new(
            MemoryStore::new(temp_dir.path().join("memory.json")),
            generator,
            ControllerOptions {
                greeting: "Hello.".to_string(),
                autoreply,
            },
        )
    }

    #[tokio::test]
    async fn say_prints_reply_and_persists_turn() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let generator = ScriptedGenerator::with_replies(&["Paris."]);
        let mut controller = controller_in(&temp_dir, generator, false);
        let mut output = Vec::new();
        let prompt = vec!["capital".to_string(), "of France?".to_string()];

        run_say(&mut controller, &prompt, &mut output)
            .await
            .unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "Paris.\n");
        assert_eq!(
            controller.store().load().messages(),
            &[
                Message::greeting("Hello."),
                Message::user("capital of France?"),
                Message::assistant("Paris.")
            ]
        );
    }

    #[tokio::test]
    async fn say_rejects_blank_prompt_without_touching_the_snapshot() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let generator = ScriptedGenerator::new();
        let mut controller = controller_in(&temp_dir, generator.clone(), false);

        let result = run_say(&mut controller, &["  ".to_string()], &mut Vec::new()).await;

        assert!(result.is_err());
        assert_eq!(generator.call_count(), 0);
        assert!(!controller.store().path().exists());
    }

    #[tokio::test]
    async fn say_prints_autoreply_before_the_answer() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        MemoryStore::new(temp_dir.path().join("memory.json")).save(&sample_conversation());
        let generator = ScriptedGenerator::with_replies(&["Welcome back.", "Yes."]);
        let mut controller = controller_in(&temp_dir, generator, true);
        let mut output = Vec::new();

        run_say(&mut controller, &["ok?".to_string()], &mut output)
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Welcome back.\n\nYes.\n"
        );
    }
}
