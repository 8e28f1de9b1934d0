use anyhow::Result;

use barprep_lib::tutor::ChatMessage;

use crate::app::App;
use crate::commands::concepts::print_concept;
use crate::prompt;
use crate::render::terminal::{heading, paint, print_wrapped, Color};

/// Show the built-in rule, then the tutor's explanation
pub fn run_explain(app: &App, query: &str, use_color: bool) -> Result<()> {
    let concept = app.find_concept(query)?;
    print_concept(&concept, use_color);

    let tutor = app.tutor()?;
    println!("\n{}", paint("Asking the tutor...", Color::GRAY, use_color));
    match tutor.explain_concept(&concept) {
        Ok(text) => {
            println!("\n{}", heading("Explanation", use_color));
            print_wrapped(&text, "");
        }
        Err(e) => println!("{}", paint(&format!("Tutor unavailable: {}", e), Color::RED, use_color)),
    }

    Ok(())
}

/// Conversation with the tutor until an empty line or end of input
pub fn run_ask(app: &App, first_question: Option<String>, use_color: bool) -> Result<()> {
    let tutor = app.tutor()?;
    let mut history: Vec<ChatMessage> = Vec::new();
    let mut pending = first_question.filter(|q| !q.trim().is_empty());

    println!("{}", paint("Ask a question; an empty line ends the conversation.", Color::GRAY, use_color));

    loop {
        let question = match pending.take() {
            Some(q) => q,
            None => match prompt::read_line("\nYou: ")? {
                Some(q) if !q.is_empty() => q,
                _ => break,
            },
        };

        history.push(ChatMessage::user(question));
        match tutor.chat(&history) {
            Ok(reply) => {
                println!("\n{}", paint("Tutor:", Color::CYAN, use_color));
                print_wrapped(&reply, "  ");
                history.push(ChatMessage::assistant(reply));
            }
            Err(e) => {
                // Drop the unanswered turn so the next question starts clean
                history.pop();
                println!("{}", paint(&format!("Tutor unavailable: {}", e), Color::RED, use_color));
            }
        }
    }

    Ok(())
}
