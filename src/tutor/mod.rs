//! LLM tutor: question generation, answer grading, explanations, flashcard
//! and essay generation over an OpenAI-compatible chat API.

pub mod client;
pub mod models;
pub mod prompts;

use serde::de::DeserializeOwned;

pub use client::{ChatClient, CompletionOptions, OpenAiClient, Result, TutorError};
pub use models::*;

use crate::knowledge::KnowledgeNode;
use crate::subjects::Subject;

/// Generation runs hotter than grading
const GRADING_TEMPERATURE: f64 = 0.2;

pub struct Tutor<C: ChatClient> {
    client: C,
    options: CompletionOptions,
}

impl<C: ChatClient> Tutor<C> {
    pub fn new(client: C, options: CompletionOptions) -> Self {
        Self { client, options }
    }

    fn ask(&self, prompt: String, options: CompletionOptions) -> Result<String> {
        let messages = [
            ChatMessage::system(prompts::TUTOR_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ];
        self.client.complete(&messages, options)
    }

    fn ask_json<T: DeserializeOwned>(&self, prompt: String, options: CompletionOptions) -> Result<T> {
        let reply = self.ask(prompt, options)?;
        parse_json_reply(&reply)
    }

    fn grading_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: GRADING_TEMPERATURE,
            ..self.options
        }
    }

    /// Generate an MBE question, optionally aimed at one concept
    pub fn generate_question(
        &self,
        subject: Subject,
        concept: Option<&KnowledgeNode>,
        difficulty: Difficulty,
    ) -> Result<GeneratedQuestion> {
        let prompt = prompts::mbe_question_prompt(subject, concept, difficulty);
        let question: GeneratedQuestion = self.ask_json(prompt, self.options)?;
        validate_question(question)
    }

    /// Grade a free-text answer against a reference answer
    pub fn evaluate_answer(
        &self,
        question: &str,
        reference_answer: &str,
        user_answer: &str,
    ) -> Result<AnswerEvaluation> {
        let prompt = prompts::evaluate_answer_prompt(question, reference_answer, user_answer);
        let mut evaluation: AnswerEvaluation = self.ask_json(prompt, self.grading_options())?;
        evaluation.quality = evaluation.quality.min(5);
        // The rating is authoritative; keep the flag consistent with it
        evaluation.correct = evaluation.quality >= 3;
        Ok(evaluation)
    }

    /// Plain-prose explanation of a concept
    pub fn explain_concept(&self, concept: &KnowledgeNode) -> Result<String> {
        self.ask(prompts::explain_concept_prompt(concept), self.options)
    }

    /// Free-form follow-up conversation. `history` holds prior user and
    /// assistant turns, ending with the new question.
    pub fn chat(&self, history: &[ChatMessage]) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(prompts::TUTOR_SYSTEM_PROMPT));
        messages.extend_from_slice(history);
        self.client.complete(&messages, self.options)
    }

    /// Propose flashcards; cards with an empty side are dropped
    pub fn generate_flashcards(
        &self,
        subject: Subject,
        count: usize,
        notes: Option<&str>,
    ) -> Result<Vec<GeneratedCard>> {
        let prompt = prompts::generate_flashcards_prompt(subject, count, notes);
        let cards: Vec<GeneratedCard> = self.ask_json(prompt, self.options)?;

        Ok(cards
            .into_iter()
            .map(|c| GeneratedCard {
                front: c.front.trim().to_string(),
                back: c.back.trim().to_string(),
            })
            .filter(|c| !c.front.is_empty() && !c.back.is_empty())
            .take(count)
            .collect())
    }

    pub fn generate_essay(&self, subject: Subject) -> Result<EssayPrompt> {
        self.ask_json(prompts::essay_prompt(subject), self.options)
    }

    pub fn grade_essay(&self, subject: Subject, prompt: &EssayPrompt, essay: &str) -> Result<EssayGrade> {
        let text = prompts::grade_essay_prompt(subject, &prompt.fact_pattern, &prompt.call_of_question, essay);
        let mut grade: EssayGrade = self.ask_json(text, self.grading_options())?;
        grade.score = grade.score.clamp(1, 6);
        Ok(grade)
    }
}

/// Parse the JSON payload out of a model reply.
///
/// Models wrap JSON in Markdown fences or add a sentence around it. Each
/// opening bracket is tried in turn against the last matching closer, so
/// bracketed prose ahead of the payload does not hide it.
pub fn parse_json_reply<T: DeserializeOwned>(reply: &str) -> Result<T> {
    let mut first_error = None;
    for payload in json_candidates(reply) {
        match serde_json::from_str(payload) {
            Ok(value) => return Ok(value),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    Err(match first_error {
        Some(e) => TutorError::Parse(format!("{} in reply: {}", e, preview(reply))),
        None => TutorError::Parse(format!("no JSON found in reply: {}", preview(reply))),
    })
}

fn json_candidates(reply: &str) -> impl Iterator<Item = &str> + '_ {
    reply.match_indices(&['{', '['][..]).filter_map(move |(start, open)| {
        let close = if open == "{" { '}' } else { ']' };
        let end = reply.rfind(close)?;
        (end > start).then(|| &reply[start..=end])
    })
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(120).collect();
    if text.chars().count() > 120 {
        out.push_str("...");
    }
    out
}

/// Normalize the answer key and reject questions that cannot be graded
fn validate_question(mut question: GeneratedQuestion) -> Result<GeneratedQuestion> {
    question.answer = question.answer.to_ascii_uppercase();
    question.choices = question
        .choices
        .into_iter()
        .map(|c| strip_choice_label(&c).to_string())
        .collect();

    if question.choices.len() < 2 {
        return Err(TutorError::Parse(format!(
            "question has {} choices",
            question.choices.len()
        )));
    }
    if question.answer_text().is_none() {
        return Err(TutorError::Parse(format!(
            "answer key '{}' does not match any of {} choices",
            question.answer,
            question.choices.len()
        )));
    }
    Ok(question)
}

/// "A) foo", "(B) bar" and "C. baz" become the bare choice text
fn strip_choice_label(choice: &str) -> &str {
    let trimmed = choice.trim();
    let re = regex_choice_label();
    match re.find(trimmed) {
        Some(m) => trimmed[m.end()..].trim_start(),
        None => trimmed,
    }
}

fn regex_choice_label() -> &'static regex::Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^\(?[A-Da-d][\).:]\s").expect("valid regex"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned replies and remembers what it was asked
    struct ScriptedClient {
        replies: RefCell<VecDeque<Result<String>>>,
        requests: RefCell<Vec<(Vec<ChatMessage>, CompletionOptions)>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<&str>) -> Self {
            Self {
                replies: RefCell::new(replies.into_iter().map(|r| Ok(r.to_string())).collect()),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                replies: RefCell::new(VecDeque::from([Err(TutorError::RateLimited)])),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChatClient for &ScriptedClient {
        fn complete(&self, messages: &[ChatMessage], options: CompletionOptions) -> Result<String> {
            self.requests.borrow_mut().push((messages.to_vec(), options));
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(TutorError::EmptyResponse))
        }
    }

    const QUESTION_REPLY: &str = r#"Here is your question:
```json
{
  "stem": "A declarant says 'the light was red' minutes after a crash. Admissible?",
  "choices": ["A) No, hearsay", "B) Yes, excited utterance", "C) Yes, not hearsay", "D) No, irrelevant"],
  "answer": "b",
  "explanation": "Startling event, statement under stress.",
  "concept": "evidence-hearsay"
}
```"#;

    #[test]
    fn test_generate_question_parses_fenced_json() {
        let client = ScriptedClient::new(vec![QUESTION_REPLY]);
        let tutor = Tutor::new(&client, CompletionOptions::default());

        let question = tutor
            .generate_question(Subject::Evidence, None, Difficulty::Medium)
            .unwrap();
        assert_eq!(question.answer, 'B');
        assert_eq!(question.choices[1], "Yes, excited utterance");
        assert_eq!(question.answer_text(), Some("Yes, excited utterance"));
        assert_eq!(question.concept.as_deref(), Some("evidence-hearsay"));

        let requests = client.requests.borrow();
        assert_eq!(requests[0].0[0].role, Role::System);
        assert!(requests[0].0[1].content.contains("Evidence"));
    }

    #[test]
    fn test_generate_question_rejects_bad_key() {
        let reply = r#"{"stem": "s", "choices": ["a", "b"], "answer": "D", "explanation": "e"}"#;
        let client = ScriptedClient::new(vec![reply]);
        let tutor = Tutor::new(&client, CompletionOptions::default());

        let err = tutor
            .generate_question(Subject::Torts, None, Difficulty::Easy)
            .unwrap_err();
        assert!(matches!(err, TutorError::Parse(_)));
    }

    #[test]
    fn test_evaluate_answer_uses_low_temperature_and_clamps() {
        let reply = r#"{"correct": false, "quality": 9, "feedback": "Complete.", "missingPoints": []}"#;
        let client = ScriptedClient::new(vec![reply]);
        let tutor = Tutor::new(&client, CompletionOptions::default());

        let evaluation = tutor.evaluate_answer("Q?", "Ref", "Mine").unwrap();
        assert_eq!(evaluation.quality, 5);
        assert!(evaluation.correct);
        assert_eq!(client.requests.borrow()[0].1.temperature, GRADING_TEMPERATURE);
    }

    #[test]
    fn test_generate_flashcards_drops_blank_cards() {
        let reply = r#"[
            {"front": " Mailbox rule? ", "back": "Acceptance effective on dispatch"},
            {"front": "", "back": "orphan"},
            {"front": "SOF?", "back": "MY LEGS"}
        ]"#;
        let client = ScriptedClient::new(vec![reply]);
        let tutor = Tutor::new(&client, CompletionOptions::default());

        let cards = tutor.generate_flashcards(Subject::Contracts, 5, None).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].front, "Mailbox rule?");
    }

    #[test]
    fn test_grade_essay_clamps_score() {
        let client = ScriptedClient::new(vec![r#"{"score": 0, "summary": "Missed everything"}"#]);
        let tutor = Tutor::new(&client, CompletionOptions::default());
        let prompt = EssayPrompt {
            fact_pattern: "Facts".to_string(),
            call_of_question: "Discuss".to_string(),
            issues: Vec::new(),
        };

        let grade = tutor.grade_essay(Subject::FamilyLaw, &prompt, "essay").unwrap();
        assert_eq!(grade.score, 1);
        assert!(!grade.is_passing());
    }

    #[test]
    fn test_chat_prepends_system_prompt() {
        let client = ScriptedClient::new(vec!["Sure."]);
        let tutor = Tutor::new(&client, CompletionOptions::default());

        let reply = tutor.chat(&[ChatMessage::user("What is RAP?")]).unwrap();
        assert_eq!(reply, "Sure.");
        let requests = client.requests.borrow();
        assert_eq!(requests[0].0.len(), 2);
        assert_eq!(requests[0].0[0].content, prompts::TUTOR_SYSTEM_PROMPT);
    }

    #[test]
    fn test_client_errors_propagate() {
        let client = ScriptedClient::failing();
        let tutor = Tutor::new(&client, CompletionOptions::default());
        assert!(matches!(
            tutor.explain_concept(&crate::knowledge::builtin::get_builtin_concepts()[0]),
            Err(TutorError::RateLimited)
        ));
    }

    #[test]
    fn test_parse_json_reply_skips_bracketed_prose() {
        let reply = r#"Here is one [MBE style]: {"stem": "Is the statement admissible?", "choices": ["No", "Yes"], "answer": "B", "explanation": "Excited utterance."} Good luck [and study hard]."#;
        let question: GeneratedQuestion = parse_json_reply(reply).unwrap();
        assert_eq!(question.choices, vec!["No".to_string(), "Yes".to_string()]);
        assert_eq!(question.answer, 'B');

        let cards: Vec<GeneratedCard> = parse_json_reply(
            r#"Cards (two of them): [{"front": "Mens rea?", "back": "Guilty mind"}] (end)"#,
        )
        .unwrap();
        assert_eq!(cards.len(), 1);
    }

    #[test]
    fn test_generate_question_rejects_non_ascii_key() {
        let reply = r#"{"stem": "s", "choices": ["a", "b"], "answer": "\u0141", "explanation": "e"}"#;
        let client = ScriptedClient::new(vec![reply]);
        let tutor = Tutor::new(&client, CompletionOptions::default());

        let err = tutor
            .generate_question(Subject::Torts, None, Difficulty::Easy)
            .unwrap_err();
        assert!(matches!(err, TutorError::Parse(_)));
    }

    #[test]
    fn test_parse_json_reply_without_json() {
        let err = parse_json_reply::<GeneratedCard>("I cannot help with that.").unwrap_err();
        assert!(matches!(err, TutorError::Parse(_)));
    }

    #[test]
    fn test_strip_choice_label() {
        assert_eq!(strip_choice_label("A) foo"), "foo");
        assert_eq!(strip_choice_label("(b) bar"), "bar");
        assert_eq!(strip_choice_label("C. baz"), "baz");
        assert_eq!(strip_choice_label("Defendant wins"), "Defendant wins");
    }
}
