//! Prompt templates for the tutor.
//!
//! Every generator asks for a bare JSON payload so replies can be parsed into
//! the types in `models`.

use super::models::Difficulty;
use crate::knowledge::KnowledgeNode;
use crate::subjects::Subject;

pub const TUTOR_SYSTEM_PROMPT: &str = "You are an experienced bar exam tutor preparing a student \
for the Uniform Bar Exam in Iowa. Teach the majority rule and the federal rules unless told \
otherwise, state rules precisely, point out the traps examiners like to set, and keep answers \
concise. When asked for JSON, reply with JSON only.";

/// Compact rule summary embedded in prompts that target a concept
pub fn concept_context(concept: &KnowledgeNode) -> String {
    let mut out = format!("Concept: {} ({})\nRule: {}\n", concept.name, concept.subject, concept.rule);
    if !concept.elements.is_empty() {
        out.push_str(&format!("Elements: {}\n", concept.elements.join("; ")));
    }
    if !concept.exceptions.is_empty() {
        out.push_str(&format!("Exceptions: {}\n", concept.exceptions.join("; ")));
    }
    if !concept.common_traps.is_empty() {
        out.push_str(&format!("Common traps: {}\n", concept.common_traps.join("; ")));
    }
    out
}

pub fn mbe_question_prompt(
    subject: Subject,
    concept: Option<&KnowledgeNode>,
    difficulty: Difficulty,
) -> String {
    let focus = match concept {
        Some(c) => format!("Test this concept specifically:\n{}", concept_context(c)),
        None => format!("Pick any frequently tested {} issue.", subject),
    };

    format!(
        "Write one {difficulty} MBE-style multiple-choice question on {subject}.\n\
         {focus}\n\
         Use a realistic fact pattern, four answer choices, exactly one best answer, and \
         plausible distractors.\n\
         Reply with JSON only, in this shape:\n\
         {{\"stem\": \"...\", \"choices\": [\"...\", \"...\", \"...\", \"...\"], \
         \"answer\": \"A\", \"explanation\": \"...\", \"concept\": \"...\"}}",
    )
}

pub fn evaluate_answer_prompt(question: &str, reference_answer: &str, user_answer: &str) -> String {
    format!(
        "Grade the student's answer against the reference answer.\n\n\
         Question:\n{question}\n\n\
         Reference answer:\n{reference_answer}\n\n\
         Student answer:\n{user_answer}\n\n\
         Rate recall quality from 0 (no recall) to 5 (perfect, complete rule statement). \
         Answers rated 3 or more are correct.\n\
         Reply with JSON only, in this shape:\n\
         {{\"correct\": true, \"quality\": 4, \"feedback\": \"...\", \"missingPoints\": [\"...\"]}}",
    )
}

pub fn explain_concept_prompt(concept: &KnowledgeNode) -> String {
    format!(
        "Explain this rule to a bar student in under 250 words. Give one short hypothetical \
         that applies it and one that shows the most common trap.\n\n{}",
        concept_context(concept)
    )
}

pub fn generate_flashcards_prompt(subject: Subject, count: usize, notes: Option<&str>) -> String {
    let source = match notes {
        Some(text) if !text.trim().is_empty() => {
            format!("Base the cards on these notes:\n\"\"\"\n{}\n\"\"\"\n", text.trim())
        }
        _ => format!("Cover the highest-yield {} rules.\n", subject),
    };

    format!(
        "Create {count} flashcards for {subject}.\n\
         {source}\
         Each front is a short question or cue; each back is the precise rule statement.\n\
         Reply with JSON only: an array of objects in this shape:\n\
         [{{\"front\": \"...\", \"back\": \"...\"}}]",
    )
}

pub fn essay_prompt(subject: Subject) -> String {
    format!(
        "Write an MEE-style essay question on {subject}: a fact pattern of 250-400 words \
         followed by a call of the question with two to four parts.\n\
         Reply with JSON only, in this shape:\n\
         {{\"factPattern\": \"...\", \"callOfQuestion\": \"...\", \"issues\": [\"...\"]}}",
    )
}

pub fn grade_essay_prompt(subject: Subject, fact_pattern: &str, call: &str, essay: &str) -> String {
    format!(
        "Grade this {subject} essay on the 1-6 MEE scale (4 is passing). Reward correct \
         issue spotting, accurate rule statements and application of the facts.\n\n\
         Facts:\n{fact_pattern}\n\n\
         Question:\n{call}\n\n\
         Student essay:\n{essay}\n\n\
         Reply with JSON only, in this shape:\n\
         {{\"score\": 4, \"strengths\": [\"...\"], \"weaknesses\": [\"...\"], \
         \"issuesMissed\": [\"...\"], \"summary\": \"...\"}}",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::builtin::get_builtin_concepts;

    #[test]
    fn test_concept_context_includes_rule_parts() {
        let concept = get_builtin_concepts()
            .into_iter()
            .find(|c| c.id == "evidence-hearsay")
            .unwrap();
        let context = concept_context(&concept);
        assert!(context.contains("Hearsay (Evidence)"));
        assert!(context.contains("Elements: Statement; Made out of court"));
        assert!(context.contains("Common traps:"));
    }

    #[test]
    fn test_mbe_prompt_mentions_subject_and_schema() {
        let prompt = mbe_question_prompt(Subject::Torts, None, Difficulty::Hard);
        assert!(prompt.contains("hard MBE-style"));
        assert!(prompt.contains("Torts"));
        assert!(prompt.contains("\"answer\": \"A\""));
    }

    #[test]
    fn test_flashcard_prompt_uses_notes() {
        let prompt = generate_flashcards_prompt(Subject::Contracts, 5, Some("  Offer and acceptance  "));
        assert!(prompt.contains("Create 5 flashcards for Contracts"));
        assert!(prompt.contains("Offer and acceptance"));

        let prompt = generate_flashcards_prompt(Subject::Contracts, 5, Some("   "));
        assert!(prompt.contains("highest-yield Contracts rules"));
    }
}
