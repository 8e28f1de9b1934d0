//! Concept progress persistence
//!
//! Concept text is built in; only the review state is stored, in the
//! `concept_progress` table keyed by concept id.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::builtin::get_builtin_concepts;
use super::models::{ConceptProgress, KnowledgeNode};
use crate::flashcards::algorithm::{review, Quality};
use crate::storage::{format_date, format_timestamp, parse_date, parse_timestamp, Database, Result, StorageError};
use crate::subjects::Subject;

pub struct ConceptStorage<'a> {
    conn: &'a Connection,
}

impl<'a> ConceptStorage<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { conn: db.conn() }
    }

    /// All concepts with their stored progress, optionally for one subject
    pub fn list_concepts(&self, subject: Option<Subject>) -> Result<Vec<KnowledgeNode>> {
        let mut progress = self.load_all_progress()?;

        let concepts = get_builtin_concepts()
            .into_iter()
            .filter(|c| subject.map_or(true, |s| c.subject == s))
            .map(|mut c| {
                if let Some(p) = progress.remove(&c.id) {
                    c.progress = p;
                }
                c
            })
            .collect();

        Ok(concepts)
    }

    /// Get a concept by exact id
    pub fn get_concept(&self, concept_id: &str) -> Result<KnowledgeNode> {
        let mut concept = get_builtin_concepts()
            .into_iter()
            .find(|c| c.id == concept_id)
            .ok_or_else(|| StorageError::ConceptNotFound(concept_id.to_string()))?;

        if let Some(progress) = self.load_progress(concept_id)? {
            concept.progress = progress;
        }
        Ok(concept)
    }

    /// Concepts whose id or name matches `query` (exact id wins)
    pub fn search_concepts(&self, query: &str) -> Result<Vec<KnowledgeNode>> {
        let needle = query.trim().to_lowercase();
        let concepts = self.list_concepts(None)?;

        if let Some(exact) = concepts.iter().find(|c| c.id == needle) {
            return Ok(vec![exact.clone()]);
        }

        Ok(concepts
            .into_iter()
            .filter(|c| c.id.contains(&needle) || c.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Concepts due on `today`: never-reviewed first, then by due date, then
    /// weakest mastery
    pub fn due_concepts(&self, today: NaiveDate, subject: Option<Subject>) -> Result<Vec<KnowledgeNode>> {
        let mut due: Vec<KnowledgeNode> = self
            .list_concepts(subject)?
            .into_iter()
            .filter(|c| c.is_due(today))
            .collect();

        due.sort_by(|a, b| {
            a.progress
                .next_review
                .cmp(&b.progress.next_review)
                .then(a.progress.mastery_level.total_cmp(&b.progress.mastery_level))
        });
        Ok(due)
    }

    /// Record a review of a concept and persist its progress
    pub fn review_concept(&self, concept_id: &str, quality: Quality, today: NaiveDate) -> Result<KnowledgeNode> {
        let mut concept = self.get_concept(concept_id)?;
        let result = review(&concept.progress.sm2(), quality, today);
        concept.progress.apply(&result, quality.value(), Utc::now());
        self.save_progress(&concept.id, &concept.progress)?;

        log::debug!(
            "Reviewed concept {} (q={}): mastery {:.2}, next {}",
            concept.id,
            quality.value(),
            concept.progress.mastery_level,
            result.next_review
        );
        Ok(concept)
    }

    pub fn load_progress(&self, concept_id: &str) -> Result<Option<ConceptProgress>> {
        let progress = self
            .conn
            .query_row(
                "SELECT concept_id, mastery_level, ease_factor, interval, repetitions, review_count, \
                 next_review, last_reviewed FROM concept_progress WHERE concept_id = ?1",
                params![concept_id],
                progress_from_row,
            )
            .optional()?;
        Ok(progress.map(|(_, p)| p))
    }

    pub fn save_progress(&self, concept_id: &str, progress: &ConceptProgress) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO concept_progress (concept_id, mastery_level, ease_factor, \
             interval, repetitions, review_count, next_review, last_reviewed) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                concept_id,
                progress.mastery_level,
                progress.ease_factor,
                progress.interval,
                progress.repetitions,
                progress.review_count,
                progress.next_review.map(format_date),
                progress.last_reviewed.map(format_timestamp),
            ],
        )?;
        Ok(())
    }

    fn load_all_progress(&self) -> Result<HashMap<String, ConceptProgress>> {
        let mut stmt = self.conn.prepare(
            "SELECT concept_id, mastery_level, ease_factor, interval, repetitions, review_count, \
             next_review, last_reviewed FROM concept_progress",
        )?;
        let rows = stmt.query_map([], progress_from_row)?;
        Ok(rows.collect::<rusqlite::Result<HashMap<_, _>>>()?)
    }
}

fn progress_from_row(row: &Row) -> rusqlite::Result<(String, ConceptProgress)> {
    let next_review: Option<String> = row.get(6)?;
    let last_reviewed: Option<String> = row.get(7)?;

    Ok((
        row.get(0)?,
        ConceptProgress {
            mastery_level: row.get(1)?,
            ease_factor: row.get(2)?,
            interval: row.get(3)?,
            repetitions: row.get(4)?,
            review_count: row.get(5)?,
            next_review: next_review.as_deref().map(|d| parse_date(6, d)).transpose()?,
            last_reviewed: last_reviewed
                .as_deref()
                .map(|ts| parse_timestamp(7, ts))
                .transpose()?,
        },
    ))
}
