//! Card import from JSONL and CSV files

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CardFormat, Result, TransferError};
use crate::flashcards::{FlashcardStorage, LearningCard, NewCard};
use crate::storage::{jsonl, Database};
use crate::subjects::Subject;

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Cards added to the deck
    pub imported: usize,
    /// Cards whose id was already in the deck
    pub duplicates: usize,
    /// Lines or rows that could not be used
    pub skipped: usize,
}

/// A JSONL line: either a previously exported card (schedule kept) or just
/// the card content
#[derive(Deserialize)]
#[serde(untagged)]
enum CardLine {
    Exported(Box<LearningCard>),
    Content(NewCard),
}

/// Import cards from `path`, choosing the format by extension
pub fn import_cards(db: &Database, path: &Path, today: NaiveDate) -> Result<ImportSummary> {
    match CardFormat::from_path(path)? {
        CardFormat::Jsonl => import_jsonl(db, path, today),
        CardFormat::Csv => import_csv(db, path, today),
    }
}

pub fn import_jsonl(db: &Database, path: &Path, today: NaiveDate) -> Result<ImportSummary> {
    if !path.exists() {
        return Err(TransferError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    let read = jsonl::read_records::<CardLine>(path)?;
    let storage = FlashcardStorage::new(db);
    let mut summary = ImportSummary {
        skipped: read.skipped,
        ..Default::default()
    };

    for line in read.records {
        let card = match line {
            CardLine::Exported(mut card) => {
                card.schedule.normalize();
                *card
            }
            CardLine::Content(new_card) => {
                LearningCard::new(new_card.subject, new_card.front, new_card.back, today)
                    .with_tags(new_card.tags)
            }
        };

        if card.front.trim().is_empty() || card.back.trim().is_empty() {
            log::warn!("Skipping card {} with an empty side", card.id);
            summary.skipped += 1;
            continue;
        }

        if storage.insert_card(&card)? {
            summary.imported += 1;
        } else {
            summary.duplicates += 1;
        }
    }

    log::info!(
        "Imported {} cards from {:?} ({} duplicates, {} skipped)",
        summary.imported,
        path,
        summary.duplicates,
        summary.skipped
    );
    Ok(summary)
}

/// Column positions found in the CSV header
struct CsvColumns {
    front: usize,
    back: usize,
    subject: usize,
    tags: Option<usize>,
}

impl CsvColumns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        Ok(Self {
            front: find("front").ok_or(TransferError::MissingColumn("front"))?,
            back: find("back").ok_or(TransferError::MissingColumn("back"))?,
            subject: find("subject").ok_or(TransferError::MissingColumn("subject"))?,
            tags: find("tags"),
        })
    }
}

pub fn import_csv(db: &Database, path: &Path, today: NaiveDate) -> Result<ImportSummary> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let columns = CsvColumns::from_headers(reader.headers()?)?;
    let storage = FlashcardStorage::new(db);
    let mut summary = ImportSummary::default();

    for (row_idx, result) in reader.records().enumerate() {
        // Header is line 1
        let line = row_idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping unreadable CSV row {}: {}", line, e);
                summary.skipped += 1;
                continue;
            }
        };

        match card_from_record(&record, &columns) {
            Ok(new_card) => {
                storage.create_card(new_card, today)?;
                summary.imported += 1;
            }
            Err(reason) => {
                log::warn!("Skipping CSV row {}: {}", line, reason);
                summary.skipped += 1;
            }
        }
    }

    log::info!(
        "Imported {} cards from {:?} ({} skipped)",
        summary.imported,
        path,
        summary.skipped
    );
    Ok(summary)
}

fn card_from_record(
    record: &csv::StringRecord,
    columns: &CsvColumns,
) -> std::result::Result<NewCard, String> {
    let field = |idx: usize| record.get(idx).unwrap_or("").trim();

    let front = field(columns.front);
    let back = field(columns.back);
    if front.is_empty() || back.is_empty() {
        return Err("front and back are required".to_string());
    }

    let subject: Subject = field(columns.subject).parse().map_err(|e| format!("{}", e))?;

    let tags = columns
        .tags
        .map(|idx| parse_tags(field(idx)))
        .unwrap_or_default();

    Ok(NewCard {
        front: front.to_string(),
        back: back.to_string(),
        subject,
        tags,
    })
}

fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()
    }

    #[test]
    fn test_import_csv_counts_skipped_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cards.csv");
        fs::write(
            &path,
            "front,back,subject,tags\n\
             Mailbox rule?,Acceptance effective on dispatch,contracts,offer; Acceptance\n\
             Hearsay?,Out-of-court statement offered for its truth,Evidence,\n\
             Orphan,,torts,\n\
             Zodiac?,Stars,astrology,\n\
             \"Quoted, front\",\"Quoted, back\",conlaw\n",
        )
        .unwrap();

        let db = Database::open_in_memory().unwrap();
        let summary = import_csv(&db, &path, today()).unwrap();
        assert_eq!(summary.imported, 3);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.duplicates, 0);

        let cards = FlashcardStorage::new(&db).list_cards(Some(Subject::Contracts)).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].tags, vec!["offer".to_string(), "acceptance".to_string()]);
        assert_eq!(cards[0].schedule.next_review, today());

        let conlaw = FlashcardStorage::new(&db)
            .list_cards(Some(Subject::ConstitutionalLaw))
            .unwrap();
        assert_eq!(conlaw[0].front, "Quoted, front");
    }

    #[test]
    fn test_import_csv_requires_columns() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cards.csv");
        fs::write(&path, "question,answer\nQ,A\n").unwrap();

        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            import_csv(&db, &path, today()),
            Err(TransferError::MissingColumn("front"))
        ));
    }

    #[test]
    fn test_import_jsonl_mixed_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cards.jsonl");

        let exported = LearningCard::new(
            Subject::Torts,
            "Negligence elements?".to_string(),
            "Duty, breach, causation, damages".to_string(),
            today(),
        );
        let exported_line = serde_json::to_string(&exported).unwrap();
        fs::write(
            &path,
            format!(
                "{exported_line}\n\
                 {{\"front\": \"Miranda?\", \"back\": \"Custody plus interrogation\", \"subject\": \"criminal-law\"}}\n\
                 not json\n\
                 {{\"front\": \"\", \"back\": \"x\", \"subject\": \"torts\"}}\n\
                 {exported_line}\n"
            ),
        )
        .unwrap();

        let db = Database::open_in_memory().unwrap();
        let summary = import_jsonl(&db, &path, today()).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                imported: 2,
                duplicates: 1,
                skipped: 2
            }
        );

        let storage = FlashcardStorage::new(&db);
        assert_eq!(storage.get_card(exported.id).unwrap().front, "Negligence elements?");
        assert_eq!(storage.list_cards(Some(Subject::CriminalLaw)).unwrap().len(), 1);
    }

    #[test]
    fn test_import_jsonl_clamps_schedule() {
        use crate::flashcards::algorithm::{MAX_INTERVAL, MIN_EASE_FACTOR};
        use crate::flashcards::Quality;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cards.jsonl");

        let mut exported = LearningCard::new(
            Subject::Evidence,
            "Present sense impression?".to_string(),
            "Statement describing an event made while perceiving it".to_string(),
            today(),
        );
        exported.schedule.ease_factor = 0.2;
        exported.schedule.interval = 4_000_000_000;
        exported.schedule.repetitions = 3;
        fs::write(&path, format!("{}\n", serde_json::to_string(&exported).unwrap())).unwrap();

        let db = Database::open_in_memory().unwrap();
        assert_eq!(import_jsonl(&db, &path, today()).unwrap().imported, 1);

        let storage = FlashcardStorage::new(&db);
        let stored = storage.get_card(exported.id).unwrap();
        assert_eq!(stored.schedule.ease_factor, MIN_EASE_FACTOR);
        assert_eq!(stored.schedule.interval, MAX_INTERVAL);

        let reviewed = storage
            .submit_review(exported.id, Quality::new(5).unwrap(), today())
            .unwrap();
        assert_eq!(reviewed.schedule.interval, MAX_INTERVAL);
        assert!(reviewed.schedule.ease_factor >= MIN_EASE_FACTOR);
    }

    #[test]
    fn test_import_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let result = import_cards(&db, &temp_dir.path().join("nope.jsonl"), today());
        assert!(matches!(result, Err(TransferError::Io(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let db = Database::open_in_memory().unwrap();
        let result = import_cards(&db, Path::new("deck.apkg"), today());
        assert!(matches!(result, Err(TransferError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags(" a; B ;;c "), vec!["a", "b", "c"]);
        assert!(parse_tags("").is_empty());
    }
}
