//! Flashcards and spaced repetition
//!
//! This module provides:
//! - Card CRUD backed by the `cards` table
//! - SM-2 spaced repetition algorithm (also used for knowledge concepts)
//! - Due-card queries and review submission

pub mod algorithm;
pub mod models;
pub mod storage;

pub use algorithm::{Quality, Sm2State};
pub use models::*;
pub use storage::FlashcardStorage;
