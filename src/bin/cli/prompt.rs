//! Line-oriented stdin prompts for the interactive sessions

use std::io::{self, BufRead, Write};

use anyhow::Result;

use barprep_lib::flashcards::Quality;
use barprep_lib::Subject;

/// Print `prompt` and read one trimmed line. `None` on end of input.
pub fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Read lines until one containing only "." or end of input
pub fn read_block(prompt: &str) -> Result<String> {
    println!("{}", prompt);
    println!("(finish with a line containing only \".\")");

    let stdin = io::stdin();
    let mut text = String::new();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim() == "." {
            break;
        }
        text.push_str(&line);
        text.push('\n');
    }
    Ok(text.trim_end().to_string())
}

pub fn confirm(prompt: &str) -> Result<bool> {
    let answer = read_line(&format!("{} [y/N] ", prompt))?.unwrap_or_default();
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

/// What the user did with a graded item
pub enum Grade {
    Rated(Quality),
    Skip,
    Quit,
}

/// Ask for a 0-5 rating until one is given
pub fn read_grade() -> Result<Grade> {
    loop {
        let Some(answer) = read_line("Rate recall 0-5 (s = skip, q = quit): ")? else {
            return Ok(Grade::Quit);
        };
        match answer.to_lowercase().as_str() {
            "q" | "quit" => return Ok(Grade::Quit),
            "s" | "skip" => return Ok(Grade::Skip),
            other => match other.parse::<i64>().ok().and_then(|n| Quality::new(n).ok()) {
                Some(quality) => return Ok(Grade::Rated(quality)),
                None => println!("Enter a number from 0 to 5."),
            },
        }
    }
}

/// Ask for a subject by name or alias; empty input means any subject
pub fn read_subject(prompt: &str) -> Result<Option<Subject>> {
    loop {
        let Some(answer) = read_line(prompt)? else {
            return Ok(None);
        };
        if answer.is_empty() {
            return Ok(None);
        }
        match answer.parse::<Subject>() {
            Ok(subject) => return Ok(Some(subject)),
            Err(e) => {
                println!("{}. Known subjects:", e);
                for subject in Subject::ALL {
                    println!("  {} ({})", subject, subject.slug());
                }
            }
        }
    }
}

/// Ask for a multiple-choice letter among `letters`
pub fn read_choice(letters: &[char]) -> Result<Option<char>> {
    let options: String = letters.iter().collect();
    loop {
        let Some(answer) = read_line(&format!("Your answer [{}]: ", options))? else {
            return Ok(None);
        };
        let mut chars = answer.chars();
        match (chars.next().map(|c| c.to_ascii_uppercase()), chars.next()) {
            (Some(c), None) if letters.contains(&c) => return Ok(Some(c)),
            (Some('Q'), None) => return Ok(None),
            _ => println!("Answer with one of {} (or q to stop).", options),
        }
    }
}
