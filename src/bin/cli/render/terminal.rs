/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap `text` in `color` when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

pub fn heading(text: &str, use_color: bool) -> String {
    paint(text, Color::BOLD, use_color)
}

/// Green for right, red for wrong
pub fn verdict(correct: bool, use_color: bool) -> String {
    if correct {
        paint("Correct", Color::GREEN, use_color)
    } else {
        paint("Incorrect", Color::RED, use_color)
    }
}

pub fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

/// Ten-cell bar for a 0.0-1.0 value
pub fn meter(fraction: f64, use_color: bool) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * 10.0).round() as usize;
    let bar = format!("{}{}", "\u{2588}".repeat(filled), "\u{2591}".repeat(10 - filled));
    let color = if fraction >= 0.8 {
        Color::GREEN
    } else if fraction >= 0.5 {
        Color::YELLOW
    } else {
        Color::RED
    };
    paint(&bar, color, use_color)
}

/// Cut `text` to `width` characters, marking the cut with "..."
pub fn truncate(text: &str, width: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= width {
        single_line
    } else {
        let kept: String = single_line.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn rule(width: usize) -> String {
    "\u{2500}".repeat(width)
}

/// Simple word-wrapping for terminal output
pub fn wrap_lines(text: &str, prefix: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let effective_width = max_width.saturating_sub(prefix.len());

    for line in text.lines() {
        if line.chars().count() <= effective_width {
            lines.push(format!("{}{}", prefix, line));
        } else {
            let mut current_line = String::new();
            for word in line.split_whitespace() {
                if current_line.is_empty() {
                    current_line = word.to_string();
                } else if current_line.chars().count() + 1 + word.chars().count() <= effective_width {
                    current_line.push(' ');
                    current_line.push_str(word);
                } else {
                    lines.push(format!("{}{}", prefix, current_line));
                    current_line = word.to_string();
                }
            }
            if !current_line.is_empty() {
                lines.push(format!("{}{}", prefix, current_line));
            }
        }
    }

    if lines.is_empty() && !text.is_empty() {
        lines.push(format!("{}{}", prefix, text));
    }

    lines
}

/// Print `text` wrapped to 80 columns with `prefix` on every line
pub fn print_wrapped(text: &str, prefix: &str) {
    for line in wrap_lines(text, prefix, 80) {
        println!("{}", line);
    }
}

/// Print a titled bullet list, nothing if it is empty
pub fn print_list(title: &str, items: &[String], use_color: bool) {
    if items.is_empty() {
        return;
    }
    println!("{}", heading(title, use_color));
    for item in items {
        print_wrapped(&format!("\u{2022} {}", item), "  ");
    }
}
