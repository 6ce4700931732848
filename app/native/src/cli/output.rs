//! CLI output formatting: JSON highlighting and table cell helpers.

use colored::Colorize;
use serde_json::Value;

/// Prints JSON with syntax highlighting.
///
/// Keys are cyan, strings green, numbers yellow, booleans and null magenta.
/// With colors disabled the output matches `serde_json`'s pretty printer.
pub fn print_highlighted_json(value: &Value) {
    println!("{}", highlight(value, 0));
}

fn highlight(value: &Value, depth: usize) -> String {
    match value {
        Value::Null => "null".magenta().to_string(),
        Value::Bool(b) => b.to_string().magenta().to_string(),
        Value::Number(n) => n.to_string().yellow().to_string(),
        Value::String(s) => quoted(s).green().to_string(),
        Value::Array(items) if items.is_empty() => "[]".bold().to_string(),
        Value::Object(map) if map.is_empty() => "{}".bold().to_string(),
        Value::Array(items) => {
            let entries = items.iter().map(|item| highlight(item, depth + 1));
            block(entries, depth, "[", "]")
        }
        Value::Object(map) => {
            let entries = map
                .iter()
                .map(|(key, item)| format!("{}: {}", quoted(key).cyan(), highlight(item, depth + 1)));
            block(entries, depth, "{", "}")
        }
    }
}

fn block(entries: impl Iterator<Item = String>, depth: usize, open: &str, close: &str) -> String {
    let pad = "  ".repeat(depth + 1);
    let body: Vec<String> = entries.map(|entry| format!("{pad}{entry}")).collect();
    format!("{}\n{}\n{}{}", open.bold(), body.join(",\n"), "  ".repeat(depth), close.bold())
}

fn quoted(s: &str) -> String { serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\"")) }

/// Truncates a string to a maximum number of characters, adding ellipsis if needed.
///
/// Counts characters, not bytes, so multi-byte names are cut cleanly.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 1 {
        "…".to_string()
    } else {
        let kept: String = s.chars().take(max_chars - 1).collect();
        format!("{kept}…")
    }
}

/// Formats a boolean as a colored check mark or cross.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}
