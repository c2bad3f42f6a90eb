//! Table formatting for catalog listings.

use qsync_core::{Bank, Category, Sheet};

const NAME_WIDTH: usize = 40;

/// Truncates a string to a maximum number of characters, adding "..." if needed.
///
/// # Examples
///
/// ```rust
/// use qsync_cli::presentation::truncate_string;
///
/// assert_eq!(truncate_string("Hello", 10), "Hello");
/// assert_eq!(truncate_string("Hello World", 8), "Hello...");
/// ```
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

pub fn print_banks(banks: &[Bank]) {
    println!("{:<12} {:<NAME_WIDTH$} {:>8}", "ID", "NAME", "ITEMS");
    print_separator(12 + NAME_WIDTH + 10);
    for bank in banks {
        println!(
            "{:<12} {:<NAME_WIDTH$} {:>8}",
            truncate_string(&bank.id, 12),
            truncate_string(&bank.name, NAME_WIDTH),
            bank.count
        );
    }
}

pub fn print_sheets(sheets: &[Sheet]) {
    println!("{:<12} {:<NAME_WIDTH$} {:>8}", "ID", "NAME", "ITEMS");
    print_separator(12 + NAME_WIDTH + 10);
    for sheet in sheets {
        println!(
            "{:<12} {:<NAME_WIDTH$} {:>8}",
            truncate_string(&sheet.id, 12),
            truncate_string(&sheet.name, NAME_WIDTH),
            sheet.count
        );
    }
}

/// One line per node, children indented under their parent.
pub fn category_lines(categories: &[Category]) -> Vec<String> {
    let mut lines = Vec::new();
    push_lines(categories, 0, &mut lines);
    lines
}

fn push_lines(categories: &[Category], depth: usize, lines: &mut Vec<String>) {
    for category in categories {
        let marker = if category.fetched { "✓" } else { " " };
        lines.push(format!(
            "{marker} {}{} [{}] ({})",
            "  ".repeat(depth),
            category.name,
            category.id,
            category.count
        ));
        push_lines(&category.children, depth + 1, lines);
    }
}

pub fn print_categories(categories: &[Category]) {
    for line in category_lines(categories) {
        println!("{line}");
    }
}
