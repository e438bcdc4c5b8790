//! Table output for search results and entry logs
//!
//! The one-shot commands print through prettytable's terminal support so
//! header styles are applied; the desk embeds the plain rendering in its
//! own output.

use crate::api::{LogEntry, UserMatch};
use crate::core::strings::{title_case, truncate_graphemes};
use crate::core::styles::StyleRole;
use prettytable::{format, Cell, Row, Table};

/// Longest `info` text shown in the logs table
const INFO_COLUMN_WIDTH: usize = 48;

const NO_USERS: &str = "No users found.";
const NO_LOGS: &str = "No entry logs.";

fn header_cell(title: &str, use_color: bool) -> Cell {
    let cell = Cell::new(title);
    match StyleRole::Header.to_prettytable_spec() {
        Some(spec) if use_color => cell.style_spec(&format!("b{}", spec)),
        _ => cell.style_spec("b"),
    }
}

fn new_table(titles: &[&str], use_color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.set_titles(Row::new(
        titles.iter().map(|t| header_cell(t, use_color)).collect(),
    ));
    table
}

/// Numbered search results; the numbers are what `:select` takes
pub fn matches_table(users: &[UserMatch], use_color: bool) -> Table {
    let mut table = new_table(&["#", "Name", "Username", "Type"], use_color);
    for (index, user) in users.iter().enumerate() {
        table.add_row(Row::new(vec![
            Cell::new(&(index + 1).to_string()),
            Cell::new(&user.full_name),
            Cell::new(&user.user_name),
            Cell::new(&title_case(&user.user_type.to_string())),
        ]));
    }
    table
}

/// Entry logs in the order served
pub fn logs_table(logs: &[LogEntry], use_color: bool) -> Table {
    let mut table = new_table(&["Time", "Action", "Details", "Logged by"], use_color);
    for entry in logs {
        table.add_row(Row::new(vec![
            Cell::new(&entry.date_time),
            Cell::new(&entry.action),
            Cell::new(&truncate_graphemes(&entry.info, INFO_COLUMN_WIDTH)),
            Cell::new(entry.performed_by_name.as_deref().unwrap_or("-")),
        ]));
    }
    table
}

/// Plain-text search results for embedding in desk output
pub fn render_matches(users: &[UserMatch]) -> String {
    if users.is_empty() {
        return NO_USERS.to_string();
    }
    matches_table(users, false).to_string()
}

pub fn print_matches(users: &[UserMatch], use_color: bool) -> std::io::Result<()> {
    if users.is_empty() {
        println!("{}", StyleRole::Dim.paint(NO_USERS, use_color));
        return Ok(());
    }
    matches_table(users, use_color).print_tty(use_color)?;
    Ok(())
}

pub fn print_logs(logs: &[LogEntry], use_color: bool) -> std::io::Result<()> {
    if logs.is_empty() {
        println!("{}", StyleRole::Dim.paint(NO_LOGS, use_color));
        return Ok(());
    }
    logs_table(logs, use_color).print_tty(use_color)?;
    Ok(())
}
