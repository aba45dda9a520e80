//! crates/cookbook_core/src/report.rs
//!
//! Renders the consolidated shopping list as a plain-text report.

use chrono::{DateTime, TimeZone};

use crate::cart::ShoppingListEntry;

/// Renders one line per entry, `"{name}: {total} {unit}"`, newline-terminated,
/// preserving the entries' order. An empty list renders as an empty string.
pub fn render_shopping_list(entries: &[ShoppingListEntry]) -> String {
    let mut body = String::new();
    for entry in entries {
        body.push_str(&format!(
            "{}: {} {}\n",
            entry.name, entry.total_amount, entry.measurement_unit
        ));
    }
    body
}

/// Suggested download filename: `{username}_shopping_cart {DD-MM-YYYY HH-MM}.txt`.
///
/// Callers pass the current server-local time; repeated calls within one
/// minute produce the same name, which is acceptable.
pub fn shopping_list_filename<Tz>(username: &str, now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_shopping_cart {}.txt",
        username,
        now.format("%d-%m-%Y %H-%M")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(name: &str, unit: &str, total: i64) -> ShoppingListEntry {
        ShoppingListEntry {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            total_amount: total,
        }
    }

    #[test]
    fn renders_one_line_per_entry_in_order() {
        let entries = vec![entry("Flour", "g", 450), entry("Salt", "tsp", 2)];
        assert_eq!(
            render_shopping_list(&entries),
            "Flour: 450 g\nSalt: 2 tsp\n"
        );
    }

    #[test]
    fn empty_list_renders_empty_body() {
        assert_eq!(render_shopping_list(&[]), "");
    }

    #[test]
    fn filename_embeds_username_and_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 59).unwrap();
        assert_eq!(
            shopping_list_filename("alice", now),
            "alice_shopping_cart 05-03-2024 14-30.txt"
        );
    }
}
