//! Table output formatting for CLI commands
//!
//! Renders posts with comfy-table, honouring `NO_COLOR` and dumb terminals.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use super::truncate;
use crate::domain::models::Post;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    /// Create a new table formatter
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    /// Create a new table formatter with custom settings
    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Format posts as a table
    pub fn format_posts(&self, posts: &[Post]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Body").add_attribute(Attribute::Bold),
        ]);

        for post in posts {
            let title = if self.use_colors {
                Cell::new(truncate(&post.title, 50)).fg(Color::Cyan)
            } else {
                Cell::new(truncate(&post.title, 50))
            };

            table.add_row(vec![
                Cell::new(post.id),
                title,
                Cell::new(truncate(&post.body.replace('\n', " "), 60)),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_posts_contains_rows() {
        let posts = vec![
            Post {
                id: 1,
                user_id: Some(1),
                title: "sunt aut facere".to_string(),
                body: "quia et suscipit\nsuscipit recusandae".to_string(),
            },
            Post {
                id: 2,
                user_id: Some(1),
                title: "qui est esse".to_string(),
                body: "est rerum tempore".to_string(),
            },
        ];

        let rendered = TableFormatter::with_config(false, Some(120)).format_posts(&posts);
        assert!(rendered.contains("sunt aut facere"));
        assert!(rendered.contains("qui est esse"));
        assert!(rendered.contains("quia et suscipit suscipit recusandae"));
    }

    #[test]
    fn test_format_empty_list_has_header() {
        let rendered = TableFormatter::with_config(false, None).format_posts(&[]);
        assert!(rendered.contains("Title"));
    }
}
