//! Markdown report generation
//!
//! Renders the joined view as a human-readable report: one section per item
//! with its listing fields, specification bullets and reviews.

use crate::model::{display_field, JoinedItem, JoinedReview};
use crate::output::OutputResult;
use crate::storage::SnapshotRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report of `items` to `output_path`
pub fn generate_markdown_report(
    items: &[JoinedItem],
    snapshot: Option<&SnapshotRecord>,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_report(items, snapshot);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats the joined view as markdown
///
/// Absent fields render as the `NA` sentinel.
pub fn format_markdown_report(items: &[JoinedItem], snapshot: Option<&SnapshotRecord>) -> String {
    let mut md = String::new();

    md.push_str("# Review Harvest\n\n");

    if let Some(record) = snapshot {
        md.push_str("## Harvest Information\n\n");
        md.push_str(&format!("- **Query**: {}\n", record.query));
        md.push_str(&format!(
            "- **Pages**: {} of {} requested\n",
            record.pages_traversed, record.pages_requested
        ));
        md.push_str(&format!(
            "- **Stop Reason**: {}\n",
            record.stop_reason.to_db_string()
        ));
        md.push_str(&format!("- **Stored**: {}\n\n", record.stored_at));
    }

    let review_count: usize = items.iter().map(|i| i.reviews.len()).sum();
    md.push_str("## Overview\n\n");
    md.push_str(&format!("- **Items**: {}\n", items.len()));
    md.push_str(&format!("- **Reviews**: {}\n\n", review_count));

    if items.is_empty() {
        md.push_str("No data found.\n");
        return md;
    }

    md.push_str("| # | Name | Price | Rating | Reviews |\n");
    md.push_str("|---|------|-------|--------|---------|\n");
    for (index, item) in items.iter().enumerate() {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            index + 1,
            escape_cell(display_field(&item.name)),
            escape_cell(display_field(&item.price)),
            escape_cell(display_field(&item.overall_rating)),
            item.reviews.len()
        ));
    }
    md.push('\n');

    for (index, item) in items.iter().enumerate() {
        md.push_str(&format!("## {}. {}\n\n", index + 1, display_field(&item.name)));
        md.push_str(&format!("- **Price**: {}\n", display_field(&item.price)));
        md.push_str(&format!(
            "- **Rating**: {}\n",
            display_field(&item.overall_rating)
        ));
        md.push_str(&format!("- **Link**: <{}>\n\n", item.detail_link));

        if !item.specification.is_empty() {
            md.push_str("### Specification\n\n");
            for bullet in &item.specification {
                md.push_str(&format!("- {}\n", bullet));
            }
            md.push('\n');
        }

        if !item.reviews.is_empty() {
            md.push_str(&format!("### Reviews ({})\n\n", item.reviews.len()));
            for review in &item.reviews {
                push_review(&mut md, review);
            }
        }
    }

    md
}

fn push_review(md: &mut String, review: &JoinedReview) {
    md.push_str(&format!(
        "**{}** ({}) by {}\n\n",
        display_field(&review.title),
        display_field(&review.rating),
        display_field(&review.author)
    ));
    md.push_str(&format!("> {}\n\n", display_field(&review.body)));
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
