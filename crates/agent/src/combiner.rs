//! Merges the per-part results of an oversized row into one record.
//!
//! The merged record is attributed to the full row text. Categories from
//! every successful part are kept in order; a keyword seen again extends the
//! earlier category's content instead of repeating the category, and exact
//! duplicate fragments are dropped. `message_type` comes from the first
//! successful part. If no part succeeded the record is error-shaped and
//! lists every part's error.

use splitscore_core::{Category, SplitResult};
use tracing::warn;

pub fn combine(original: &str, parts: Vec<SplitResult>) -> SplitResult {
    if parts.is_empty() {
        return SplitResult::failed(original, "no parts to combine");
    }

    let total = parts.len();
    let mut merged: Option<SplitResult> = None;
    let mut errors = Vec::new();

    for (index, part) in parts.into_iter().enumerate() {
        if let Some(err) = &part.error {
            warn!(part = index + 1, of = total, error = %err, "Dropping failed part");
            errors.push(format!("part {}: {}", index + 1, err));
            continue;
        }

        match merged.as_mut() {
            None => {
                let mut first = part;
                first.original_message = Some(original.to_string());
                first.categories = Some(merge_categories(
                    Vec::new(),
                    first.categories.take().unwrap_or_default(),
                ));
                merged = Some(first);
            }
            Some(acc) => {
                if acc.message_type.is_none() {
                    acc.message_type = part.message_type;
                }
                let so_far = acc.categories.take().unwrap_or_default();
                acc.categories = Some(merge_categories(
                    so_far,
                    part.categories.unwrap_or_default(),
                ));
                for (key, value) in part.extra {
                    acc.extra.entry(key).or_insert(value);
                }
            }
        }
    }

    merged.unwrap_or_else(|| SplitResult::failed(original, errors.join("; ")))
}

/// Append `incoming` to `acc`, folding repeated keywords together.
fn merge_categories(mut acc: Vec<Category>, incoming: Vec<Category>) -> Vec<Category> {
    for category in incoming {
        let index = match acc.iter().position(|c| c.keyword == category.keyword) {
            Some(index) => index,
            None => {
                acc.push(Category::new(category.keyword.clone(), Vec::new()));
                acc.len() - 1
            }
        };
        let target = &mut acc[index].content;
        for item in category.content {
            if !target.contains(&item) {
                target.push(item);
            }
        }
    }
    acc
}
