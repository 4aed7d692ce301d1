//! Placement of names on the roster diagram.
//!
//! The rasteriser lives in the service; this module only decides which lines
//! go where, given a width measure supplied by the caller.

use super::catalog::{LABEL_LINE_HEIGHT, LABEL_MAX_WIDTH, SLOTS};

/// Wrapped name text anchored at a slot's coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPlacement {
    pub slot: usize,
    pub x: u32,
    pub y: u32,
    pub lines: Vec<String>,
}

/// Greedy word wrap. A single word wider than `max_width` keeps its own line.
pub fn wrap_words<F>(text: &str, max_width: u32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> u32,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// One placement per assigned slot, in catalog order.
pub fn label_placements<F>(assignment: &[String], measure: F) -> Vec<LabelPlacement>
where
    F: Fn(&str) -> u32,
{
    SLOTS
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_assignable())
        .filter_map(|(index, slot)| {
            let name = assignment.get(index)?.trim();
            if name.is_empty() {
                return None;
            }
            Some(LabelPlacement {
                slot: index,
                x: slot.x,
                y: slot.y,
                lines: wrap_words(name, LABEL_MAX_WIDTH, &measure),
            })
        })
        .collect()
}

/// Vertical offset of line `n` inside a placement.
pub fn line_offset(n: usize) -> u32 {
    n as u32 * LABEL_LINE_HEIGHT
}
