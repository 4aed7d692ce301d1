//! The announcement text shared with the team after the roster is filled.

use super::catalog::{Affinity, Section, SLOTS};

/// Written in place of a name when a position is still open.
pub const PLACEHOLDER: &str = "A definir";

/// Renders the fixed announcement template.
///
/// Sections appear in catalog order; header slots become italic sub-titles and
/// every assignable slot gets one bullet line.
pub fn render_message(team_name: &str, assignment: &[String]) -> String {
    let mut out = format!("*ESCALA - {}*\n", team_name.trim().to_uppercase());

    for section in Section::ALL {
        out.push_str(&format!("\n*{}*\n", section.title()));
        for (index, slot) in SLOTS.iter().enumerate() {
            if slot.section != section {
                continue;
            }
            if slot.affinity == Affinity::Header {
                out.push_str(&format!("_{}_\n", slot.label));
                continue;
            }
            let name = assignment
                .get(index)
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .unwrap_or(PLACEHOLDER);
            out.push_str(&format!("• {}: {}\n", slot.label, name));
        }
    }

    out.push_str("\nDeus abençoe o serviço de todos! 🙏\n");
    out
}
