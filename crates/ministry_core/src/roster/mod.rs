//! The duty-roster composer: turns a pasted attendance list into slot
//! assignments, an announcement text and a diagram layout.

pub mod assign;
pub mod attendance;
pub mod catalog;
pub mod classify;
pub mod composer;
pub mod layout;
pub mod message;

pub use assign::{assign, Assignment};
pub use catalog::{Affinity, Section, SlotDef, CANVAS_HEIGHT, CANVAS_WIDTH, SLOTS, SLOT_COUNT};
pub use classify::Gender;
pub use composer::{RosterComposer, RosterError};
pub use layout::LabelPlacement;
pub use message::PLACEHOLDER;
