//! The roster composer: ephemeral state behind the schedule screen.

use tracing::debug;

use super::assign::{assign, empty_assignment, Assignment};
use super::attendance::confirmed_names;
use super::catalog::SLOTS;
use super::layout::{label_placements, LabelPlacement};
use super::message::render_message;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("Slot {0} does not exist")]
    NoSuchSlot(usize),
    #[error("Slot '{0}' is a header and cannot be assigned")]
    NotAssignable(&'static str),
}

#[derive(Debug, Clone)]
pub struct RosterComposer {
    team_name: String,
    attendance: String,
    assignment: Assignment,
    message: Option<String>,
}

impl RosterComposer {
    pub fn new(team_name: impl Into<String>) -> Self {
        Self {
            team_name: team_name.into(),
            attendance: String::new(),
            assignment: empty_assignment(),
            message: None,
        }
    }

    pub fn team_name(&self) -> &str {
        &self.team_name
    }

    pub fn attendance(&self) -> &str {
        &self.attendance
    }

    pub fn assignment(&self) -> &[String] {
        &self.assignment
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_attendance(&mut self, text: impl Into<String>) {
        self.attendance = text.into();
    }

    /// Parses the attendance list and replaces every slot with a fresh
    /// assignment run.
    pub fn fill_confirmed(&mut self) -> &[String] {
        let names = confirmed_names(&self.attendance);
        self.assignment = assign(&names);
        debug!(
            confirmed = names.len(),
            assigned = self.assignment.iter().filter(|n| !n.is_empty()).count(),
            "roster filled"
        );
        &self.assignment
    }

    /// Manual edit of one position. An empty name clears the slot.
    pub fn set_slot(&mut self, index: usize, name: &str) -> Result<(), RosterError> {
        let slot = SLOTS.get(index).ok_or(RosterError::NoSuchSlot(index))?;
        if !slot.is_assignable() {
            return Err(RosterError::NotAssignable(slot.label));
        }
        self.assignment[index] = name.trim().to_string();
        Ok(())
    }

    pub fn generate_message(&mut self) -> &str {
        self.message
            .insert(render_message(&self.team_name, &self.assignment))
    }

    pub fn placements<F>(&self, measure: F) -> Vec<LabelPlacement>
    where
        F: Fn(&str) -> u32,
    {
        label_placements(&self.assignment, measure)
    }

    /// Back to the initial empty state. The team label is kept.
    pub fn reset(&mut self) {
        self.attendance.clear();
        self.assignment = empty_assignment();
        self.message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::catalog::{slot_index, Affinity};

    const SAMPLE: &str = "João - Confirmado\nMaria - Confirmada\nPedro - Justificado";

    fn slot_of(composer: &RosterComposer, name: &str) -> Vec<usize> {
        composer
            .assignment()
            .iter()
            .enumerate()
            .filter(|(_, n)| n.as_str() == name)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn sample_list_places_maria_on_a_female_slot() {
        let mut composer = RosterComposer::new("Obreiros");
        composer.set_attendance(SAMPLE);
        composer.fill_confirmed();

        assert_eq!(slot_of(&composer, "Maria"), vec![slot_index("recepcao_1").unwrap()]);
        assert_eq!(SLOTS[slot_of(&composer, "Maria")[0]].affinity, Affinity::Female);
        assert_eq!(slot_of(&composer, "João").len(), 1);
        assert!(slot_of(&composer, "Pedro").is_empty());
    }

    #[test]
    fn coordinator_never_gets_a_slot() {
        let mut composer = RosterComposer::new("Obreiros");
        composer.set_attendance("Ivan - ✅\nIVAN - ok\nLucas - presente");
        composer.fill_confirmed();

        assert!(slot_of(&composer, "Ivan").is_empty());
        assert!(slot_of(&composer, "IVAN").is_empty());
        assert_eq!(slot_of(&composer, "Lucas").len(), 1);
    }

    #[test]
    fn refill_replaces_previous_run() {
        let mut composer = RosterComposer::new("Obreiros");
        composer.set_attendance(SAMPLE);
        composer.fill_confirmed();
        composer.set_attendance("Carla - ok");
        composer.fill_confirmed();

        assert!(slot_of(&composer, "Maria").is_empty());
        assert_eq!(slot_of(&composer, "Carla").len(), 1);
    }

    #[test]
    fn manual_edits_respect_headers() {
        let mut composer = RosterComposer::new("Obreiros");
        assert_eq!(
            composer.set_slot(0, "Ana"),
            Err(RosterError::NotAssignable("Lateral Camarim"))
        );
        assert_eq!(composer.set_slot(99, "Ana"), Err(RosterError::NoSuchSlot(99)));

        let galeria = slot_index("galeria").unwrap();
        composer.set_slot(galeria, "  Rute ").unwrap();
        assert_eq!(composer.assignment()[galeria], "Rute");
    }

    #[test]
    fn message_reflects_assignment_and_team() {
        let mut composer = RosterComposer::new("Obreiros");
        composer.set_attendance(SAMPLE);
        composer.fill_confirmed();
        let text = composer.generate_message().to_string();

        assert!(text.starts_with("*ESCALA - OBREIROS*"));
        assert!(text.contains("• Recepção 1: Maria"));
        assert_eq!(composer.message(), Some(text.as_str()));
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut composer = RosterComposer::new("Obreiros");
        composer.set_attendance(SAMPLE);
        composer.fill_confirmed();
        composer.generate_message();

        composer.reset();

        assert_eq!(composer.assignment().len(), 25);
        assert!(composer.assignment().iter().all(String::is_empty));
        assert_eq!(composer.attendance(), "");
        assert_eq!(composer.message(), None);
        assert!(composer.placements(|s| s.len() as u32).is_empty());
        assert_eq!(composer.team_name(), "Obreiros");
    }
}
