//! Static configuration of the duty-roster diagram: the 25 positions, where
//! each one sits on the base image, and the name tables used to fill them.

/// Which pool a slot draws from first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    /// Display-only heading on the diagram, never assigned.
    Header,
    Female,
    Male,
    Neutral,
}

/// Logical grouping used by the announcement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Entrances,
    Corridors,
    Reception,
    Special,
    Logistics,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Entrances,
        Section::Corridors,
        Section::Reception,
        Section::Special,
        Section::Logistics,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Entrances => "ENTRADAS",
            Section::Corridors => "CORREDORES",
            Section::Reception => "RECEPÇÃO",
            Section::Special => "POSIÇÕES ESPECIAIS",
            Section::Logistics => "LOGÍSTICA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotDef {
    pub key: &'static str,
    pub label: &'static str,
    pub section: Section,
    pub affinity: Affinity,
    /// Top-left corner of the name label, in canvas pixels.
    pub x: u32,
    pub y: u32,
}

impl SlotDef {
    pub fn is_assignable(&self) -> bool {
        self.affinity != Affinity::Header
    }
}

pub const CANVAS_WIDTH: u32 = 1200;
pub const CANVAS_HEIGHT: u32 = 900;
/// Names wider than this are wrapped onto several lines.
pub const LABEL_MAX_WIDTH: u32 = 150;
pub const LABEL_LINE_HEIGHT: u32 = 22;

pub const SLOT_COUNT: usize = 25;

const fn slot(
    key: &'static str,
    label: &'static str,
    section: Section,
    affinity: Affinity,
    x: u32,
    y: u32,
) -> SlotDef {
    SlotDef {
        key,
        label,
        section,
        affinity,
        x,
        y,
    }
}

use Affinity::{Female, Header, Male, Neutral};
use Section::{Corridors, Entrances, Logistics, Reception, Special};

pub static SLOTS: [SlotDef; SLOT_COUNT] = [
    slot("lateral_camarim", "Lateral Camarim", Entrances, Header, 60, 40),
    slot("porta_camarim", "Porta Lateral Camarim", Entrances, Neutral, 60, 90),
    slot("porta_principal_1", "Porta Principal 1", Entrances, Neutral, 470, 820),
    slot("porta_principal_2", "Porta Principal 2", Entrances, Neutral, 640, 820),
    slot("porta_emergencia", "Porta de Emergência", Entrances, Male, 1020, 90),
    slot("nave_principal", "Nave Principal", Corridors, Header, 500, 250),
    slot("corredor_esquerdo", "Corredor Esquerdo", Corridors, Neutral, 300, 420),
    slot("corredor_central", "Corredor Central", Corridors, Neutral, 560, 420),
    slot("corredor_direito", "Corredor Direito", Corridors, Neutral, 820, 420),
    slot("escada", "Escada", Corridors, Male, 1020, 300),
    slot("hall_entrada", "Hall de Entrada", Reception, Header, 500, 660),
    slot("recepcao_1", "Recepção 1", Reception, Female, 300, 720),
    slot("recepcao_2", "Recepção 2", Reception, Female, 460, 720),
    slot("recepcao_3", "Recepção 3", Reception, Female, 640, 720),
    slot("recepcao_4", "Recepção 4", Reception, Female, 800, 720),
    slot("controlador_area", "Controlador de Área", Special, Female, 60, 300),
    slot("staff", "Staff", Special, Female, 60, 420),
    slot("auxiliar_pastoral", "Auxiliar Pastoral", Special, Female, 560, 90),
    slot("auxiliar", "Auxiliar", Special, Female, 760, 90),
    slot("altar", "Altar", Special, Neutral, 360, 90),
    slot("galeria", "Galeria", Special, Neutral, 1020, 540),
    slot("area_externa", "Área Externa", Logistics, Header, 60, 560),
    slot("estacionamento_1", "Estacionamento 1", Logistics, Neutral, 60, 620),
    slot("estacionamento_2", "Estacionamento 2", Logistics, Neutral, 60, 740),
    slot("apoio_kids", "Apoio Kids", Logistics, Neutral, 1020, 740),
];

/// Coordinators run the day and are never placed on a position.
pub static COORDINATORS: &[&str] = &["Ivan", "Cláudio", "Rebeca Lima"];

/// First names treated as female even though they do not end in "a".
pub static FEMALE_NAMES: &[&str] = &[
    "Raquel", "Isabel", "Ester", "Esther", "Rute", "Ruth", "Beatriz", "Lourdes", "Carmen",
    "Miriam", "Sarah", "Ingrid", "Rachel", "Elizabeth", "Thais", "Iris", "Alice", "Denise",
    "Aline", "Simone", "Jaqueline", "Gisele", "Michele", "Kelly", "Nicole", "Cristiane",
    "Viviane", "Mariane", "Liz",
];

pub fn slot_index(key: &str) -> Option<usize> {
    SLOTS.iter().position(|s| s.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(affinity: Affinity) -> usize {
        SLOTS.iter().filter(|s| s.affinity == affinity).count()
    }

    #[test]
    fn catalog_has_expected_shape() {
        assert_eq!(SLOTS.len(), 25);
        assert_eq!(count(Affinity::Header), 4);
        assert_eq!(count(Affinity::Female), 8);
        assert_eq!(count(Affinity::Male), 2);
        assert_eq!(count(Affinity::Neutral), 11);
    }

    #[test]
    fn first_slot_is_the_camarim_header() {
        assert_eq!(SLOTS[0].label, "Lateral Camarim");
        assert!(!SLOTS[0].is_assignable());
    }

    #[test]
    fn keys_are_unique_and_coordinates_fit_the_canvas() {
        for (i, s) in SLOTS.iter().enumerate() {
            assert_eq!(slot_index(s.key), Some(i), "duplicate key {}", s.key);
            assert!(s.x + LABEL_MAX_WIDTH <= CANVAS_WIDTH, "{} overflows", s.key);
            assert!(s.y < CANVAS_HEIGHT, "{} overflows", s.key);
        }
    }

    #[test]
    fn sections_are_contiguous_in_catalog_order() {
        let mut seen = Vec::new();
        for s in SLOTS.iter() {
            if seen.last() != Some(&s.section) {
                assert!(!seen.contains(&s.section), "{:?} split", s.section);
                seen.push(s.section);
            }
        }
        assert_eq!(seen, Section::ALL);
    }
}
