//! Assignment of confirmed names to roster slots.
//!
//! Slots are filled group by group: female-preferred, then male-preferred,
//! then neutral, each group in catalog order. Every draw takes the oldest
//! unused name of the preferred gender and falls back to the other one. A name
//! is used at most once per run, across all groups.

use std::collections::{HashSet, VecDeque};

use super::attendance::normalize;
use super::catalog::{Affinity, SLOTS, SLOT_COUNT};
use super::classify::{classify, Gender};

/// Slot index to assigned name; `""` means unassigned.
pub type Assignment = Vec<String>;

pub fn empty_assignment() -> Assignment {
    vec![String::new(); SLOT_COUNT]
}

/// One FIFO queue per gender and the shared set of names already placed.
#[derive(Debug, Default)]
pub struct NamePools {
    female: VecDeque<String>,
    male: VecDeque<String>,
    used: HashSet<String>,
}

impl NamePools {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pools = Self::default();
        for name in names {
            let name = name.into();
            match classify(&name) {
                Gender::Female => pools.female.push_back(name),
                Gender::Male => pools.male.push_back(name),
            }
        }
        pools
    }

    /// Takes the next unused name, trying `order[0]` first.
    pub fn draw(&mut self, order: [Gender; 2]) -> Option<String> {
        for gender in order {
            let queue = match gender {
                Gender::Female => &mut self.female,
                Gender::Male => &mut self.male,
            };
            while let Some(name) = queue.pop_front() {
                if self.used.insert(normalize(&name)) {
                    return Some(name);
                }
            }
        }
        None
    }
}

fn draw_order(affinity: Affinity) -> Option<[Gender; 2]> {
    match affinity {
        Affinity::Header => None,
        Affinity::Female => Some([Gender::Female, Gender::Male]),
        Affinity::Male | Affinity::Neutral => Some([Gender::Male, Gender::Female]),
    }
}

/// Fills every assignable slot from `names`. Slots left over once both pools
/// run dry stay empty.
pub fn assign(names: &[String]) -> Assignment {
    let mut pools = NamePools::from_names(names.iter().cloned());
    let mut assignment = empty_assignment();

    for group in [Affinity::Female, Affinity::Male, Affinity::Neutral] {
        let Some(order) = draw_order(group) else {
            continue;
        };
        for (index, slot) in SLOTS.iter().enumerate() {
            if slot.affinity != group {
                continue;
            }
            if let Some(name) = pools.draw(order) {
                assignment[index] = name;
            }
        }
    }

    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::catalog::slot_index;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn assigned(assignment: &Assignment) -> Vec<&str> {
        assignment
            .iter()
            .filter(|n| !n.is_empty())
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn female_slots_prefer_women_and_male_slots_prefer_men() {
        let assignment = assign(&names(&["Pedro", "Maria", "Carlos", "Ana"]));

        assert_eq!(assignment[slot_index("recepcao_1").unwrap()], "Maria");
        assert_eq!(assignment[slot_index("recepcao_2").unwrap()], "Ana");
        // Female pool is dry, the next female slot falls back to men.
        assert_eq!(assignment[slot_index("recepcao_3").unwrap()], "Pedro");
        assert_eq!(assignment[slot_index("recepcao_4").unwrap()], "Carlos");
        assert_eq!(assignment[slot_index("porta_emergencia").unwrap()], "");
    }

    #[test]
    fn male_slots_fall_back_to_women() {
        let many_women: Vec<String> = (1..=10).map(|i| format!("Joana{i}a")).collect();
        let assignment = assign(&many_women);

        assert_eq!(assignment[slot_index("porta_emergencia").unwrap()], "Joana9a");
        assert_eq!(assignment[slot_index("escada").unwrap()], "Joana10a");
    }

    #[test]
    fn neutral_slots_draw_men_first() {
        // Eight women fill the female group exactly.
        let mut list: Vec<String> = (1..=8).map(|i| format!("Ana{i}a")).collect();
        list.extend(names(&["Bruno", "Caio", "Davi", "Eva"]));
        let assignment = assign(&list);

        assert_eq!(assignment[slot_index("porta_emergencia").unwrap()], "Bruno");
        assert_eq!(assignment[slot_index("escada").unwrap()], "Caio");
        assert_eq!(assignment[slot_index("porta_camarim").unwrap()], "Davi");
        assert_eq!(assignment[slot_index("porta_principal_1").unwrap()], "Eva");
    }

    #[test]
    fn no_name_is_used_twice() {
        let assignment = assign(&names(&["Maria", "maria", "MARIA", "João", "Joao", "Pedro"]));
        let used = assigned(&assignment);

        assert_eq!(used.len(), 3);
        let unique: HashSet<String> = used.iter().map(|n| normalize(n)).collect();
        assert_eq!(unique.len(), used.len());
    }

    #[test]
    fn headers_are_never_assigned() {
        let list: Vec<String> = (0..40).map(|i| format!("Pessoa {i}")).collect();
        let assignment = assign(&list);

        for (slot, name) in SLOTS.iter().zip(&assignment) {
            assert_eq!(slot.is_assignable(), !name.is_empty(), "{}", slot.key);
        }
        assert_eq!(assigned(&assignment).len(), 21);
    }

    #[test]
    fn no_names_leaves_everything_empty() {
        assert_eq!(assign(&[]), empty_assignment());
    }

    #[test]
    fn pools_fall_back_to_the_other_gender() {
        let mut pools = NamePools::from_names(["Ana", "Bruno"]);
        assert_eq!(pools.draw([Gender::Male, Gender::Female]).as_deref(), Some("Bruno"));
        assert_eq!(pools.draw([Gender::Male, Gender::Female]).as_deref(), Some("Ana"));
        assert_eq!(pools.draw([Gender::Male, Gender::Female]), None);
    }
}
