//! Gender heuristic used to pick a pool for each confirmed name.
//!
//! A name equal to one listed in `FEMALE_NAMES` is female; otherwise a name
//! ending in "a" (accents stripped) is female; everything else is male. Both
//! rules look at the whole name as written, surname included. This is the
//! accepted policy, misclassifications included.

use super::attendance::normalize;
use super::catalog::FEMALE_NAMES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
}

pub fn classify(name: &str) -> Gender {
    let normalized = normalize(name);

    if FEMALE_NAMES.iter().any(|known| normalize(known) == normalized)
        || normalized.ends_with('a')
    {
        Gender::Female
    } else {
        Gender::Male
    }
}
