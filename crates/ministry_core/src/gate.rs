//! crates/ministry_core/src/gate.rs
//!
//! The progress gate: decides which lessons of a course are reachable given a
//! progress snapshot, and how the viewer moves from one lesson to the next.
//!
//! Everything here is a pure function of `(modules, progress)`. Callers are
//! expected to recompute the lock map whenever either input changes instead of
//! caching it.

use crate::domain::{Module, Progress};

/// Position of a lesson inside the effective module list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LessonPosition {
    pub module: usize,
    pub lesson: usize,
}

impl LessonPosition {
    pub fn new(module: usize, lesson: usize) -> Self {
        Self { module, lesson }
    }
}

/// Derived access state of a single lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonState {
    Locked,
    Unlocked,
    Completed,
}

/// True when `progress` holds a completed marker for `(module_id, lesson_id)`.
///
/// A lesson or module without an id can never be completed; an empty id would
/// match every other id-less lesson.
pub fn is_lesson_completed(progress: &Progress, module_id: &str, lesson_id: &str) -> bool {
    if module_id.is_empty() || lesson_id.is_empty() {
        return false;
    }
    progress
        .completed_lessons
        .iter()
        .any(|m| m.completed && m.module_id == module_id && m.lesson_id == lesson_id)
}

/// Decides whether the lesson at `pos` may be opened.
///
/// The first lesson of the course is always open. Any other lesson opens once
/// the lesson before it is completed; for the first lesson of a module that is
/// the last lesson of the nearest earlier module that has lessons. Modules
/// without lessons are skipped when chaining.
pub fn is_unlocked(modules: &[Module], progress: &Progress, pos: LessonPosition) -> bool {
    let Some(module) = modules.get(pos.module) else {
        return false;
    };
    if pos.lesson >= module.lessons.len() {
        return false;
    }

    if pos.lesson > 0 {
        let previous = &module.lessons[pos.lesson - 1];
        return is_lesson_completed(progress, &module.id, &previous.id);
    }

    let preceding = modules[..pos.module]
        .iter()
        .rev()
        .find_map(|m| m.lessons.last().map(|lesson| (m, lesson)));

    match preceding {
        Some((module, last)) => is_lesson_completed(progress, &module.id, &last.id),
        None => true,
    }
}

pub fn lesson_state(modules: &[Module], progress: &Progress, pos: LessonPosition) -> LessonState {
    if !is_unlocked(modules, progress, pos) {
        return LessonState::Locked;
    }
    let module = &modules[pos.module];
    let lesson = &module.lessons[pos.lesson];
    if is_lesson_completed(progress, &module.id, &lesson.id) {
        LessonState::Completed
    } else {
        LessonState::Unlocked
    }
}

/// Lock map for the whole course, indexed as `[module][lesson]`.
pub fn gate_map(modules: &[Module], progress: &Progress) -> Vec<Vec<LessonState>> {
    modules
        .iter()
        .enumerate()
        .map(|(m, module)| {
            (0..module.lessons.len())
                .map(|l| lesson_state(modules, progress, LessonPosition::new(m, l)))
                .collect()
        })
        .collect()
}

/// First lesson of the course, or `None` when it has no lessons at all.
pub fn first_position(modules: &[Module]) -> Option<LessonPosition> {
    modules
        .iter()
        .position(|m| !m.lessons.is_empty())
        .map(|m| LessonPosition::new(m, 0))
}

/// The lesson that follows `pos`: the next one in the same module, else the
/// first lesson of the next non-empty module. `None` once the course is done.
pub fn next_position(modules: &[Module], pos: LessonPosition) -> Option<LessonPosition> {
    let module = modules.get(pos.module)?;
    if pos.lesson + 1 < module.lessons.len() {
        return Some(LessonPosition::new(pos.module, pos.lesson + 1));
    }
    modules
        .iter()
        .enumerate()
        .skip(pos.module + 1)
        .find(|(_, m)| !m.lessons.is_empty())
        .map(|(m, _)| LessonPosition::new(m, 0))
}

/// The certificate action is offered only for a completed course whose
/// certificate has not been issued yet.
pub fn certificate_available(progress: &Progress) -> bool {
    progress.completed && !progress.certificate_issued
}

/// Link to an already issued certificate, if the server reported one.
pub fn certificate_link(progress: &Progress) -> Option<&str> {
    if progress.certificate_issued {
        progress.certificate_url.as_deref()
    } else {
        None
    }
}
