//! crates/ministry_core/src/domain.rs
//!
//! Defines the pure, core data structures for the portal.
//! These structs are independent of the remote API's wire format; adapters
//! convert their own records into these types.

use chrono::{DateTime, Utc};

/// Id given to the synthetic module that wraps a legacy, flat lesson list.
pub const LEGACY_MODULE_ID: &str = "default";

/// A single lesson. Owned by exactly one [`Module`].
#[derive(Debug, Clone, PartialEq)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub duration_secs: Option<u32>,
    pub order: i32,
}

/// An ordered grouping of lessons within a course.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub id: String,
    pub title: String,
    pub order: i32,
    pub lessons: Vec<Lesson>,
}

/// How a course stores its lessons.
#[derive(Debug, Clone, PartialEq)]
pub enum CourseContent {
    Modules(Vec<Module>),
    /// Older courses carry a flat lesson list and no modules.
    Lessons(Vec<Lesson>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub content: CourseContent,
}

impl Course {
    /// Returns the module list the viewer works with.
    ///
    /// Modules and lessons are sorted by their `order` field. A legacy course
    /// becomes a single synthetic module; a course without any lesson yields an
    /// empty list.
    pub fn effective_modules(&self) -> Vec<Module> {
        let mut modules = match &self.content {
            CourseContent::Modules(modules) => modules.clone(),
            CourseContent::Lessons(lessons) if lessons.is_empty() => Vec::new(),
            CourseContent::Lessons(lessons) => vec![Module {
                id: LEGACY_MODULE_ID.to_string(),
                title: self.title.clone(),
                order: 1,
                lessons: lessons.clone(),
            }],
        };

        modules.sort_by_key(|m| m.order);
        for module in &mut modules {
            module.lessons.sort_by_key(|l| l.order);
        }
        modules
    }
}

/// One completion marker inside a [`Progress`] record.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonMarker {
    pub module_id: String,
    pub lesson_id: String,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub watched_secs: u32,
}

/// Per-user, per-course progress as returned by the remote API.
///
/// The server is authoritative for every field; the client only ever replaces
/// the whole record, except for the certificate fields after issuance.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub id: String,
    pub course_id: String,
    pub completed_lessons: Vec<LessonMarker>,
    /// Aggregate completion, 0 to 100.
    pub percentage: f32,
    pub completed: bool,
    pub certificate_issued: bool,
    pub certificate_url: Option<String>,
    pub certificate_id: Option<String>,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Progress {
    /// Number of markers flagged as completed.
    pub fn completed_count(&self) -> usize {
        self.completed_lessons.iter().filter(|m| m.completed).count()
    }
}

/// Returned by a successful certificate generation.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateGrant {
    pub certificate_url: String,
    pub certificate_id: String,
    pub student_name: String,
    pub course_name: String,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Public verification result for a certificate id.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateVerification {
    pub student_name: String,
    pub student_email: String,
    pub course_name: String,
    pub course_category: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub certificate_id: String,
    pub valid: bool,
}

// Only the name is read; it labels the roster artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(id: &str, order: i32) -> Lesson {
        Lesson {
            id: id.to_string(),
            title: id.to_uppercase(),
            description: None,
            video_url: None,
            duration_secs: None,
            order,
        }
    }

    fn course(content: CourseContent) -> Course {
        Course {
            id: "c1".to_string(),
            title: "Fundamentos".to_string(),
            description: String::new(),
            category: "discipulado".to_string(),
            content,
        }
    }

    #[test]
    fn legacy_lessons_become_one_synthetic_module() {
        let c = course(CourseContent::Lessons(vec![lesson("b", 2), lesson("a", 1)]));
        let modules = c.effective_modules();

        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].id, LEGACY_MODULE_ID);
        assert_eq!(modules[0].title, "Fundamentos");
        let ids: Vec<_> = modules[0].lessons.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn course_without_lessons_has_no_modules() {
        assert!(course(CourseContent::Lessons(vec![])).effective_modules().is_empty());
        assert!(course(CourseContent::Modules(vec![])).effective_modules().is_empty());
    }

    #[test]
    fn modules_and_lessons_are_sorted_by_order() {
        let c = course(CourseContent::Modules(vec![
            Module {
                id: "m2".to_string(),
                title: "Dois".to_string(),
                order: 2,
                lessons: vec![lesson("x", 3), lesson("y", 1)],
            },
            Module {
                id: "m1".to_string(),
                title: "Um".to_string(),
                order: 1,
                lessons: vec![lesson("z", 1)],
            },
        ]));
        let modules = c.effective_modules();

        assert_eq!(modules[0].id, "m1");
        assert_eq!(modules[1].lessons[0].id, "y");
        assert_eq!(modules[1].lessons[1].id, "x");
    }
}
