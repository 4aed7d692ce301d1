//! crates/ministry_core/src/viewer.rs
//!
//! The course viewer: holds a loaded course, the server's progress record and
//! the "current lesson" pointer, and drives sequential consumption through the
//! gate.
//!
//! No operation mutates local state before the remote call succeeds. A failed
//! call leaves the viewer exactly as it was.

use tracing::{debug, info};

use crate::domain::{CertificateGrant, Course, Lesson, Module, Progress};
use crate::gate::{self, LessonPosition, LessonState};
use crate::ports::{CertificateService, CourseService, PortError, ProgressService};

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("Complete the previous lesson to unlock this one")]
    LessonLocked,
    #[error("No lesson at module {0}, position {1}")]
    NoSuchLesson(usize, usize),
    #[error("The course has no lessons")]
    NoCurrentLesson,
    #[error("Certificate is not available for this course")]
    CertificateUnavailable,
    #[error("This lesson has no identifier and cannot be tracked")]
    UntrackableLesson,
    #[error(transparent)]
    Port(#[from] PortError),
}

/// Result of a successful lesson completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    /// Where the pointer moved to, `None` when the course was already at its end.
    pub advanced_to: Option<LessonPosition>,
    /// Raised once when this completion finished the course and no certificate
    /// exists yet.
    pub course_finished: bool,
}

#[derive(Debug, Clone)]
pub struct CourseViewer {
    course: Course,
    modules: Vec<Module>,
    progress: Progress,
    current: Option<LessonPosition>,
}

impl CourseViewer {
    pub fn new(course: Course, progress: Progress) -> Self {
        let modules = course.effective_modules();
        let current = gate::first_position(&modules);
        Self {
            course,
            modules,
            progress,
            current,
        }
    }

    /// Fetches the course and the caller's progress concurrently.
    pub async fn load(
        courses: &dyn CourseService,
        progress: &dyn ProgressService,
        course_id: &str,
    ) -> Result<Self, PortError> {
        let (course, progress) = futures::try_join!(
            courses.fetch_course(course_id),
            progress.fetch_progress(course_id)
        )?;
        debug!(course_id, lessons = progress.completed_count(), "course viewer loaded");
        Ok(Self::new(course, progress))
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn current(&self) -> Option<LessonPosition> {
        self.current
    }

    pub fn current_lesson(&self) -> Option<(&Module, &Lesson)> {
        let pos = self.current?;
        let module = self.modules.get(pos.module)?;
        Some((module, module.lessons.get(pos.lesson)?))
    }

    pub fn gate_map(&self) -> Vec<Vec<LessonState>> {
        gate::gate_map(&self.modules, &self.progress)
    }

    pub fn is_current_completed(&self) -> bool {
        self.current_lesson()
            .map(|(m, l)| gate::is_lesson_completed(&self.progress, &m.id, &l.id))
            .unwrap_or(false)
    }

    pub fn certificate_available(&self) -> bool {
        gate::certificate_available(&self.progress)
    }

    /// Moves the pointer to `pos`. Locked lessons are rejected and leave the
    /// pointer untouched.
    pub fn select(&mut self, pos: LessonPosition) -> Result<(), ViewerError> {
        let exists = self
            .modules
            .get(pos.module)
            .is_some_and(|m| pos.lesson < m.lessons.len());
        if !exists {
            return Err(ViewerError::NoSuchLesson(pos.module, pos.lesson));
        }
        if !gate::is_unlocked(&self.modules, &self.progress, pos) {
            return Err(ViewerError::LessonLocked);
        }
        self.current = Some(pos);
        Ok(())
    }

    /// Completes the current lesson on the server, adopts the returned progress
    /// and advances the pointer.
    pub async fn complete_current(
        &mut self,
        service: &dyn ProgressService,
    ) -> Result<CompletionOutcome, ViewerError> {
        let pos = self.current.ok_or(ViewerError::NoCurrentLesson)?;
        if !gate::is_unlocked(&self.modules, &self.progress, pos) {
            return Err(ViewerError::LessonLocked);
        }
        let module = &self.modules[pos.module];
        let lesson = &module.lessons[pos.lesson];
        if module.id.is_empty() || lesson.id.is_empty() {
            return Err(ViewerError::UntrackableLesson);
        }

        let updated = service
            .complete_lesson(&self.course.id, &module.id, &lesson.id)
            .await?;
        info!(
            course_id = %self.course.id,
            module_id = %module.id,
            lesson_id = %lesson.id,
            percentage = updated.percentage,
            "lesson completed"
        );

        let course_finished = updated.completed && !updated.certificate_issued;
        self.progress = updated;

        let advanced_to = gate::next_position(&self.modules, pos);
        if let Some(next) = advanced_to {
            self.current = Some(next);
        }

        Ok(CompletionOutcome {
            advanced_to,
            course_finished,
        })
    }

    /// Reports how long the current lesson's video has been watched.
    pub async fn record_watch_time(
        &mut self,
        service: &dyn ProgressService,
        watched_secs: u32,
    ) -> Result<(), ViewerError> {
        let (module, lesson) = self.current_lesson().ok_or(ViewerError::NoCurrentLesson)?;
        if module.id.is_empty() || lesson.id.is_empty() {
            return Err(ViewerError::UntrackableLesson);
        }
        let updated = service
            .update_watch_time(&self.course.id, &module.id, &lesson.id, watched_secs)
            .await?;
        self.progress = updated;
        Ok(())
    }

    /// Issues the certificate. The caller must not offer this once issued;
    /// there is no deduplication beyond the availability check.
    pub async fn issue_certificate(
        &mut self,
        service: &dyn CertificateService,
    ) -> Result<CertificateGrant, ViewerError> {
        if !self.certificate_available() {
            return Err(ViewerError::CertificateUnavailable);
        }
        let grant = service.generate_certificate(&self.course.id).await?;
        info!(
            course_id = %self.course.id,
            certificate_id = %grant.certificate_id,
            "certificate issued"
        );

        self.progress.certificate_issued = true;
        self.progress.certificate_url = Some(grant.certificate_url.clone());
        self.progress.certificate_id = Some(grant.certificate_id.clone());
        Ok(grant)
    }
}
