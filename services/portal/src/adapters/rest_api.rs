//! services/portal/src/adapters/rest_api.rs
//!
//! This module contains the adapter for the remote platform REST API. It
//! implements every port of the `core` crate over HTTP using `reqwest`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ministry_core::domain::{
    CertificateGrant, CertificateVerification, Course, CourseContent, Lesson, LessonMarker,
    Module, Progress, Team,
};
use ministry_core::ports::{
    CertificateService, CourseService, PortError, PortResult, ProgressService, TeamService,
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the platform ports against the remote REST API.
///
/// The adapter is cheap to clone; `with_token` produces a copy that sends the
/// caller's bearer token on every request.
#[derive(Clone)]
pub struct RestApiAdapter {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RestApiAdapter {
    /// Creates a new, unauthenticated `RestApiAdapter`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            token: None,
        })
    }

    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and unwraps the `{ success, data, message, error }`
    /// envelope the platform wraps every response in.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> PortResult<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let status = response.status();
        debug!(%status, what, "remote API responded");

        let body: Envelope<T> = match response.json().await {
            Ok(body) => body,
            Err(e) if status.is_success() => return Err(PortError::Unexpected(e.to_string())),
            Err(_) => Envelope::empty(),
        };
        body.into_result(status, what)
    }
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default = "default_success")]
    success: bool,
    message: Option<String>,
    error: Option<String>,
    data: Option<T>,
}

fn default_success() -> bool {
    true
}

impl<T> Envelope<T> {
    fn empty() -> Self {
        Self {
            success: false,
            message: None,
            error: None,
            data: None,
        }
    }

    fn into_result(self, status: StatusCode, what: &str) -> PortResult<T> {
        let reason = self
            .error
            .or(self.message)
            .unwrap_or_else(|| status.to_string());
        match status {
            StatusCode::NOT_FOUND => return Err(PortError::NotFound(what.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(PortError::Unauthorized)
            }
            s if !s.is_success() => {
                warn!(%status, what, %reason, "remote API call failed");
                return Err(PortError::Unexpected(reason));
            }
            _ => {}
        }
        if !self.success {
            return Err(PortError::Unexpected(reason));
        }
        self.data
            .ok_or_else(|| PortError::Unexpected(format!("{what}: response carried no data")))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LessonRecord {
    #[serde(rename = "_id", default)]
    id: String,
    title: String,
    description: Option<String>,
    video_url: Option<String>,
    video_duration: Option<u32>,
    #[serde(default)]
    order: i32,
}
impl LessonRecord {
    fn to_domain(self) -> Lesson {
        Lesson {
            id: self.id,
            title: self.title,
            description: self.description,
            video_url: self.video_url.filter(|u| !u.trim().is_empty()),
            duration_secs: self.video_duration,
            order: self.order,
        }
    }
}

#[derive(Deserialize)]
struct ModuleRecord {
    #[serde(rename = "_id", default)]
    id: String,
    title: String,
    #[serde(default)]
    order: i32,
    #[serde(default)]
    lessons: Vec<LessonRecord>,
}
impl ModuleRecord {
    fn to_domain(self) -> Module {
        Module {
            id: self.id,
            title: self.title,
            order: self.order,
            lessons: self.lessons.into_iter().map(LessonRecord::to_domain).collect(),
        }
    }
}

#[derive(Deserialize)]
struct CourseRecord {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    modules: Vec<ModuleRecord>,
    #[serde(default)]
    lessons: Vec<LessonRecord>,
}
impl CourseRecord {
    fn to_domain(self) -> Course {
        // Courses created before modules existed only carry a flat lesson list.
        let content = if self.modules.is_empty() {
            CourseContent::Lessons(self.lessons.into_iter().map(LessonRecord::to_domain).collect())
        } else {
            CourseContent::Modules(self.modules.into_iter().map(ModuleRecord::to_domain).collect())
        };
        Course {
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            content,
        }
    }
}

#[derive(Deserialize)]
struct CourseEnvelope {
    course: CourseRecord,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LessonMarkerRecord {
    module_id: String,
    lesson_id: String,
    #[serde(default)]
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    watched_duration: u32,
}
impl LessonMarkerRecord {
    fn to_domain(self) -> LessonMarker {
        LessonMarker {
            module_id: self.module_id,
            lesson_id: self.lesson_id,
            completed: self.completed,
            completed_at: self.completed_at,
            watched_secs: self.watched_duration,
        }
    }
}

/// `course` comes back either as an id or as a populated document.
#[derive(Deserialize)]
#[serde(untagged)]
enum CourseRef {
    Id(String),
    Populated {
        #[serde(rename = "_id")]
        id: String,
    },
}
impl CourseRef {
    fn into_id(self) -> String {
        match self {
            CourseRef::Id(id) | CourseRef::Populated { id } => id,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressRecord {
    #[serde(rename = "_id", default)]
    id: String,
    course: Option<CourseRef>,
    #[serde(default)]
    completed_lessons: Vec<LessonMarkerRecord>,
    #[serde(default)]
    progress: f32,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    certificate_issued: bool,
    certificate_url: Option<String>,
    certificate_id: Option<String>,
    last_accessed_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}
impl ProgressRecord {
    fn to_domain(self, course_id: &str) -> Progress {
        Progress {
            id: self.id,
            course_id: self
                .course
                .map(CourseRef::into_id)
                .unwrap_or_else(|| course_id.to_string()),
            completed_lessons: self
                .completed_lessons
                .into_iter()
                .map(LessonMarkerRecord::to_domain)
                .collect(),
            percentage: self.progress.clamp(0.0, 100.0),
            completed: self.completed,
            certificate_issued: self.certificate_issued,
            certificate_url: self.certificate_url,
            certificate_id: self.certificate_id,
            last_accessed_at: self.last_accessed_at,
            completed_at: self.completed_at,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CertificateRecord {
    certificate_url: String,
    certificate_id: String,
    #[serde(default)]
    student_name: String,
    #[serde(default)]
    course_name: String,
    completed_at: Option<DateTime<Utc>>,
}
impl CertificateRecord {
    fn to_domain(self) -> CertificateGrant {
        CertificateGrant {
            certificate_url: self.certificate_url,
            certificate_id: self.certificate_id,
            student_name: self.student_name,
            course_name: self.course_name,
            completed_at: self.completed_at,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerificationRecord {
    student_name: String,
    #[serde(default)]
    student_email: String,
    course_name: String,
    #[serde(default)]
    course_category: String,
    completed_at: Option<DateTime<Utc>>,
    certificate_id: String,
    #[serde(default)]
    valid: bool,
}
impl VerificationRecord {
    fn to_domain(self) -> CertificateVerification {
        CertificateVerification {
            student_name: self.student_name,
            student_email: self.student_email,
            course_name: self.course_name,
            course_category: self.course_category,
            completed_at: self.completed_at,
            certificate_id: self.certificate_id,
            valid: self.valid,
        }
    }
}

#[derive(Deserialize)]
struct TeamRecord {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    description: Option<String>,
}
impl TeamRecord {
    fn to_domain(self) -> Team {
        Team {
            id: self.id,
            name: self.name,
            description: self.description,
        }
    }
}

//=========================================================================================
// Port Trait Implementations
//=========================================================================================

#[async_trait]
impl CourseService for RestApiAdapter {
    async fn fetch_course(&self, course_id: &str) -> PortResult<Course> {
        let builder = self.request(Method::GET, &format!("/courses/{course_id}"));
        let envelope: CourseEnvelope = self.send(builder, "course").await?;
        Ok(envelope.course.to_domain())
    }
}

#[async_trait]
impl ProgressService for RestApiAdapter {
    async fn fetch_progress(&self, course_id: &str) -> PortResult<Progress> {
        let builder = self.request(Method::GET, &format!("/progress/{course_id}"));
        let record: ProgressRecord = self.send(builder, "progress").await?;
        Ok(record.to_domain(course_id))
    }

    async fn complete_lesson(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_id: &str,
    ) -> PortResult<Progress> {
        let path = format!("/progress/{course_id}/modules/{module_id}/lessons/{lesson_id}/complete");
        let record: ProgressRecord = self.send(self.request(Method::POST, &path), "lesson").await?;
        Ok(record.to_domain(course_id))
    }

    async fn update_watch_time(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_id: &str,
        watched_secs: u32,
    ) -> PortResult<Progress> {
        let path =
            format!("/progress/{course_id}/modules/{module_id}/lessons/{lesson_id}/watch-time");
        let builder = self
            .request(Method::POST, &path)
            .json(&serde_json::json!({ "watchedDuration": watched_secs }));
        let record: ProgressRecord = self.send(builder, "lesson").await?;
        Ok(record.to_domain(course_id))
    }
}

#[async_trait]
impl CertificateService for RestApiAdapter {
    async fn generate_certificate(&self, course_id: &str) -> PortResult<CertificateGrant> {
        let builder = self.request(Method::POST, &format!("/certificates/{course_id}/generate"));
        let record: CertificateRecord = self.send(builder, "course").await?;
        Ok(record.to_domain())
    }

    async fn verify_certificate(
        &self,
        certificate_id: &str,
    ) -> PortResult<CertificateVerification> {
        let builder = self.request(Method::GET, &format!("/certificates/verify/{certificate_id}"));
        let record: VerificationRecord = self.send(builder, "certificate").await?;
        Ok(record.to_domain())
    }
}

#[async_trait]
impl TeamService for RestApiAdapter {
    async fn fetch_team(&self, team_id: &str) -> PortResult<Team> {
        let builder = self.request(Method::GET, &format!("/teams/{team_id}"));
        let record: TeamRecord = self.send(builder, "team").await?;
        Ok(record.to_domain())
    }
}
