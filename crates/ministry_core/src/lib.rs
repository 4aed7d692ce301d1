pub mod domain;
pub mod gate;
pub mod ports;
pub mod roster;
pub mod video;
pub mod viewer;

pub use domain::{
    CertificateGrant, CertificateVerification, Course, CourseContent, Lesson, LessonMarker,
    Module, Progress, Team,
};
pub use gate::{LessonPosition, LessonState};
pub use ports::{
    CertificateService, CourseService, PortError, PortResult, ProgressService, TeamService,
};
pub use roster::{RosterComposer, RosterError};
pub use viewer::{CompletionOutcome, CourseViewer, ViewerError};
