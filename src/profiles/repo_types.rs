use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LessonMethod {
    Remote,
    #[serde(rename = "In-Person")]
    InPerson,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "Full-Time")]
    FullTime,
    #[serde(rename = "Part-Time")]
    PartTime,
    Contract,
    Freelance,
    Internship,
    #[serde(rename = "Co-op (Cooperative Education)")]
    Coop,
    Volunteer,
    #[serde(rename = "Self-Employed")]
    SelfEmployed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationType {
    #[serde(rename = "On-Site")]
    OnSite,
    Remote,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proficiency {
    #[serde(rename = "Native Speaker")]
    NativeSpeaker,
    Fluent,
    Advanced,
    Intermediate,
    Basic,
    Beginner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthYear {
    pub month: String,
    pub year: i32,
}

/// How an experience entry ends: either a concrete end date or still ongoing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Tenure {
    Ended { month: String, year: i32 },
    Current,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub title: String,
    pub employment_type: Option<EmploymentType>,
    pub company_name: String,
    pub location: Option<String>,
    pub location_type: Option<LocationType>,
    pub start: MonthYear,
    pub tenure: Tenure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub school: String,
    pub degree: Option<String>,
    pub major: String,
    pub start: MonthYear,
    pub end: MonthYear,
    pub gpa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub language: String,
    pub proficiency: Option<Proficiency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub subject: String,
    pub teaching_levels: Option<String>,
}

/// A validated tutor profile body, stored as one JSONB document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorProfileDocument {
    pub first_name: String,
    pub last_name: String,
    pub headline: Option<String>,
    pub experiences: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub languages: Vec<Language>,
    pub hourly_rate: f64,
    pub sex: Sex,
    pub lesson_method: LessonMethod,
    pub lesson_location: Option<String>,
    pub about_me: String,
    pub about_lesson: String,
    pub subjects: Vec<Subject>,
}

#[derive(Debug, FromRow)]
pub struct TutorProfileRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub document: Json<TutorProfileDocument>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorProfile {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[serde(flatten)]
    pub document: TutorProfileDocument,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<TutorProfileRow> for TutorProfile {
    fn from(r: TutorProfileRow) -> Self {
        Self {
            id: r.id,
            owner_id: r.owner_id,
            document: r.document.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
