use serde::Deserialize;

use crate::profiles::repo_types::{
    EmploymentType, LessonMethod, LocationType, Proficiency, Sex,
};

// Every field is optional on the wire; absence is reported by the validator
// as a field error.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceRequest {
    pub title: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub location_type: Option<LocationType>,
    pub start_date_month: Option<String>,
    pub start_date_year: Option<i32>,
    pub end_date_month: Option<String>,
    pub end_date_year: Option<i32>,
    pub currently_working: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationRequest {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub major: Option<String>,
    pub start_date_month: Option<String>,
    pub start_date_year: Option<i32>,
    pub end_date_month: Option<String>,
    pub end_date_year: Option<i32>,
    pub gpa: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguageRequest {
    pub language: Option<String>,
    pub proficiency: Option<Proficiency>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRequest {
    pub subject: Option<String>,
    pub teaching_levels: Option<String>,
}

/// Body of `POST /tutor-profiles` and `PUT /tutor-profiles/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub headline: Option<String>,
    #[serde(default)]
    pub experiences: Vec<ExperienceRequest>,
    #[serde(default)]
    pub education: Vec<EducationRequest>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub languages: Vec<LanguageRequest>,
    pub hourly_rate: Option<f64>,
    pub sex: Option<Sex>,
    pub lesson_method: Option<LessonMethod>,
    pub lesson_location: Option<String>,
    pub about_me: Option<String>,
    pub about_lesson: Option<String>,
    #[serde(default)]
    pub subjects: Vec<SubjectRequest>,
}
