//! Tutor profile write pipeline: `normalize`, then `validate`, then build the
//! typed document. `prepare` runs all three.
//!
//! Normalization trims strings, drops blank optional strings and clears
//! `lessonLocation` for remote lessons. Validation never mutates its input.

use crate::error::{AppError, FieldError};
use crate::profiles::dto::{
    EducationRequest, ExperienceRequest, LanguageRequest, SubjectRequest, TutorProfileRequest,
};
use crate::profiles::repo_types::{
    Education, Experience, Language, LessonMethod, MonthYear, Subject, Tenure,
    TutorProfileDocument,
};

const EITHER_END_OR_CURRENT: &str =
    "provide either an end date or indicate that you are currently working";

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn normalize(req: TutorProfileRequest) -> TutorProfileRequest {
    let lesson_location = match req.lesson_method {
        Some(LessonMethod::Remote) => None,
        _ => clean(req.lesson_location),
    };

    TutorProfileRequest {
        first_name: clean(req.first_name),
        last_name: clean(req.last_name),
        headline: clean(req.headline),
        experiences: req
            .experiences
            .into_iter()
            .map(|e| ExperienceRequest {
                title: clean(e.title),
                company_name: clean(e.company_name),
                location: clean(e.location),
                start_date_month: clean(e.start_date_month),
                end_date_month: clean(e.end_date_month),
                ..e
            })
            .collect(),
        education: req
            .education
            .into_iter()
            .map(|e| EducationRequest {
                school: clean(e.school),
                degree: clean(e.degree),
                major: clean(e.major),
                start_date_month: clean(e.start_date_month),
                end_date_month: clean(e.end_date_month),
                ..e
            })
            .collect(),
        skills: req.skills.into_iter().map(|s| s.trim().to_string()).collect(),
        languages: req
            .languages
            .into_iter()
            .map(|l| LanguageRequest {
                language: clean(l.language),
                ..l
            })
            .collect(),
        subjects: req
            .subjects
            .into_iter()
            .map(|s| SubjectRequest {
                subject: clean(s.subject),
                teaching_levels: clean(s.teaching_levels),
            })
            .collect(),
        lesson_location,
        about_me: clean(req.about_me),
        about_lesson: clean(req.about_lesson),
        ..req
    }
}

/// Every rule violation in a (normalized) request; empty when it is valid.
pub fn validate(req: &TutorProfileRequest) -> Vec<FieldError> {
    build(req).err().unwrap_or_default()
}

pub fn prepare(req: TutorProfileRequest) -> Result<TutorProfileDocument, AppError> {
    build(&normalize(req)).map_err(AppError::Validation)
}

#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn required<T: Clone>(&mut self, field: impl Into<String>, value: &Option<T>) -> Option<T> {
        if value.is_none() {
            self.errors.push(FieldError::new(field, "is required"));
        }
        value.clone()
    }

    fn fail(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.errors.push(FieldError::new(field, reason));
    }

    fn month_year(
        &mut self,
        prefix: &str,
        month: &Option<String>,
        year: &Option<i32>,
        which: &str,
    ) -> Option<MonthYear> {
        let month = self.required(format!("{prefix}.{which}DateMonth"), month);
        let year = self.required(format!("{prefix}.{which}DateYear"), year);
        Some(MonthYear {
            month: month?,
            year: year?,
        })
    }

    fn experience(&mut self, i: usize, e: &ExperienceRequest) -> Option<Experience> {
        let prefix = format!("experiences[{i}]");
        let title = self.required(format!("{prefix}.title"), &e.title);
        let company_name = self.required(format!("{prefix}.companyName"), &e.company_name);
        let start = self.month_year(&prefix, &e.start_date_month, &e.start_date_year, "start");

        let has_end_date = e.end_date_month.is_some() || e.end_date_year.is_some();
        let is_current = e.currently_working == Some(true);
        let tenure = if has_end_date == is_current {
            self.fail(prefix.clone(), EITHER_END_OR_CURRENT);
            None
        } else if is_current {
            Some(Tenure::Current)
        } else {
            self.month_year(&prefix, &e.end_date_month, &e.end_date_year, "end")
                .map(|end| Tenure::Ended {
                    month: end.month,
                    year: end.year,
                })
        };

        Some(Experience {
            title: title?,
            employment_type: e.employment_type,
            company_name: company_name?,
            location: e.location.clone(),
            location_type: e.location_type,
            start: start?,
            tenure: tenure?,
        })
    }

    fn education(&mut self, i: usize, e: &EducationRequest) -> Option<Education> {
        let prefix = format!("education[{i}]");
        let school = self.required(format!("{prefix}.school"), &e.school);
        let major = self.required(format!("{prefix}.major"), &e.major);
        let start = self.month_year(&prefix, &e.start_date_month, &e.start_date_year, "start");
        let end = self.month_year(&prefix, &e.end_date_month, &e.end_date_year, "end");
        if e.gpa.is_some_and(|g| !g.is_finite() || g < 0.0) {
            self.fail(format!("{prefix}.gpa"), "must be a non-negative number");
        }
        Some(Education {
            school: school?,
            degree: e.degree.clone(),
            major: major?,
            start: start?,
            end: end?,
            gpa: e.gpa,
        })
    }
}

fn build(req: &TutorProfileRequest) -> Result<TutorProfileDocument, Vec<FieldError>> {
    let mut c = Checker::default();

    let first_name = c.required("firstName", &req.first_name);
    let last_name = c.required("lastName", &req.last_name);
    let sex = c.required("sex", &req.sex);
    let about_me = c.required("aboutMe", &req.about_me);
    let about_lesson = c.required("aboutLesson", &req.about_lesson);

    let hourly_rate = c.required("hourlyRate", &req.hourly_rate);
    if hourly_rate.is_some_and(|r| !r.is_finite() || r < 0.0) {
        c.fail("hourlyRate", "must be a non-negative number");
    }

    let lesson_method = c.required("lessonMethod", &req.lesson_method);
    if matches!(lesson_method, Some(m) if m != LessonMethod::Remote) {
        c.required("lessonLocation", &req.lesson_location);
    }

    let experiences: Vec<Option<Experience>> = req
        .experiences
        .iter()
        .enumerate()
        .map(|(i, e)| c.experience(i, e))
        .collect();

    if req.education.is_empty() {
        c.fail("education", "at least one entry is required");
    }
    let education: Vec<Option<Education>> = req
        .education
        .iter()
        .enumerate()
        .map(|(i, e)| c.education(i, e))
        .collect();

    for (i, skill) in req.skills.iter().enumerate() {
        if skill.is_empty() {
            c.fail(format!("skills[{i}]"), "is required");
        }
    }

    if req.languages.is_empty() {
        c.fail("languages", "at least one entry is required");
    }
    let languages: Vec<Option<Language>> = req
        .languages
        .iter()
        .enumerate()
        .map(|(i, l)| {
            let language = c.required(format!("languages[{i}].language"), &l.language)?;
            Some(Language {
                language,
                proficiency: l.proficiency,
            })
        })
        .collect();

    let subjects: Vec<Option<Subject>> = req
        .subjects
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let subject = c.required(format!("subjects[{i}].subject"), &s.subject)?;
            Some(Subject {
                subject,
                teaching_levels: s.teaching_levels.clone(),
            })
        })
        .collect();

    if !c.errors.is_empty() {
        return Err(c.errors);
    }

    let document = (|| {
        Some(TutorProfileDocument {
            first_name: first_name?,
            last_name: last_name?,
            headline: req.headline.clone(),
            experiences: experiences.into_iter().collect::<Option<Vec<_>>>()?,
            education: education.into_iter().collect::<Option<Vec<_>>>()?,
            skills: req.skills.clone(),
            languages: languages.into_iter().collect::<Option<Vec<_>>>()?,
            hourly_rate: hourly_rate?,
            sex: sex?,
            lesson_method: lesson_method?,
            lesson_location: match lesson_method? {
                LessonMethod::Remote => None,
                _ => req.lesson_location.clone(),
            },
            about_me: about_me?,
            about_lesson: about_lesson?,
            subjects: subjects.into_iter().collect::<Option<Vec<_>>>()?,
        })
    })();
    document.ok_or_else(|| vec![FieldError::new("body", "incomplete tutor profile")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::repo_types::{Proficiency, Sex};

    fn experience(end: Option<(&str, i32)>, current: Option<bool>) -> ExperienceRequest {
        ExperienceRequest {
            title: Some("Math Teacher".into()),
            company_name: Some("Riverside High".into()),
            start_date_month: Some("September".into()),
            start_date_year: Some(2018),
            end_date_month: end.map(|(m, _)| m.to_string()),
            end_date_year: end.map(|(_, y)| y),
            currently_working: current,
            ..Default::default()
        }
    }

    fn valid_request() -> TutorProfileRequest {
        TutorProfileRequest {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            headline: Some("Patient maths tutor".into()),
            experiences: vec![experience(Some(("June", 2021)), None)],
            education: vec![EducationRequest {
                school: Some("University of London".into()),
                major: Some("Mathematics".into()),
                start_date_month: Some("October".into()),
                start_date_year: Some(2014),
                end_date_month: Some("June".into()),
                end_date_year: Some(2017),
                ..Default::default()
            }],
            skills: vec!["Algebra".into(), "Calculus".into()],
            languages: vec![LanguageRequest {
                language: Some("English".into()),
                proficiency: Some(Proficiency::NativeSpeaker),
            }],
            hourly_rate: Some(45.0),
            sex: Some(Sex::Female),
            lesson_method: Some(LessonMethod::InPerson),
            lesson_location: Some("London".into()),
            about_me: Some("I love numbers.".into()),
            about_lesson: Some("Worked examples first.".into()),
            subjects: vec![SubjectRequest {
                subject: Some("Mathematics".into()),
                teaching_levels: Some("GCSE, A-Level".into()),
            }],
        }
    }

    fn fields(req: TutorProfileRequest) -> Vec<String> {
        match prepare(req) {
            Ok(_) => Vec::new(),
            Err(AppError::Validation(errors)) => errors.into_iter().map(|e| e.field).collect(),
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn valid_profile_passes() {
        let doc = prepare(valid_request()).unwrap();
        assert_eq!(doc.first_name, "Ada");
        assert_eq!(doc.lesson_location.as_deref(), Some("London"));
        assert_eq!(
            doc.experiences[0].tenure,
            Tenure::Ended {
                month: "June".into(),
                year: 2021
            }
        );
    }

    #[test]
    fn experience_needs_exactly_one_of_end_date_or_current() {
        let cases = [
            (Some(("June", 2021)), None, true),
            (Some(("June", 2021)), Some(false), true),
            (None, Some(true), true),
            (Some(("June", 2021)), Some(true), false),
            (None, None, false),
            (None, Some(false), false),
        ];
        for (end, current, ok) in cases {
            let mut req = valid_request();
            req.experiences = vec![experience(end, current)];
            let errs = fields(req);
            assert_eq!(errs.is_empty(), ok, "end={end:?} current={current:?} -> {errs:?}");
            if !ok {
                assert_eq!(errs, ["experiences[0]"]);
            }
        }
    }

    #[test]
    fn half_an_end_date_counts_as_an_end_date() {
        let mut req = valid_request();
        let mut e = experience(None, Some(true));
        e.end_date_year = Some(2020);
        req.experiences = vec![e];
        assert_eq!(fields(req), ["experiences[0]"]);

        let mut req = valid_request();
        let mut e = experience(None, None);
        e.end_date_year = Some(2020);
        req.experiences = vec![e];
        assert_eq!(fields(req), ["experiences[0].endDateMonth"]);
    }

    #[test]
    fn current_experience_becomes_current_tenure() {
        let mut req = valid_request();
        req.experiences = vec![experience(None, Some(true))];
        let doc = prepare(req).unwrap();
        assert_eq!(doc.experiences[0].tenure, Tenure::Current);
    }

    #[test]
    fn entries_are_checked_independently() {
        let mut req = valid_request();
        req.experiences = vec![
            experience(None, Some(true)),
            experience(None, None),
            experience(Some(("May", 2019)), Some(true)),
        ];
        assert_eq!(fields(req), ["experiences[1]", "experiences[2]"]);
    }

    #[test]
    fn education_and_languages_must_be_non_empty() {
        let mut req = valid_request();
        req.education.clear();
        assert_eq!(fields(req), ["education"]);

        let mut req = valid_request();
        req.languages.clear();
        assert_eq!(fields(req), ["languages"]);
    }

    #[test]
    fn education_entry_requires_dates_school_and_major() {
        let mut req = valid_request();
        req.education = vec![EducationRequest {
            degree: Some("BSc".into()),
            ..Default::default()
        }];
        assert_eq!(
            fields(req),
            [
                "education[0].school",
                "education[0].major",
                "education[0].startDateMonth",
                "education[0].startDateYear",
                "education[0].endDateMonth",
                "education[0].endDateYear",
            ]
        );
    }

    #[test]
    fn remote_lessons_clear_location() {
        let mut req = valid_request();
        req.lesson_method = Some(LessonMethod::Remote);
        req.lesson_location = Some("London".into());

        let normalized = normalize(req.clone());
        assert!(normalized.lesson_location.is_none());
        assert!(validate(&normalized).is_empty());

        let doc = prepare(req).unwrap();
        assert!(doc.lesson_location.is_none());
    }

    #[test]
    fn non_remote_lessons_need_location() {
        for method in [LessonMethod::InPerson, LessonMethod::Hybrid] {
            let mut req = valid_request();
            req.lesson_method = Some(method);
            req.lesson_location = Some("   ".into());
            assert_eq!(fields(req), ["lessonLocation"]);
        }
    }

    #[test]
    fn validate_does_not_mutate_or_clear() {
        let mut req = valid_request();
        req.lesson_method = Some(LessonMethod::Remote);
        req.lesson_location = Some("London".into());
        assert!(validate(&req).is_empty());
        assert_eq!(req.lesson_location.as_deref(), Some("London"));
    }

    #[test]
    fn required_scalars_are_reported() {
        let mut req = valid_request();
        req.hourly_rate = None;
        req.about_me = Some("  ".into());
        req.about_lesson = None;
        assert_eq!(fields(req), ["aboutMe", "aboutLesson", "hourlyRate"]);

        let mut req = valid_request();
        req.hourly_rate = Some(-5.0);
        assert_eq!(fields(req), ["hourlyRate"]);
    }

    #[test]
    fn strings_are_trimmed() {
        let mut req = valid_request();
        req.first_name = Some("  Ada  ".into());
        req.skills = vec!["  Algebra ".into()];
        let doc = prepare(req).unwrap();
        assert_eq!(doc.first_name, "Ada");
        assert_eq!(doc.skills, ["Algebra"]);
    }

    #[test]
    fn blank_skill_and_subject_are_rejected() {
        let mut req = valid_request();
        req.skills.push(" ".into());
        req.subjects.push(SubjectRequest::default());
        assert_eq!(fields(req), ["skills[2]", "subjects[1].subject"]);
    }
}
