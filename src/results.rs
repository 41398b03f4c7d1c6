use crate::config::ScoreCaps;
use crate::grading::{self, CreditHours, Grade, GradeError, PassFailStatus};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResultError {
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("{component} must be between 0 and {max}, got {value}")]
    ScoreOutOfRange {
        component: &'static str,
        value: i64,
        max: i64,
    },
    #[error("total of mid, session and final is out of range")]
    TotalOverflow,
    #[error(transparent)]
    Grade(#[from] GradeError),
    #[error("result already exists for student {registration_number} in course {course_id}")]
    DuplicateResult {
        registration_number: String,
        course_id: String,
    },
    #[error("result not found: {0}")]
    NotFound(String),
    #[error("no results found for student {0}")]
    NoResults(String),
}

/// Two-decimal rounding used for GPA display: half away from zero.
pub fn round_off_2_decimal(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreTriplet {
    pub mid: i64,
    pub session: i64,
    pub final_exam: i64,
}

impl ScoreTriplet {
    pub fn total(&self) -> i64 {
        self.mid
            .saturating_add(self.session)
            .saturating_add(self.final_exam)
    }

    /// Check each component against its cap and return the total.
    pub fn validate(&self, caps: &ScoreCaps) -> Result<i64, ResultError> {
        for (component, value, max) in [
            ("mid", self.mid, caps.mid),
            ("session", self.session, caps.session),
            ("final", self.final_exam, caps.final_exam),
        ] {
            if value < 0 || value > max {
                return Err(ResultError::ScoreOutOfRange {
                    component,
                    value,
                    max,
                });
            }
        }
        self.mid
            .checked_add(self.session)
            .and_then(|s| s.checked_add(self.final_exam))
            .ok_or(ResultError::TotalOverflow)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultInput {
    #[serde(default)]
    pub registration_number: String,
    #[serde(default)]
    pub course_id: String,
    #[serde(default)]
    pub class_id: String,
    #[serde(default)]
    pub teacher_id: String,
    pub credit_hours: i64,
    #[serde(default)]
    pub mid: Option<i64>,
    #[serde(default)]
    pub session: Option<i64>,
    #[serde(default, rename = "final", alias = "Final")]
    pub final_exam: Option<i64>,
}

impl ResultInput {
    pub fn scores(&self) -> ScoreTriplet {
        ScoreTriplet {
            mid: self.mid.unwrap_or(0),
            session: self.session.unwrap_or(0),
            final_exam: self.final_exam.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub id: String,
    pub registration_number: String,
    pub course_id: String,
    pub class_id: String,
    pub teacher_id: String,
    pub credit_hours: CreditHours,
    pub mid: i64,
    pub session: i64,
    #[serde(rename = "final")]
    pub final_exam: i64,
    pub total_marks: i64,
    pub status: PassFailStatus,
    pub quality_point: f64,
    pub grade: Grade,
    pub created_at: String,
}

impl ResultRecord {
    pub fn scores(&self) -> ScoreTriplet {
        ScoreTriplet {
            mid: self.mid,
            session: self.session,
            final_exam: self.final_exam,
        }
    }

    fn same_slot(&self, other: &ResultRecord) -> bool {
        self.registration_number
            .eq_ignore_ascii_case(&other.registration_number)
            && self.course_id == other.course_id
            && self.class_id == other.class_id
            && self.teacher_id == other.teacher_id
    }
}

fn required(value: &str, field: &'static str) -> Result<String, ResultError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ResultError::MissingField(field));
    }
    Ok(v.to_string())
}

/// Validate a submitted result and derive its status, quality point and grade.
pub fn compose(input: &ResultInput, caps: &ScoreCaps) -> Result<ResultRecord, ResultError> {
    let registration_number = required(&input.registration_number, "registrationNumber")?;
    let course_id = required(&input.course_id, "courseId")?;
    let class_id = required(&input.class_id, "classId")?;
    let teacher_id = required(&input.teacher_id, "teacherId")?;

    let credit_hours = CreditHours::try_from(input.credit_hours)?;
    let scores = input.scores();
    let total_marks = scores.validate(caps)?;
    let eval = grading::evaluate(total_marks, credit_hours);
    tracing::debug!(
        %registration_number,
        %course_id,
        total_marks,
        credit_hours = credit_hours.value(),
        grade = %eval.grade,
        "evaluated result"
    );

    Ok(ResultRecord {
        id: Uuid::new_v4().to_string(),
        registration_number,
        course_id,
        class_id,
        teacher_id,
        credit_hours,
        mid: scores.mid,
        session: scores.session,
        final_exam: scores.final_exam,
        total_marks,
        status: eval.status,
        quality_point: eval.quality_point,
        grade: eval.grade,
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultFilter {
    pub student_id: Option<String>,
    pub class_id: Option<String>,
    pub course_id: Option<String>,
}

impl ResultFilter {
    pub fn matches(&self, r: &ResultRecord) -> bool {
        if let Some(s) = &self.student_id {
            if !r.registration_number.eq_ignore_ascii_case(s.trim()) {
                return false;
            }
        }
        if let Some(c) = &self.class_id {
            if r.class_id != *c {
                return false;
            }
        }
        if let Some(c) = &self.course_id {
            if r.course_id != *c {
                return false;
            }
        }
        true
    }
}

/// In-memory result store for the lifetime of the sidecar process.
#[derive(Debug, Default)]
pub struct ResultLedger {
    records: Vec<ResultRecord>,
}

impl ResultLedger {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn add(&mut self, record: ResultRecord) -> Result<&ResultRecord, ResultError> {
        if self.records.iter().any(|r| r.same_slot(&record)) {
            return Err(ResultError::DuplicateResult {
                registration_number: record.registration_number,
                course_id: record.course_id,
            });
        }
        self.records.push(record);
        let idx = self.records.len() - 1;
        Ok(&self.records[idx])
    }

    pub fn list(&self, filter: &ResultFilter) -> Vec<&ResultRecord> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }

    pub fn delete(&mut self, id: &str) -> Result<ResultRecord, ResultError> {
        let Some(idx) = self.records.iter().position(|r| r.id == id) else {
            return Err(ResultError::NotFound(id.to_string()));
        };
        Ok(self.records.remove(idx))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksDetail {
    pub result_id: String,
    pub course_id: String,
    pub class_id: String,
    pub teacher_id: String,
    pub credit_hours: CreditHours,
    pub mid: i64,
    pub session: i64,
    #[serde(rename = "final")]
    pub final_exam: i64,
    pub total_course_marks: i64,
    pub quality_point: f64,
    pub grade: Grade,
    pub status: PassFailStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub student_id: String,
    pub marks_details: Vec<MarksDetail>,
    pub total_marks: i64,
    pub total_credit_hours: i64,
    pub total_quality_points: f64,
    pub gpa: f64,
}

pub fn student_summary(
    student_id: &str,
    records: &[&ResultRecord],
) -> Result<StudentSummary, ResultError> {
    if records.is_empty() {
        return Err(ResultError::NoResults(student_id.to_string()));
    }

    let mut total_marks: i64 = 0;
    let mut total_credit_hours: i64 = 0;
    let mut total_quality_points: f64 = 0.0;
    let mut marks_details = Vec::with_capacity(records.len());

    for r in records {
        let course_marks = r.scores().total();
        total_marks = total_marks.saturating_add(course_marks);
        total_credit_hours += i64::from(r.credit_hours.value());
        total_quality_points += r.quality_point;
        marks_details.push(MarksDetail {
            result_id: r.id.clone(),
            course_id: r.course_id.clone(),
            class_id: r.class_id.clone(),
            teacher_id: r.teacher_id.clone(),
            credit_hours: r.credit_hours,
            mid: r.mid,
            session: r.session,
            final_exam: r.final_exam,
            total_course_marks: course_marks,
            quality_point: r.quality_point,
            grade: r.grade,
            status: r.status,
        });
    }

    let gpa = if total_credit_hours > 0 {
        round_off_2_decimal(total_quality_points / total_credit_hours as f64)
    } else {
        0.0
    };

    Ok(StudentSummary {
        student_id: student_id.to_string(),
        marks_details,
        total_marks,
        total_credit_hours,
        total_quality_points: round_off_2_decimal(total_quality_points),
        gpa,
    })
}
