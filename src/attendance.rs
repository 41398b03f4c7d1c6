use crate::results::round_off_2_decimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Students strictly below this percentage are reported as low attendance.
pub const LOW_ATTENDANCE_PERCENT: f64 = 75.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttendanceError {
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("attendance roll is empty")]
    EmptyRoll,
    #[error("attendance for course {course_id} in class {class_id} on {date} already exists")]
    DuplicateSession {
        course_id: String,
        class_id: String,
        date: String,
    },
    #[error("no students found for class {class_id} and course {course_id}")]
    NoStudents { class_id: String, course_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMark {
    pub student_id: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSubmission {
    #[serde(default)]
    pub course_id: String,
    #[serde(default)]
    pub class_id: String,
    #[serde(default)]
    pub teacher_id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub attendance: Vec<AttendanceMark>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub student_id: String,
    pub course_id: String,
    pub class_id: String,
    pub teacher_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceFilter {
    pub class_id: Option<String>,
    pub course_id: Option<String>,
    pub student_id: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStanding {
    pub student_id: String,
    pub present: usize,
    pub total: usize,
    pub attendance_percentage: f64,
}

fn required(value: &str, field: &'static str) -> Result<String, AttendanceError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(AttendanceError::MissingField(field));
    }
    Ok(v.to_string())
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AttendanceError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AttendanceError::InvalidDate(raw.to_string()))
}

/// Present share of all recorded sessions, rounded to two decimals; 0 with no records.
pub fn attendance_percentage(present: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_off_2_decimal(100.0 * present as f64 / total as f64)
}

pub fn is_low_attendance(percentage: f64) -> bool {
    percentage < LOW_ATTENDANCE_PERCENT
}

/// In-memory attendance store for the lifetime of the sidecar process.
#[derive(Debug, Default)]
pub struct AttendanceLedger {
    entries: Vec<AttendanceEntry>,
}

impl AttendanceLedger {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Record one roll call. A (course, class, teacher, date) session is taken once.
    pub fn submit(
        &mut self,
        sub: &AttendanceSubmission,
    ) -> Result<Vec<&AttendanceEntry>, AttendanceError> {
        let course_id = required(&sub.course_id, "courseId")?;
        let class_id = required(&sub.class_id, "classId")?;
        let teacher_id = required(&sub.teacher_id, "teacherId")?;
        let date = parse_date(&sub.date)?;
        if sub.attendance.is_empty() {
            return Err(AttendanceError::EmptyRoll);
        }
        let mut student_ids = Vec::with_capacity(sub.attendance.len());
        for mark in &sub.attendance {
            student_ids.push(required(&mark.student_id, "studentId")?);
        }

        let taken = self.entries.iter().any(|e| {
            e.course_id == course_id
                && e.class_id == class_id
                && e.teacher_id == teacher_id
                && e.date == date
        });
        if taken {
            return Err(AttendanceError::DuplicateSession {
                course_id,
                class_id,
                date: date.to_string(),
            });
        }

        let start = self.entries.len();
        for (student_id, mark) in student_ids.into_iter().zip(&sub.attendance) {
            self.entries.push(AttendanceEntry {
                student_id,
                course_id: course_id.clone(),
                class_id: class_id.clone(),
                teacher_id: teacher_id.clone(),
                date,
                status: mark.status,
            });
        }
        Ok(self.entries[start..].iter().collect())
    }

    pub fn list(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<&AttendanceEntry>, AttendanceError> {
        let date = filter.date.as_deref().map(parse_date).transpose()?;
        Ok(self
            .entries
            .iter()
            .filter(|e| filter.class_id.as_ref().map_or(true, |c| e.class_id == *c))
            .filter(|e| filter.course_id.as_ref().map_or(true, |c| e.course_id == *c))
            .filter(|e| filter.student_id.as_ref().map_or(true, |s| e.student_id == *s))
            .filter(|e| date.map_or(true, |d| e.date == d))
            .collect())
    }

    /// Attendance percentage per student for one class and course.
    ///
    /// `roster` lists enrolled students; any of them without records stands at 0%.
    /// Students with records but missing from the roster are appended in first-seen order.
    pub fn standings(
        &self,
        class_id: &str,
        course_id: &str,
        roster: &[String],
    ) -> Result<Vec<AttendanceStanding>, AttendanceError> {
        let mut order: Vec<String> = roster.to_vec();
        let scoped: Vec<&AttendanceEntry> = self
            .entries
            .iter()
            .filter(|e| e.class_id == class_id && e.course_id == course_id)
            .collect();
        for e in &scoped {
            if !order.contains(&e.student_id) {
                order.push(e.student_id.clone());
            }
        }
        if order.is_empty() {
            return Err(AttendanceError::NoStudents {
                class_id: class_id.to_string(),
                course_id: course_id.to_string(),
            });
        }

        Ok(order
            .into_iter()
            .map(|student_id| {
                let (present, total) = scoped
                    .iter()
                    .filter(|e| e.student_id == student_id)
                    .fold((0, 0), |(p, t), e| {
                        (p + usize::from(e.status == AttendanceStatus::Present), t + 1)
                    });
                AttendanceStanding {
                    attendance_percentage: attendance_percentage(present, total),
                    student_id,
                    present,
                    total,
                }
            })
            .collect())
    }

    pub fn low_attendance(
        &self,
        class_id: &str,
        course_id: &str,
        roster: &[String],
    ) -> Result<Vec<AttendanceStanding>, AttendanceError> {
        let mut all = self.standings(class_id, course_id, roster)?;
        all.retain(|s| is_low_attendance(s.attendance_percentage));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roll(date: &str, marks: &[(&str, AttendanceStatus)]) -> AttendanceSubmission {
        AttendanceSubmission {
            course_id: "CS-301".to_string(),
            class_id: "BSCS-5A".to_string(),
            teacher_id: "teacher-7".to_string(),
            date: date.to_string(),
            attendance: marks
                .iter()
                .map(|(s, st)| AttendanceMark {
                    student_id: s.to_string(),
                    status: *st,
                })
                .collect(),
        }
    }

    #[test]
    fn second_roll_for_same_date_is_rejected() {
        let mut ledger = AttendanceLedger::default();
        ledger
            .submit(&roll("2024-03-04", &[("r1", AttendanceStatus::Present)]))
            .expect("first roll");
        let dup = ledger.submit(&roll("2024-03-04", &[("r2", AttendanceStatus::Absent)]));
        assert_eq!(
            dup,
            Err(AttendanceError::DuplicateSession {
                course_id: "CS-301".to_string(),
                class_id: "BSCS-5A".to_string(),
                date: "2024-03-04".to_string(),
            })
        );
        ledger
            .submit(&roll("2024-03-05", &[("r1", AttendanceStatus::Absent)]))
            .expect("next day");
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn submit_validates_input() {
        let mut ledger = AttendanceLedger::default();
        assert_eq!(
            ledger.submit(&roll("04-03-2024", &[("r1", AttendanceStatus::Present)])),
            Err(AttendanceError::InvalidDate("04-03-2024".to_string()))
        );
        assert_eq!(ledger.submit(&roll("2024-03-04", &[])), Err(AttendanceError::EmptyRoll));
        let mut no_course = roll("2024-03-04", &[("r1", AttendanceStatus::Present)]);
        no_course.course_id.clear();
        assert_eq!(
            ledger.submit(&no_course),
            Err(AttendanceError::MissingField("courseId"))
        );
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn no_records_counts_as_zero_percent() {
        let ledger = AttendanceLedger::default();
        assert_eq!(attendance_percentage(0, 0), 0.0);
        let low = ledger
            .low_attendance("BSCS-5A", "CS-301", &["r9".to_string()])
            .expect("standings");
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].student_id, "r9");
        assert_eq!(low[0].attendance_percentage, 0.0);
        assert_eq!(low[0].total, 0);
    }

    #[test]
    fn low_attendance_boundary_is_strict() {
        assert!(is_low_attendance(74.99));
        assert!(!is_low_attendance(75.00));
        assert_eq!(attendance_percentage(3, 4), 75.0);
        assert_eq!(attendance_percentage(2, 3), 66.67);
        assert_eq!(attendance_percentage(299, 400), 74.75);
    }

    #[test]
    fn standings_follow_recorded_sessions() {
        use AttendanceStatus::{Absent, Present};
        let mut ledger = AttendanceLedger::default();
        for (date, r2) in [
            ("2024-03-04", Present),
            ("2024-03-05", Present),
            ("2024-03-06", Absent),
            ("2024-03-07", Present),
        ] {
            ledger
                .submit(&roll(date, &[("r1", Present), ("r2", r2), ("r3", Absent)]))
                .expect("roll");
        }

        let all = ledger
            .standings("BSCS-5A", "CS-301", &["r1".to_string()])
            .expect("standings");
        let pct: Vec<(&str, f64)> = all
            .iter()
            .map(|s| (s.student_id.as_str(), s.attendance_percentage))
            .collect();
        assert_eq!(pct, vec![("r1", 100.0), ("r2", 75.0), ("r3", 0.0)]);

        let low = ledger.low_attendance("BSCS-5A", "CS-301", &[]).expect("low");
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].student_id, "r3");

        assert_eq!(
            ledger.low_attendance("BSCS-5B", "CS-301", &[]),
            Err(AttendanceError::NoStudents {
                class_id: "BSCS-5B".to_string(),
                course_id: "CS-301".to_string(),
            })
        );
    }

    #[test]
    fn list_filters_by_date_and_student() {
        let mut ledger = AttendanceLedger::default();
        ledger
            .submit(&roll(
                "2024-03-04",
                &[("r1", AttendanceStatus::Present), ("r2", AttendanceStatus::Absent)],
            ))
            .expect("roll");
        ledger
            .submit(&roll("2024-03-05", &[("r1", AttendanceStatus::Absent)]))
            .expect("roll");

        let day = AttendanceFilter {
            date: Some("2024-03-04".to_string()),
            ..Default::default()
        };
        assert_eq!(ledger.list(&day).expect("list").len(), 2);
        let r1 = AttendanceFilter {
            student_id: Some("r1".to_string()),
            ..Default::default()
        };
        assert_eq!(ledger.list(&r1).expect("list").len(), 2);
        let bad = AttendanceFilter {
            date: Some("yesterday".to_string()),
            ..Default::default()
        };
        assert!(ledger.list(&bad).is_err());
    }
}
