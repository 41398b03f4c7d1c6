use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradeError {
    #[error("unsupported credit hours: {0} (expected 1..=6)")]
    InvalidCreditHours(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "i64")]
pub enum CreditHours {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
}

impl CreditHours {
    pub const ALL: [CreditHours; 6] = [
        CreditHours::One,
        CreditHours::Two,
        CreditHours::Three,
        CreditHours::Four,
        CreditHours::Five,
        CreditHours::Six,
    ];

    pub fn value(self) -> u8 {
        match self {
            CreditHours::One => 1,
            CreditHours::Two => 2,
            CreditHours::Three => 3,
            CreditHours::Four => 4,
            CreditHours::Five => 5,
            CreditHours::Six => 6,
        }
    }

    pub fn rule(self) -> &'static GradingRule {
        &RULES[usize::from(self.value()) - 1]
    }
}

impl TryFrom<i64> for CreditHours {
    type Error = GradeError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(CreditHours::One),
            2 => Ok(CreditHours::Two),
            3 => Ok(CreditHours::Three),
            4 => Ok(CreditHours::Four),
            5 => Ok(CreditHours::Five),
            6 => Ok(CreditHours::Six),
            other => Err(GradeError::InvalidCreditHours(other)),
        }
    }
}

impl From<CreditHours> for u8 {
    fn from(ch: CreditHours) -> u8 {
        ch.value()
    }
}

impl fmt::Display for CreditHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassFailStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    F,
    D,
    C,
    B,
    A,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grading policy for one credit-hour weight.
///
/// `steps` is sorted ascending by minimum marks; a total maps to the quality
/// point of the highest key not above it.
#[derive(Debug, Clone)]
pub struct GradingRule {
    pub pass_threshold: i64,
    /// Minimum quality point for A, B, C and D respectively.
    pub breakpoints: [f64; 4],
    pub steps: &'static [(i64, f64)],
}

impl GradingRule {
    pub fn max_quality_point(&self) -> f64 {
        self.steps.last().map(|&(_, qp)| qp).unwrap_or(0.0)
    }

    pub fn status(&self, total_marks: i64) -> PassFailStatus {
        if total_marks > self.pass_threshold {
            PassFailStatus::Pass
        } else {
            PassFailStatus::Fail
        }
    }

    pub fn quality_point(&self, total_marks: i64) -> f64 {
        let idx = self.steps.partition_point(|&(min, _)| min <= total_marks);
        if idx == 0 {
            0.0
        } else {
            self.steps[idx - 1].1
        }
    }

    pub fn grade(&self, quality_point: f64) -> Grade {
        let [a, b, c, d] = self.breakpoints;
        if quality_point >= a {
            Grade::A
        } else if quality_point >= b {
            Grade::B
        } else if quality_point >= c {
            Grade::C
        } else if quality_point >= d {
            Grade::D
        } else {
            Grade::F
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub status: PassFailStatus,
    pub quality_point: f64,
    pub grade: Grade,
}

pub fn evaluate(total_marks: i64, credit_hours: CreditHours) -> Evaluation {
    let rule = credit_hours.rule();
    let quality_point = rule.quality_point(total_marks);
    Evaluation {
        status: rule.status(total_marks),
        quality_point,
        grade: rule.grade(quality_point),
    }
}

/// Same as [`evaluate`] for a raw credit-hour value as stored on a course.
pub fn evaluate_raw(total_marks: i64, credit_hours: i64) -> Result<Evaluation, GradeError> {
    let ch = CreditHours::try_from(credit_hours)?;
    Ok(evaluate(total_marks, ch))
}

static RULES: [GradingRule; 6] = [
    GradingRule {
        pass_threshold: 8,
        breakpoints: [4.00, 3.00, 2.00, 1.00],
        steps: &STEPS_1,
    },
    GradingRule {
        pass_threshold: 16,
        breakpoints: [8.00, 6.00, 4.00, 2.00],
        steps: &STEPS_2,
    },
    GradingRule {
        pass_threshold: 24,
        breakpoints: [12.00, 9.00, 6.00, 3.00],
        steps: &STEPS_3,
    },
    GradingRule {
        pass_threshold: 32,
        breakpoints: [16.00, 12.00, 8.00, 4.00],
        steps: &STEPS_4,
    },
    GradingRule {
        pass_threshold: 40,
        breakpoints: [20.00, 15.00, 10.00, 5.00],
        steps: &STEPS_5,
    },
    GradingRule {
        pass_threshold: 48,
        breakpoints: [24.00, 18.00, 12.00, 6.00],
        steps: &STEPS_6,
    },
];

#[rustfmt::skip]
static STEPS_1: [(i64, f64); 9] = [
    (8, 1.00), (9, 1.50), (10, 2.00), (11, 2.33), (12, 2.67),
    (13, 3.00), (14, 3.33), (15, 3.67), (16, 4.00),
];

// No entry for 25: a total of 25 keeps the 24 value.
#[rustfmt::skip]
static STEPS_2: [(i64, f64); 16] = [
    (16, 2.00), (17, 2.50), (18, 3.00), (19, 3.50), (20, 4.00),
    (21, 4.33), (22, 4.67), (23, 5.00), (24, 5.33), (26, 6.00),
    (27, 6.33), (28, 6.67), (29, 7.00), (30, 7.33), (31, 7.67),
    (32, 8.00),
];

#[rustfmt::skip]
static STEPS_3: [(i64, f64); 25] = [
    (24, 3.00), (25, 3.50), (26, 4.00), (27, 4.50), (28, 5.00),
    (29, 5.50), (30, 6.00), (31, 6.33), (32, 6.67), (33, 7.00),
    (34, 7.33), (35, 7.67), (36, 8.00), (37, 8.33), (38, 8.67),
    (39, 9.00), (40, 9.33), (41, 9.67), (42, 10.00), (43, 10.33),
    (44, 10.67), (45, 11.00), (46, 11.33), (47, 11.67), (48, 12.00),
];

#[rustfmt::skip]
static STEPS_4: [(i64, f64); 49] = [
    (32, 4.00), (33, 4.50), (34, 5.00), (35, 5.50), (36, 6.00),
    (37, 6.50), (38, 7.00), (39, 7.50), (40, 8.00), (41, 8.33),
    (42, 8.67), (43, 9.00), (44, 9.33), (45, 9.67), (46, 10.00),
    (47, 10.33), (48, 10.67), (49, 11.00), (50, 11.33), (51, 11.67),
    (52, 12.00), (53, 12.33), (54, 12.67), (55, 13.00), (56, 13.33),
    (57, 13.67), (58, 14.00), (59, 14.33), (60, 14.67), (61, 15.00),
    (62, 15.33), (63, 15.67), (64, 16.00), (65, 16.00), (66, 16.00),
    (67, 16.00), (68, 16.00), (69, 16.00), (70, 16.00), (71, 16.00),
    (72, 16.00), (73, 16.00), (74, 16.00), (75, 16.00), (76, 16.00),
    (77, 16.00), (78, 16.00), (79, 16.00), (80, 16.00),
];

#[rustfmt::skip]
static STEPS_5: [(i64, f64); 61] = [
    (40, 5.00), (41, 5.50), (42, 6.00), (43, 6.50), (44, 7.00),
    (45, 7.50), (46, 8.00), (47, 8.50), (48, 9.00), (49, 9.50),
    (50, 10.00), (51, 10.33), (52, 10.67), (53, 11.00), (54, 11.33),
    (55, 11.67), (56, 12.00), (57, 12.33), (58, 12.67), (59, 13.00),
    (60, 13.33), (61, 13.67), (62, 14.00), (63, 14.33), (64, 14.67),
    (65, 15.00), (66, 15.33), (67, 15.67), (68, 16.00), (69, 16.33),
    (70, 16.67), (71, 17.00), (72, 17.33), (73, 17.67), (74, 18.00),
    (75, 18.33), (76, 18.67), (77, 19.00), (78, 19.33), (79, 19.67),
    (80, 20.00), (81, 20.00), (82, 20.00), (83, 20.00), (84, 20.00),
    (85, 20.00), (86, 20.00), (87, 20.00), (88, 20.00), (89, 20.00),
    (90, 20.00), (91, 20.00), (92, 20.00), (93, 20.00), (94, 20.00),
    (95, 20.00), (96, 20.00), (97, 20.00), (98, 20.00), (99, 20.00),
    (100, 20.00),
];

#[rustfmt::skip]
static STEPS_6: [(i64, f64); 73] = [
    (48, 6.00), (49, 6.50), (50, 7.00), (51, 7.50), (52, 8.00),
    (53, 8.50), (54, 9.00), (55, 9.50), (56, 10.00), (57, 10.50),
    (58, 11.00), (59, 11.50), (60, 12.00), (61, 12.33), (62, 12.67),
    (63, 13.00), (64, 13.33), (65, 13.67), (66, 14.00), (67, 14.33),
    (68, 14.67), (69, 15.00), (70, 15.33), (71, 15.67), (72, 16.00),
    (73, 16.33), (74, 16.67), (75, 17.00), (76, 17.33), (77, 17.67),
    (78, 18.00), (79, 18.33), (80, 18.67), (81, 19.00), (82, 19.33),
    (83, 19.67), (84, 20.00), (85, 20.33), (86, 20.67), (87, 21.00),
    (88, 21.33), (89, 21.67), (90, 22.00), (91, 22.33), (92, 22.67),
    (93, 23.00), (94, 23.33), (95, 23.67), (96, 24.00), (97, 24.00),
    (98, 24.00), (99, 24.00), (100, 24.00), (101, 24.00), (102, 24.00),
    (103, 24.00), (104, 24.00), (105, 24.00), (106, 24.00), (107, 24.00),
    (108, 24.00), (109, 24.00), (110, 24.00), (111, 24.00), (112, 24.00),
    (113, 24.00), (114, 24.00), (115, 24.00), (116, 24.00), (117, 24.00),
    (118, 24.00), (119, 24.00), (120, 24.00),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(total: i64, ch: i64) -> Evaluation {
        evaluate_raw(total, ch).expect("supported credit hours")
    }

    #[test]
    fn step_tables_are_strictly_ascending() {
        for ch in CreditHours::ALL {
            let steps = ch.rule().steps;
            assert!(!steps.is_empty());
            for w in steps.windows(2) {
                assert!(w[0].0 < w[1].0, "ch={} keys {} {}", ch, w[0].0, w[1].0);
            }
        }
    }

    #[test]
    fn quality_point_and_grade_are_monotonic() {
        for ch in CreditHours::ALL {
            let mut prev = evaluate(-5, ch);
            for total in -4..=130 {
                let cur = evaluate(total, ch);
                assert!(cur.quality_point >= prev.quality_point, "ch={} total={}", ch, total);
                assert!(cur.grade >= prev.grade, "ch={} total={}", ch, total);
                prev = cur;
            }
        }
    }

    #[test]
    fn saturates_at_top_of_table() {
        for total in [96, 120, 500] {
            let e = eval(total, 6);
            assert_eq!(e.quality_point, 24.00);
            assert_eq!(e.grade, Grade::A);
            assert_eq!(e.status, PassFailStatus::Pass);
        }
        assert_eq!(eval(95, 6).quality_point, 23.67);
        assert_eq!(eval(95, 6).grade, Grade::B);
        assert_eq!(eval(200, 3).quality_point, 12.00);
    }

    #[test]
    fn pass_threshold_is_strict() {
        assert_eq!(eval(24, 3).status, PassFailStatus::Fail);
        assert_eq!(eval(25, 3).status, PassFailStatus::Pass);
        for ch in CreditHours::ALL {
            let t = ch.rule().pass_threshold;
            assert_eq!(evaluate(t, ch).status, PassFailStatus::Fail);
            assert_eq!(evaluate(t + 1, ch).status, PassFailStatus::Pass);
        }
    }

    #[test]
    fn literal_cases() {
        let e = eval(60, 6);
        assert_eq!(e.quality_point, 12.00);
        assert_eq!(e.grade, Grade::C);

        let e = eval(20, 2);
        assert_eq!(e.quality_point, 4.00);
        assert_eq!(e.grade, Grade::C);
        assert_eq!(e.status, PassFailStatus::Pass);

        // Gap in the weight-2 table.
        assert_eq!(eval(25, 2).quality_point, 5.33);
        assert_eq!(eval(26, 2).quality_point, 6.00);
        assert_eq!(eval(26, 2).grade, Grade::B);

        let e = eval(41, 4);
        assert_eq!(e.quality_point, 8.33);
        assert_eq!(e.grade, Grade::C);
    }

    #[test]
    fn below_table_is_zero_and_f() {
        let e = eval(0, 4);
        assert_eq!(e.quality_point, 0.0);
        assert_eq!(e.grade, Grade::F);
        assert_eq!(e.status, PassFailStatus::Fail);

        let e = eval(-10, 1);
        assert_eq!(e.quality_point, 0.0);
        assert_eq!(e.grade, Grade::F);
    }

    #[test]
    fn lowest_band_grades_d() {
        for ch in CreditHours::ALL {
            let first = ch.rule().steps[0];
            let e = evaluate(first.0, ch);
            assert_eq!(e.quality_point, first.1);
            assert_eq!(e.grade, Grade::D, "ch={}", ch);
            assert_eq!(e.status, PassFailStatus::Fail);
        }
    }

    #[test]
    fn max_quality_point_is_four_per_credit_hour() {
        for ch in CreditHours::ALL {
            assert_eq!(ch.rule().max_quality_point(), 4.0 * f64::from(ch.value()));
            assert_eq!(ch.rule().breakpoints[0], ch.rule().max_quality_point());
        }
    }

    #[test]
    fn rejects_unsupported_credit_hours() {
        assert_eq!(
            evaluate_raw(50, 7),
            Err(GradeError::InvalidCreditHours(7))
        );
        assert_eq!(
            evaluate_raw(50, 0),
            Err(GradeError::InvalidCreditHours(0))
        );
    }

    #[test]
    fn credit_hours_serde_uses_plain_integers() {
        let ch: CreditHours = serde_json::from_str("3").expect("parse");
        assert_eq!(ch, CreditHours::Three);
        assert_eq!(serde_json::to_string(&CreditHours::Six).expect("ser"), "6");
        assert!(serde_json::from_str::<CreditHours>("9").is_err());
    }

    #[test]
    fn evaluation_wire_shape() {
        let v = serde_json::to_value(eval(60, 6)).expect("ser");
        assert_eq!(
            v,
            serde_json::json!({ "status": "Pass", "qualityPoint": 12.0, "grade": "C" })
        );
    }
}
