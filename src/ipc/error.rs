use crate::grading::GradeError;
use crate::results::ResultError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn grade_err(id: &str, e: &GradeError) -> serde_json::Value {
    match e {
        GradeError::InvalidCreditHours(v) => err(
            id,
            "invalid_credit_hours",
            e.to_string(),
            Some(json!({ "creditHours": v })),
        ),
    }
}

pub fn result_err(id: &str, e: &ResultError) -> serde_json::Value {
    match e {
        ResultError::MissingField(_) => err(id, "bad_params", e.to_string(), None),
        ResultError::ScoreOutOfRange {
            component,
            value,
            max,
        } => err(
            id,
            "score_out_of_range",
            e.to_string(),
            Some(json!({ "component": component, "value": value, "max": max })),
        ),
        ResultError::TotalOverflow => err(id, "score_out_of_range", e.to_string(), None),
        ResultError::Grade(g) => grade_err(id, g),
        ResultError::DuplicateResult { .. } => err(id, "duplicate_result", e.to_string(), None),
        ResultError::NotFound(_) | ResultError::NoResults(_) => {
            err(id, "not_found", e.to_string(), None)
        }
    }
}
