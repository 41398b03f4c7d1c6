use crate::attendance::{AttendanceError, AttendanceFilter, AttendanceSubmission};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

struct HandlerErr {
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
}

impl HandlerErr {
    fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<AttendanceError> for HandlerErr {
    fn from(e: AttendanceError) -> Self {
        let (code, details) = match &e {
            AttendanceError::MissingField(_)
            | AttendanceError::InvalidDate(_)
            | AttendanceError::EmptyRoll => ("bad_params", None),
            AttendanceError::DuplicateSession { date, .. } => {
                ("duplicate_attendance", Some(json!({ "date": date })))
            }
            AttendanceError::NoStudents { .. } => ("not_found", None),
        };
        HandlerErr {
            code,
            message: e.to_string(),
            details,
        }
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(
    params: &serde_json::Value,
) -> Result<T, HandlerErr> {
    let params = if params.is_null() {
        json!({})
    } else {
        params.clone()
    };
    serde_json::from_value(params).map_err(|e| HandlerErr {
        code: "bad_params",
        message: e.to_string(),
        details: None,
    })
}

fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr {
            code: "bad_params",
            message: format!("missing {}", key),
            details: None,
        })
}

fn get_roster(params: &serde_json::Value) -> Result<Vec<String>, HandlerErr> {
    let Some(raw) = params.get("studentIds") else {
        return Ok(Vec::new());
    };
    let Some(arr) = raw.as_array() else {
        return Err(HandlerErr {
            code: "bad_params",
            message: "studentIds must be an array".to_string(),
            details: None,
        });
    };
    arr.iter()
        .map(|v| {
            v.as_str().map(|s| s.to_string()).ok_or_else(|| HandlerErr {
                code: "bad_params",
                message: "studentIds must contain strings".to_string(),
                details: None,
            })
        })
        .collect()
}

fn attendance_submit(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let sub: AttendanceSubmission = parse_params(&req.params)?;
    let recorded = state.attendance.submit(&sub)?;
    tracing::info!(
        course = %sub.course_id,
        class = %sub.class_id,
        date = %sub.date,
        count = recorded.len(),
        "attendance recorded"
    );
    Ok(json!({ "recorded": recorded.len(), "entries": recorded }))
}

fn attendance_list(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let filter: AttendanceFilter = parse_params(&req.params)?;
    let rows = state.attendance.list(&filter)?;
    Ok(json!({ "count": rows.len(), "entries": rows }))
}

fn attendance_low(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(&req.params, "classId")?;
    let course_id = get_required_str(&req.params, "courseId")?;
    let roster = get_roster(&req.params)?;
    let students = state.attendance.low_attendance(&class_id, &course_id, &roster)?;
    Ok(json!({ "students": students }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.submit" => attendance_submit(state, req),
        "attendance.list" => attendance_list(state, req),
        "attendance.lowAttendance" => attendance_low(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
