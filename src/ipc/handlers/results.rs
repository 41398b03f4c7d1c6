use crate::ipc::error::{err, ok, result_err};
use crate::ipc::types::{AppState, Request};
use crate::results::{self, ResultFilter, ResultInput};
use serde_json::json;

fn parse_params<T: serde::de::DeserializeOwned>(req: &Request) -> Result<T, serde_json::Value> {
    let params = if req.params.is_null() {
        json!({})
    } else {
        req.params.clone()
    };
    serde_json::from_value(params).map_err(|e| err(&req.id, "bad_params", e.to_string(), None))
}

fn handle_results_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let input: ResultInput = match parse_params(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let record = match results::compose(&input, &state.caps) {
        Ok(r) => r,
        Err(e) => return result_err(&req.id, &e),
    };
    match state.ledger.add(record) {
        Ok(saved) => {
            tracing::info!(
                id = %saved.id,
                student = %saved.registration_number,
                course = %saved.course_id,
                grade = %saved.grade,
                "result added"
            );
            ok(&req.id, json!(saved))
        }
        Err(e) => {
            tracing::info!("rejected result: {e}");
            result_err(&req.id, &e)
        }
    }
}

fn handle_results_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let filter: ResultFilter = match parse_params(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let rows = state.ledger.list(&filter);
    ok(&req.id, json!({ "count": rows.len(), "results": rows }))
}

fn handle_results_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(id) = req.params.get("id").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing id", None);
    };
    match state.ledger.delete(id) {
        Ok(removed) => {
            tracing::info!(id = %removed.id, "result deleted");
            ok(&req.id, json!(removed))
        }
        Err(e) => result_err(&req.id, &e),
    }
}

fn handle_student_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let filter: ResultFilter = match parse_params(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(student_id) = filter.student_id.clone().filter(|s| !s.trim().is_empty()) else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };
    let rows = state.ledger.list(&filter);
    match results::student_summary(&student_id, &rows) {
        Ok(summary) => ok(&req.id, json!(summary)),
        Err(e) => result_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "results.add" => Some(handle_results_add(state, req)),
        "results.list" => Some(handle_results_list(state, req)),
        "results.delete" => Some(handle_results_delete(state, req)),
        "results.studentSummary" => Some(handle_student_summary(state, req)),
        _ => None,
    }
}
