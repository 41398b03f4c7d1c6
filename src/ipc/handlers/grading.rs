use crate::grading::{self, CreditHours, GradingRule};
use crate::ipc::error::{err, grade_err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn get_required_i64(params: &serde_json::Value, key: &str) -> Result<i64, String> {
    params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| format!("missing or non-integer {}", key))
}

fn rule_json(ch: CreditHours, rule: &GradingRule) -> serde_json::Value {
    let [a, b, c, d] = rule.breakpoints;
    json!({
        "creditHours": ch,
        "passThreshold": rule.pass_threshold,
        "maxQualityPoint": rule.max_quality_point(),
        "breakpoints": { "A": a, "B": b, "C": c, "D": d },
        "steps": rule
            .steps
            .iter()
            .map(|&(min_marks, qp)| json!({ "minMarks": min_marks, "qualityPoint": qp }))
            .collect::<Vec<_>>(),
    })
}

fn handle_evaluate(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let total_marks = match get_required_i64(&req.params, "totalMarks") {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", m, None),
    };
    let credit_hours = match get_required_i64(&req.params, "creditHours") {
        Ok(v) => v,
        Err(m) => return err(&req.id, "bad_params", m, None),
    };

    match grading::evaluate_raw(total_marks, credit_hours) {
        Ok(eval) => ok(&req.id, json!(eval)),
        Err(e) => {
            tracing::warn!(credit_hours, "rejected evaluation: {e}");
            grade_err(&req.id, &e)
        }
    }
}

fn handle_table(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(raw) = req.params.get("creditHours") else {
        let rules: Vec<_> = CreditHours::ALL
            .iter()
            .map(|&ch| rule_json(ch, ch.rule()))
            .collect();
        return ok(&req.id, json!({ "rules": rules }));
    };
    let Some(v) = raw.as_i64() else {
        return err(&req.id, "bad_params", "creditHours must be an integer", None);
    };
    let ch = match CreditHours::try_from(v) {
        Ok(ch) => ch,
        Err(e) => return grade_err(&req.id, &e),
    };
    ok(&req.id, rule_json(ch, ch.rule()))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grading.evaluate" => Some(handle_evaluate(state, req)),
        "grading.table" => Some(handle_table(state, req)),
        _ => None,
    }
}
