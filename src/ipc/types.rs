use crate::attendance::AttendanceLedger;
use crate::config::ScoreCaps;
use crate::results::ResultLedger;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub caps: ScoreCaps,
    pub ledger: ResultLedger,
    pub attendance: AttendanceLedger,
}

impl AppState {
    pub fn new(caps: ScoreCaps) -> Self {
        Self {
            caps,
            ledger: ResultLedger::default(),
            attendance: AttendanceLedger::default(),
        }
    }
}
