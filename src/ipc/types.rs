use serde::Deserialize;

use crate::bulk::BulkRunner;
use crate::config::Config;
use crate::state::ExamState;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub exam: ExamState,
    pub bulk: BulkRunner,
    pub config: Config,
}
