use serde::Deserialize;

/// Body for creating or updating a task.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    pub task_content: String,
}
