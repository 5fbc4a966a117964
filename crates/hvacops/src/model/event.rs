/// Append-only timeline entry: the audit trail for status changes, contact
/// attempts, overrides, and retest links. Never mutated or deleted.
#[derive(Debug, Clone)]
pub struct JobEvent {
    pub id: String,
    pub job_id: String,
    pub event_type: String,
    pub meta: serde_json::Value,
    /// Acting user, supplied by the host's session layer.
    pub actor: Option<String>,
    pub created_at: String,
}

impl JobEvent {
    pub fn new(job_id: &str, event_type: &str, meta: serde_json::Value, actor: Option<&str>) -> Self {
        Self {
            id: super::new_id(),
            job_id: job_id.to_string(),
            event_type: event_type.to_string(),
            meta,
            actor: actor.map(str::to_string),
            created_at: super::now_rfc3339(),
        }
    }
}
