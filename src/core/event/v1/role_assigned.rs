// Event payload: RoleAssignedV1.
//
// Timestamps
// - All i64 values use epoch milliseconds.

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct RoleAssignedV1 {
    pub user_id: String,
    pub role_id: String,
    pub assigned_by: String,
    pub assigned_at: i64,
}

impl RoleAssignedV1 {
    pub const EVENT_TYPE: &'static str = "role.assigned.v1";
}
