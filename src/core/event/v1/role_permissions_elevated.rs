// Event payload: RolePermissionsElevatedV1.
//
// A permission elevation must be observed synchronously (audit trail write)
// before the triggering operation is considered complete, hence the critical
// classification on the root enumeration.
//
// Timestamps
// - All i64 values use epoch milliseconds.

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct RolePermissionsElevatedV1 {
    pub role_id: String,
    pub permissions: Vec<String>,
    pub elevated_by: String,
    pub elevated_at: i64,
}

impl RolePermissionsElevatedV1 {
    pub const EVENT_TYPE: &'static str = "role.permissions_elevated.v1";
}
