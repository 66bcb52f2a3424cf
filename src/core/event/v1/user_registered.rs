// Event payload: UserRegisteredV1.
//
// Purpose
// - Record the business fact that a user account was registered.
//
// Versioning and evolution
// - Prefer adding fields with #[serde(default)] so older persisted rows keep
//   deserializing. For breaking changes, create UserRegisteredV2 in a new file
//   and add a new variant.
//
// Timestamps
// - All i64 values use epoch milliseconds.

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct UserRegisteredV1 {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub registered_at: i64,
    /// Added after v1 shipped; older rows omit it.
    #[serde(default)]
    pub locale: Option<String>,
}

impl UserRegisteredV1 {
    pub const EVENT_TYPE: &'static str = "user.registered.v1";
}
