// Event payload: StockLevelChangedV1.
//
// Timestamps
// - All i64 values use epoch milliseconds.

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct StockLevelChangedV1 {
    pub sku: String,
    pub warehouse_id: String,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    pub changed_at: i64,
}

impl StockLevelChangedV1 {
    pub const EVENT_TYPE: &'static str = "stock.level_changed.v1";
}
