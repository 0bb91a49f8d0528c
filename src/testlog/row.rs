use serde::Serialize;

/// A single gas measurement reported inside a `Logs:` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Measurement {
    pub market: String,
    pub test_name: String,
    pub action_name: String,
    /// 0 means "not measured".
    pub gas_usage: u64,
    pub is_direct_call: bool,
}
