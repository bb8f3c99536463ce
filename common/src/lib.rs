use serde::{Deserialize, Serialize};

/// the gatekeeper's answer to a single poll.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// the caller reported a run older than the latest one seen.
    pub shutdown: bool,
    /// calls processed so far, including this one.
    #[serde(rename = "totalCalls")]
    pub total_calls: u64,
}

/// body sent back when a run number is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub error: String,
    #[serde(rename = "totalCalls")]
    pub total_calls: u64,
}
