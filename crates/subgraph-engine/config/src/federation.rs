#[derive(Debug, Default, serde::Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FederationConfig {
    /// Maximum number of representations handed to a batched entity resolver in one call.
    /// Unbounded when absent.
    pub entities_batch_size: Option<usize>,
}
