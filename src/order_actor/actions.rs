/// Custom actions for Order entities.
///
/// Orders are snapshots; changing the status is the only mutation allowed.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderAction {
    /// Replaces the free-text status with the value as sent.
    SetStatus(String),
}

/// Results from OrderActions - variants match 1:1 with OrderAction
#[derive(Debug, Clone, PartialEq)]
pub enum OrderActionResult {
    SetStatus { previous: String, current: String },
}
