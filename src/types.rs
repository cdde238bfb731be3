use std::str::FromStr;
use serde::Deserialize;

/// What to do when a deferred task is submitted to a full backlog.
///
/// - `Reject`: refuse the new task and report `BacklogFull` to the submitter
///   (default behaviour).
/// - `DropOldest`: abandon the oldest pending task to make room. Whoever is
///   waiting on that task's promise observes the abandonment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowBehaviour {
    Reject,
    DropOldest,
}

impl Default for OverflowBehaviour {
    fn default() -> Self {
        OverflowBehaviour::Reject
    }
}

impl FromStr for OverflowBehaviour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "reject" => Ok(OverflowBehaviour::Reject),
            "drop_oldest" => Ok(OverflowBehaviour::DropOldest),
            other => Err(format!(
                "invalid overflow behaviour: {other} (expected \"reject\" or \"drop_oldest\")"
            )),
        }
    }
}
