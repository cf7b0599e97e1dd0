//! Analysis step identifiers
//!
//! `StepId` is the closed, ordered set of states an analysis run moves through.
//! The derived `Ord` follows declaration order, so `Idle < Understanding < ... < Complete`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum StepId {
    #[default]
    Idle,
    Understanding,
    Architecture,
    /// Resilience audit (security and performance findings)
    Improvements,
    Documentation,
    Pitching,
    Complete,
    Error,
}

impl StepId {
    /// The five model-backed stages, in execution order
    pub const STAGES: [StepId; 5] = [
        Self::Understanding,
        Self::Architecture,
        Self::Improvements,
        Self::Documentation,
        Self::Pitching,
    ];

    /// Wire name, as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Understanding => "understanding",
            Self::Architecture => "architecture",
            Self::Improvements => "improvements",
            Self::Documentation => "documentation",
            Self::Pitching => "pitching",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }

    /// Human-readable stage title
    pub fn title(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Understanding => "Understanding",
            Self::Architecture => "Architecture Review",
            Self::Improvements => "Resilience Audit",
            Self::Documentation => "Documentation",
            Self::Pitching => "Value Pitch",
            Self::Complete => "Complete",
            Self::Error => "Error",
        }
    }

    /// 1-based position among the five stages
    pub fn stage_number(&self) -> Option<u8> {
        match self {
            Self::Understanding => Some(1),
            Self::Architecture => Some(2),
            Self::Improvements => Some(3),
            Self::Documentation => Some(4),
            Self::Pitching => Some(5),
            _ => None,
        }
    }

    /// Overall progress shown while this step is active
    pub fn progress_percent(&self) -> u8 {
        match self {
            Self::Idle | Self::Error => 0,
            Self::Understanding => 15,
            Self::Architecture => 35,
            Self::Improvements => 55,
            Self::Documentation => 75,
            Self::Pitching => 90,
            Self::Complete => 100,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }

    /// Stage that runs after this one. `Pitching` leads to `Complete`.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Understanding),
            Self::Understanding => Some(Self::Architecture),
            Self::Architecture => Some(Self::Improvements),
            Self::Improvements => Some(Self::Documentation),
            Self::Documentation => Some(Self::Pitching),
            Self::Pitching => Some(Self::Complete),
            Self::Complete | Self::Error => None,
        }
    }

    /// Forward-only transition rule.
    ///
    /// A step may advance to its direct successor, and any non-terminal step
    /// may fall into `Error`. Nothing leaves a terminal step.
    pub fn can_transition_to(&self, to: StepId) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == StepId::Error || self.next() == Some(to)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_follows_pipeline() {
        let order = [
            StepId::Idle,
            StepId::Understanding,
            StepId::Architecture,
            StepId::Improvements,
            StepId::Documentation,
            StepId::Pitching,
            StepId::Complete,
        ];
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_transitions_are_linear() {
        assert!(StepId::Idle.can_transition_to(StepId::Understanding));
        assert!(StepId::Pitching.can_transition_to(StepId::Complete));
        assert!(!StepId::Understanding.can_transition_to(StepId::Improvements));
        assert!(!StepId::Architecture.can_transition_to(StepId::Understanding));
        assert!(!StepId::Documentation.can_transition_to(StepId::Complete));
    }

    #[test]
    fn test_error_reachable_from_non_terminal_only() {
        for step in StepId::STAGES {
            assert!(step.can_transition_to(StepId::Error));
        }
        assert!(!StepId::Complete.can_transition_to(StepId::Error));
        assert!(!StepId::Error.can_transition_to(StepId::Understanding));
    }

    #[test]
    fn test_progress_percent_is_monotonic() {
        let percents: Vec<u8> = StepId::STAGES
            .iter()
            .chain(std::iter::once(&StepId::Complete))
            .map(StepId::progress_percent)
            .collect();
        assert_eq!(percents, vec![15, 35, 55, 75, 90, 100]);
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&StepId::Improvements).unwrap();
        assert_eq!(json, "\"improvements\"");
        let back: StepId = serde_json::from_str("\"pitching\"").unwrap();
        assert_eq!(back, StepId::Pitching);
    }
}
