//! Stage results and the final analysis report
//!
//! Field names serialize in camelCase so stage payloads match the schemas sent to
//! the model and the report keeps the same shape callers already consume.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Finding Enums
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: &'static [&'static str] = &["low", "medium", "high", "critical"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    pub const ALL: &'static [&'static str] = &["low", "medium", "high"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationCategory {
    Performance,
    Readability,
    Scalability,
}

impl OptimizationCategory {
    pub const ALL: &'static [&'static str] = &["performance", "readability", "scalability"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Readability => "readability",
            Self::Scalability => "scalability",
        }
    }
}

impl fmt::Display for OptimizationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Findings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityIssue {
    pub severity: Severity,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub fix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    pub impact: Impact,
    pub category: OptimizationCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub example: String,
}

// =============================================================================
// Stage Results
// =============================================================================

/// Stage 1: what the project is and what it is built with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Understanding {
    pub summary: String,
    pub tech_stack: Vec<String>,
    /// Overall quality score in [0, 100]
    pub score_base: f64,
}

/// Stage 2: dominant architecture pattern with trade-offs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Architecture {
    pub pattern: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

/// Stage 3: security and performance findings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResilienceAudit {
    pub security: Vec<SecurityIssue>,
    pub optimization: Vec<OptimizationSuggestion>,
}

/// Stage 4: generated README (markdown) and system diagram (Mermaid)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Documentation {
    pub readme: String,
    pub diagram: String,
}

/// Stage 5: stakeholder pitch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    pub pitch: String,
}

// =============================================================================
// Analysis Report
// =============================================================================

/// Aggregate of all five stages. Only ever built from a fully successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub summary: String,
    pub score: f64,
    pub tech_stack: Vec<String>,
    pub architecture: Architecture,
    pub security_issues: Vec<SecurityIssue>,
    pub optimization_suggestions: Vec<OptimizationSuggestion>,
    pub readme: String,
    pub diagram: String,
    pub pitch: String,
}

impl AnalysisReport {
    /// Pure structural composition of the stage outputs
    pub fn assemble(
        understanding: Understanding,
        architecture: Architecture,
        audit: ResilienceAudit,
        documentation: Documentation,
        pitch: Pitch,
    ) -> Self {
        Self {
            summary: understanding.summary,
            score: understanding.score_base,
            tech_stack: understanding.tech_stack,
            architecture,
            security_issues: audit.security,
            optimization_suggestions: audit.optimization,
            readme: documentation.readme,
            diagram: documentation.diagram,
            pitch: pitch.pitch,
        }
    }

    /// Highest severity among security findings
    pub fn worst_severity(&self) -> Option<Severity> {
        self.security_issues.iter().map(|i| i.severity).max()
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.security_issues
            .iter()
            .filter(|i| i.severity == severity)
            .count()
    }
}
