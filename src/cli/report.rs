//! Report Rendering
//!
//! Text output mirrors the report sections in pipeline order. JSON and YAML
//! are straight serde dumps of [`AnalysisReport`].

use std::fmt::Write as _;

use clap::ValueEnum;
use console::style;

use crate::types::{AnalysisReport, Result, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

pub fn render(report: &AnalysisReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        ReportFormat::Yaml => Ok(serde_yaml::to_string(report)?),
    }
}

pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();

    heading(&mut out, "Project Overview");
    let _ = writeln!(out, "{}", report.summary);
    let _ = writeln!(out);
    let _ = writeln!(out, "Score:      {}/100", report.score.round());
    let _ = writeln!(out, "Tech Stack: {}", report.tech_stack.join(", "));

    heading(&mut out, "Architecture");
    let _ = writeln!(out, "Pattern: {}", style(&report.architecture.pattern).bold());
    bullets(&mut out, "Strengths", &report.architecture.pros);
    bullets(&mut out, "Weaknesses", &report.architecture.cons);

    heading(&mut out, "Security");
    if report.security_issues.is_empty() {
        let _ = writeln!(out, "No security issues reported.");
    } else {
        let counts: Vec<String> = [Severity::Critical, Severity::High, Severity::Medium, Severity::Low]
            .into_iter()
            .map(|s| (s, report.count_by_severity(s)))
            .filter(|(_, n)| *n > 0)
            .map(|(s, n)| format!("{} {}", n, s))
            .collect();
        let _ = writeln!(out, "{} found: {}", report.security_issues.len(), counts.join(", "));
    }
    for issue in &report.security_issues {
        let _ = writeln!(
            out,
            "{} {}",
            severity_badge(issue.severity),
            issue.description
        );
        if !issue.location.is_empty() {
            let _ = writeln!(out, "    at:  {}", issue.location);
        }
        if !issue.fix.is_empty() {
            let _ = writeln!(out, "    fix: {}", issue.fix);
        }
    }

    heading(&mut out, "Optimizations");
    if report.optimization_suggestions.is_empty() {
        let _ = writeln!(out, "No optimizations suggested.");
    }
    for suggestion in &report.optimization_suggestions {
        let _ = writeln!(
            out,
            "[{} impact, {}] {}",
            suggestion.impact, suggestion.category, suggestion.description
        );
        if !suggestion.example.is_empty() {
            for line in suggestion.example.lines() {
                let _ = writeln!(out, "    {}", line);
            }
        }
    }

    heading(&mut out, "README");
    let _ = writeln!(out, "{}", report.readme.trim_end());

    heading(&mut out, "System Diagram (Mermaid)");
    let _ = writeln!(out, "```mermaid\n{}\n```", report.diagram.trim_end());

    heading(&mut out, "Pitch");
    let _ = writeln!(out, "{}", report.pitch.trim_end());

    out
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", style(title).bold().underlined());
}

fn bullets(out: &mut String, label: &str, items: &[String]) {
    let _ = writeln!(out, "{}:", label);
    for item in items {
        let _ = writeln!(out, "  - {}", item);
    }
}

fn severity_badge(severity: Severity) -> String {
    let label = format!("[{}]", severity.as_str().to_uppercase());
    match severity {
        Severity::Critical => style(label).red().bold().to_string(),
        Severity::High => style(label).red().to_string(),
        Severity::Medium => style(label).yellow().to_string(),
        Severity::Low => style(label).dim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        Architecture, Impact, OptimizationCategory, OptimizationSuggestion, SecurityIssue,
    };

    fn report() -> AnalysisReport {
        AnalysisReport {
            summary: "A browser task manager.".to_string(),
            score: 42.4,
            tech_stack: vec!["JavaScript".to_string(), "CSS".to_string()],
            architecture: Architecture {
                pattern: "Monolithic Script".to_string(),
                pros: vec!["Simple".to_string()],
                cons: vec!["Global state".to_string()],
            },
            security_issues: vec![SecurityIssue {
                severity: Severity::Critical,
                description: "Hard-coded API key".to_string(),
                location: "config.js".to_string(),
                fix: String::new(),
            }],
            optimization_suggestions: vec![OptimizationSuggestion {
                impact: Impact::High,
                category: OptimizationCategory::Performance,
                description: "Busy-wait loop".to_string(),
                example: "remove\nthe loop".to_string(),
            }],
            readme: "# TaskFlow".to_string(),
            diagram: "graph TD\n A --> B".to_string(),
            pitch: "Ship it.".to_string(),
        }
    }

    #[test]
    fn test_text_sections_in_order() {
        let text = console::strip_ansi_codes(&render_text(&report())).into_owned();
        let order = [
            "Project Overview",
            "Architecture",
            "Security",
            "Optimizations",
            "README",
            "System Diagram",
            "Pitch",
        ];
        let positions: Vec<usize> = order.iter().map(|h| text.find(h).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(text.contains("Score:      42/100"));
        assert!(text.contains("1 found: 1 critical"));
        assert!(text.contains("[CRITICAL] Hard-coded API key"));
        assert!(text.contains("    at:  config.js"));
        assert!(!text.contains("fix:"));
        assert!(text.contains("[high impact, performance] Busy-wait loop"));
        assert!(text.contains("```mermaid\ngraph TD\n A --> B\n```"));
    }

    #[test]
    fn test_empty_findings_have_placeholders() {
        let mut report = report();
        report.security_issues.clear();
        report.optimization_suggestions.clear();
        let text = render_text(&report);
        assert!(text.contains("No security issues reported."));
        assert!(text.contains("No optimizations suggested."));
    }

    #[test]
    fn test_json_uses_wire_names() {
        let json = render(&report(), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["techStack"][0], "JavaScript");
        assert_eq!(value["securityIssues"][0]["severity"], "critical");
        assert_eq!(value["optimizationSuggestions"][0]["category"], "performance");
    }

    #[test]
    fn test_yaml_round_trips() {
        let yaml = render(&report(), ReportFormat::Yaml).unwrap();
        let parsed: AnalysisReport = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, report());
    }
}
