//! Plain-text rendering of analyzer results, one section per panel.

use crate::analyzers::email_header::HeaderAnalysis;
use crate::analyzers::{GeneratedPassword, ObfuscationReport, PasswordAssessment, RedirectAssessment};
use std::fmt::Write as _;

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn header_summary(analysis: &HeaderAnalysis) -> String {
    let risk = &analysis.risk;
    let mut out = String::from("SUMMARY\n");
    let _ = writeln!(out, "[{}] score {}/10", risk.label, risk.score);
    let _ = writeln!(out, "{}\n", risk.description);

    let fields = [
        ("Subject", analysis.subject.join("\n")),
        ("From", analysis.from_address.clone().unwrap_or_default()),
        (
            "Return-Path",
            analysis.return_path_address.clone().unwrap_or_default(),
        ),
        ("To", analysis.to.join("\n")),
        ("Date", analysis.date.join("\n")),
    ];
    for (name, value) in fields {
        if !value.is_empty() {
            let _ = writeln!(out, "{}: {}", name, value);
        }
    }

    out.push_str("\nNotes:\n");
    if risk.reasons.is_empty() {
        out.push_str("No strong warning reasons generated.");
    } else {
        out.push_str(&bullet_list(&risk.reasons));
    }
    out
}

pub fn header_auth(analysis: &HeaderAnalysis) -> String {
    let mut out = String::from("AUTHENTICATION RESULTS\n");
    for (name, verdict) in analysis.auth.mechanisms() {
        let label = format!("{}:", name);
        let value = verdict.map_or("not visible", |v| v.as_str());
        let _ = writeln!(out, "{:<7}{}", label, value);
    }
    out.push('\n');

    let spam = &analysis.spam;
    if spam.is_empty() {
        out.push_str("No X-Spam headers found.");
    } else {
        out.push_str("Spam markers:");
        if let Some(score) = &spam.score_raw {
            let _ = write!(out, "\nX-Spam-Score: {}", score);
        }
        if let Some(status) = &spam.status {
            let _ = write!(out, "\nX-Spam-Status: {}", status);
        }
    }

    if !analysis.auth.raw.is_empty() {
        let _ = write!(out, "\n\nRaw Authentication-Results:\n{}", analysis.auth.raw);
    }
    out
}

pub fn header_routing(analysis: &HeaderAnalysis) -> String {
    if analysis.hops.is_empty() {
        return "No Received headers found.".to_string();
    }

    let hops: Vec<String> = analysis
        .hops
        .iter()
        .map(|hop| {
            format!(
                "Hop #{}\n  FROM: {}\n  BY:   {}\n  IP:   {}\n",
                hop.index,
                hop.from_host.as_deref().unwrap_or("(unknown)"),
                hop.by_host.as_deref().unwrap_or("(unknown)"),
                hop.ip.as_deref().unwrap_or("(none)"),
            )
        })
        .collect();
    format!("ROUTING (Received hops)\n\n{}", hops.join("\n"))
}

pub fn header_raw(analysis: &HeaderAnalysis) -> String {
    format!("Raw header (as provided):\n\n{}", analysis.raw)
}

pub fn header_report(analysis: &HeaderAnalysis) -> String {
    [
        header_summary(analysis),
        header_auth(analysis),
        header_routing(analysis),
        header_raw(analysis),
    ]
    .join("\n\n")
}

pub fn obfuscation_report(report: &ObfuscationReport) -> String {
    let layers = if report.detected_layers.is_empty() {
        "No obvious encoding layers detected.".to_string()
    } else {
        let labels: Vec<String> = report
            .detected_layers
            .iter()
            .map(|layer| layer.label().to_string())
            .collect();
        format!("Detected layers:\n{}", bullet_list(&labels))
    };

    let warnings = if report.warnings.is_empty() {
        "No specific obfuscation primitives detected.".to_string()
    } else {
        format!("Warnings:\n\n{}", report.warnings.join("\n"))
    };

    format!(
        "{}\n\nDeobfuscated output (best effort):\n\n{}\n\n{}",
        layers, report.final_output, warnings
    )
}

pub fn password_report(assessment: &PasswordAssessment, guesses_per_second: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Strength: [{}]\n", assessment.strength.label());
    let _ = writeln!(out, "Length: {} characters", assessment.length);
    let _ = writeln!(out, "Estimated entropy: {} bits", assessment.entropy_bits);
    let _ = writeln!(
        out,
        "Rough offline crack time (@{:e} guesses/sec): {}\n",
        guesses_per_second, assessment.crack_time_estimate
    );

    if assessment.issues.is_empty() {
        out.push_str(
            "No obvious issues detected. This looks reasonably strong based on basic heuristics.\n\n\
             Remember: never reuse passwords across critical accounts.",
        );
    } else {
        let _ = write!(out, "Findings:\n\n{}", bullet_list(&assessment.issues));
    }
    out
}

pub fn redirect_report(assessment: &RedirectAssessment) -> String {
    let params = if assessment.matched_params.is_empty() {
        "No obvious redirect parameters detected by static patterns.".to_string()
    } else {
        format!(
            "Potential redirect-style parameters detected:\n\n{}",
            bullet_list(&assessment.matched_params)
        )
    };

    let warnings = if assessment.warnings.is_empty() {
        "No specific static warning patterns triggered. Always verify manually.".to_string()
    } else {
        format!("Warnings:\n\n{}", assessment.warnings.join("\n"))
    };

    format!("{}\n\n{}", params, warnings)
}

pub fn generated_password_report(generated: &GeneratedPassword) -> String {
    format!(
        "{}\n\n({} characters from a pool of {})",
        generated.password, generated.length, generated.pool_size
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::{
        Analyzer, HeaderRiskAnalyzer, ObfuscationHunter, PasswordStrengthEstimator,
        RedirectAnalyzer,
    };

    #[test]
    fn test_header_report_with_absent_values() {
        let analysis = HeaderRiskAnalyzer::new()
            .analyze("Subject: Invoice\nReceived: nowhere")
            .unwrap();

        let summary = header_summary(&analysis);
        assert!(summary.contains("[Low risk] score 1.5/10"));
        assert!(summary.contains("Subject: Invoice"));
        assert!(!summary.contains("From:"));
        assert!(summary.contains("- No SPF/DKIM/DMARC visible"));

        let auth = header_auth(&analysis);
        assert!(auth.contains("SPF:   not visible"));
        assert!(auth.contains("DMARC: not visible"));
        assert!(auth.contains("No X-Spam headers found."));
        assert!(!auth.contains("Raw Authentication-Results"));

        let routing = header_routing(&analysis);
        assert!(routing.contains("Hop #1"));
        assert!(routing.contains("FROM: (unknown)"));
        assert!(routing.contains("IP:   (none)"));
    }

    #[test]
    fn test_header_report_without_hops() {
        let analysis = HeaderRiskAnalyzer::new()
            .analyze("Authentication-Results: mx; spf=pass\nX-Spam-Score: 1.0")
            .unwrap();
        assert_eq!(header_routing(&analysis), "No Received headers found.");
        let auth = header_auth(&analysis);
        assert!(auth.contains("SPF:   pass"));
        assert!(auth.contains("Spam markers:\nX-Spam-Score: 1.0"));
        assert!(auth.contains("Raw Authentication-Results:\nmx; spf=pass"));
        assert!(header_report(&analysis).contains("Raw header (as provided):"));
    }

    #[test]
    fn test_obfuscation_report_sections() {
        let report = ObfuscationHunter::new().analyze("aGVsbG8gd29ybGQ=").unwrap();
        let text = obfuscation_report(&report);
        assert!(text.starts_with("Detected layers:\n- Base64 decoded"));
        assert!(text.contains("hello world"));
        assert!(text.ends_with("No specific obfuscation primitives detected."));
    }

    #[test]
    fn test_password_report_lists_findings() {
        let assessment = PasswordStrengthEstimator::new().analyze("qwerty123").unwrap();
        let text = password_report(&assessment, 1e10);
        assert!(text.starts_with("Strength: [Medium]"));
        assert!(text.contains("Estimated entropy: 46.5 bits"));
        assert!(text.contains("Findings:\n\n- "));
    }

    #[test]
    fn test_redirect_report_nothing_found() {
        let assessment = RedirectAnalyzer::new().analyze("https://example.com/").unwrap();
        let text = redirect_report(&assessment);
        assert!(text.starts_with("No obvious redirect parameters"));
        assert!(text.ends_with("Always verify manually."));
    }
}
