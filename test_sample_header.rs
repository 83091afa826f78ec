#![allow(clippy::uninlined_format_args)]

use sudosoc_tools::analyzers::{Analyzer, HeaderRiskAnalyzer};
use sudosoc_tools::config::Config;
use sudosoc_tools::report;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Scoring a spoofed bank notification header...");

    let config_yaml = r#"
email_header:
  missing_auth_penalty: 1.5
  high_risk_threshold: 8.0
"#;
    let config: Config = serde_yaml::from_str(config_yaml)?;
    config.validate()?;

    let raw = "\
Return-Path: <bounce-77@mailer.cheap-hosting.example>
Received: from unknown (HELO mailer) (198.51.100.23)
  by mx1.recipient.example (Postfix) ; Tue, 2 Apr 2024 03:14:15 +0000
Received: from mailer.cheap-hosting.example by relay.cheap-hosting.example ; Tue, 2 Apr 2024 03:14:10 +0000
Authentication-Results: mx1.recipient.example;
  spf=softfail smtp.mailfrom=cheap-hosting.example;
  dkim=none;
  dmarc=fail header.from=bank.example
From: \"Bank Security\" <security@bank.example>
To: customer@recipient.example
Subject: Urgent: verify your account
Date: Tue, 2 Apr 2024 03:14:00 +0000
X-Spam-Score: 7.4
X-Spam-Status: Yes, score=7.4 required=5.0
";

    let analyzer = HeaderRiskAnalyzer::from_config(&config.email_header);
    let analysis = analyzer.analyze(raw)?;

    println!("{}", report::header_report(&analysis));
    println!();
    println!(
        "Result: {} ({}/10, {} reason(s))",
        analysis.risk.label,
        analysis.risk.score,
        analysis.risk.reasons.len()
    );

    Ok(())
}
