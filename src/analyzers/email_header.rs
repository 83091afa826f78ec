use super::{apply_rules, Analyzer, Finding, ScoringRule};
use crate::config::HeaderScoring;
use crate::domain_utils::DomainUtils;
use crate::error::{require_input, AnalyzerError};
use crate::headers::HeaderFieldMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;

lazy_static! {
    static ref SPF_RESULT: Regex = Regex::new(r"(?i)spf=([A-Za-z0-9_-]+)").unwrap();
    static ref DKIM_RESULT: Regex = Regex::new(r"(?i)dkim=([A-Za-z0-9_-]+)").unwrap();
    static ref DMARC_RESULT: Regex = Regex::new(r"(?i)dmarc=([A-Za-z0-9_-]+)").unwrap();
    static ref SPAM_SCORE: Regex = Regex::new(r"-?[0-9]+(\.[0-9]+)?").unwrap();
    static ref HOP_FROM: Regex = Regex::new(r"(?i)from\s(.+?)\s(?:by|\(|;)").unwrap();
    static ref HOP_BY: Regex = Regex::new(r"(?i)by\s(.+?)\s(?:\(|;)").unwrap();
    static ref HOP_IP: Regex = Regex::new(r"(?:[0-9]{1,3}\.){3}[0-9]{1,3}").unwrap();
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Outcome of one authentication mechanism as reported in
/// `Authentication-Results`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthVerdict {
    Pass,
    Fail,
    SoftFail,
    None,
    Neutral,
    PermError,
    TempError,
    Quarantine,
    Reject,
    Other(String),
}

impl AuthVerdict {
    pub fn from_token(token: &str) -> Self {
        match token.to_lowercase().as_str() {
            "pass" => AuthVerdict::Pass,
            "fail" => AuthVerdict::Fail,
            "softfail" => AuthVerdict::SoftFail,
            "none" => AuthVerdict::None,
            "neutral" => AuthVerdict::Neutral,
            "permerror" => AuthVerdict::PermError,
            "temperror" => AuthVerdict::TempError,
            "quarantine" => AuthVerdict::Quarantine,
            "reject" => AuthVerdict::Reject,
            other => AuthVerdict::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AuthVerdict::Pass => "pass",
            AuthVerdict::Fail => "fail",
            AuthVerdict::SoftFail => "softfail",
            AuthVerdict::None => "none",
            AuthVerdict::Neutral => "neutral",
            AuthVerdict::PermError => "permerror",
            AuthVerdict::TempError => "temperror",
            AuthVerdict::Quarantine => "quarantine",
            AuthVerdict::Reject => "reject",
            AuthVerdict::Other(token) => token,
        }
    }

    /// Verdicts that count against the message.
    pub fn is_unfavorable(&self) -> bool {
        !matches!(self, AuthVerdict::Pass | AuthVerdict::Other(_))
    }
}

impl fmt::Display for AuthVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AuthVerdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthResult {
    pub spf: Option<AuthVerdict>,
    pub dkim: Option<AuthVerdict>,
    pub dmarc: Option<AuthVerdict>,
    pub raw: String,
}

impl AuthResult {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        let extract = |re: &Regex| first_capture(re, raw).map(|token| AuthVerdict::from_token(&token));

        Self {
            spf: extract(&*SPF_RESULT),
            dkim: extract(&*DKIM_RESULT),
            dmarc: extract(&*DMARC_RESULT),
            raw: raw.to_string(),
        }
    }

    pub fn mechanisms(&self) -> [(&'static str, Option<&AuthVerdict>); 3] {
        [
            ("SPF", self.spf.as_ref()),
            ("DKIM", self.dkim.as_ref()),
            ("DMARC", self.dmarc.as_ref()),
        ]
    }

    pub fn is_absent(&self) -> bool {
        self.spf.is_none() && self.dkim.is_none() && self.dmarc.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpamMarkers {
    pub score: Option<f64>,
    pub score_raw: Option<String>,
    pub status: Option<String>,
}

impl SpamMarkers {
    pub fn parse(score_raw: Option<String>, status: Option<String>) -> Self {
        let score = score_raw
            .as_deref()
            .and_then(|raw| SPAM_SCORE.find(raw))
            .and_then(|m| m.as_str().parse::<f64>().ok());

        Self {
            score,
            score_raw,
            status,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.score_raw.is_none() && self.status.is_none()
    }
}

/// One relay step taken from a `Received` header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceivedHop {
    pub index: usize,
    pub from_host: Option<String>,
    pub by_host: Option<String>,
    pub ip: Option<String>,
    pub raw_line: String,
}

impl ReceivedHop {
    pub fn parse(index: usize, line: &str) -> Self {
        Self {
            index,
            from_host: first_capture(&HOP_FROM, line),
            by_host: first_capture(&HOP_BY, line),
            ip: HOP_IP.find(line).map(|m| m.as_str().to_string()),
            raw_line: line.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Good,
    Medium,
    Bad,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Good => "Low risk",
            RiskLevel::Medium => "Moderate risk",
            RiskLevel::Bad => "High risk",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Good => "No strong red flags detected in header-level checks.",
            RiskLevel::Medium => "Some suspicious indicators present; manual review recommended.",
            RiskLevel::Bad => "Multiple strong indicators of spoofing / phishing in the header.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub score: f64,
    pub level: RiskLevel,
    pub label: String,
    pub description: String,
    pub reasons: Vec<String>,
}

/// Everything the risk rules look at, extracted once from the headers.
#[derive(Debug, Clone, Default)]
pub struct HeaderSignals {
    pub auth: AuthResult,
    pub from_domain: Option<String>,
    pub return_domain: Option<String>,
    pub spam_score: Option<f64>,
}

fn auth_finding(mechanism: &str, verdict: Option<&AuthVerdict>, scoring: &HeaderScoring) -> Option<Finding> {
    match verdict? {
        AuthVerdict::Pass => Some(Finding::new(
            scoring.auth_pass_credit,
            format!("{} passed", mechanism),
        )),
        v if v.is_unfavorable() => Some(Finding::new(
            scoring.auth_failure_penalty,
            format!("{} = {}", mechanism, v),
        )),
        _ => None,
    }
}

fn spf_rule(signals: &HeaderSignals, scoring: &HeaderScoring) -> Option<Finding> {
    auth_finding("SPF", signals.auth.spf.as_ref(), scoring)
}

fn dkim_rule(signals: &HeaderSignals, scoring: &HeaderScoring) -> Option<Finding> {
    auth_finding("DKIM", signals.auth.dkim.as_ref(), scoring)
}

fn dmarc_rule(signals: &HeaderSignals, scoring: &HeaderScoring) -> Option<Finding> {
    auth_finding("DMARC", signals.auth.dmarc.as_ref(), scoring)
}

fn domain_mismatch_rule(signals: &HeaderSignals, scoring: &HeaderScoring) -> Option<Finding> {
    let from = signals.from_domain.as_deref()?;
    let return_path = signals.return_domain.as_deref()?;
    if from.eq_ignore_ascii_case(return_path) {
        return None;
    }
    Some(Finding::new(
        scoring.domain_mismatch_penalty,
        format!(
            "From domain ({}) ≠ Return-Path domain ({})",
            from, return_path
        ),
    ))
}

fn spam_score_rule(signals: &HeaderSignals, scoring: &HeaderScoring) -> Option<Finding> {
    let score = signals.spam_score?;
    if score >= scoring.spam_very_high_threshold {
        Some(Finding::new(
            scoring.spam_very_high_penalty,
            format!("Spam score very high ({})", score),
        ))
    } else if score >= scoring.spam_elevated_threshold {
        Some(Finding::new(
            scoring.spam_elevated_penalty,
            format!("Spam score elevated ({})", score),
        ))
    } else if score < 0.0 {
        Some(Finding::new(
            scoring.spam_low_credit,
            format!("Spam score very low ({})", score),
        ))
    } else {
        None
    }
}

fn missing_auth_rule(signals: &HeaderSignals, scoring: &HeaderScoring) -> Option<Finding> {
    signals.auth.is_absent().then(|| {
        Finding::new(
            scoring.missing_auth_penalty,
            "No SPF/DKIM/DMARC visible in Authentication-Results.",
        )
    })
}

pub const RISK_RULES: &[ScoringRule<HeaderSignals, HeaderScoring>] = &[
    ScoringRule {
        name: "spf",
        check: spf_rule,
    },
    ScoringRule {
        name: "dkim",
        check: dkim_rule,
    },
    ScoringRule {
        name: "dmarc",
        check: dmarc_rule,
    },
    ScoringRule {
        name: "domain_mismatch",
        check: domain_mismatch_rule,
    },
    ScoringRule {
        name: "spam_score",
        check: spam_score_rule,
    },
    ScoringRule {
        name: "missing_auth",
        check: missing_auth_rule,
    },
];

pub fn score_risk(signals: &HeaderSignals, scoring: &HeaderScoring) -> RiskAssessment {
    let (total, findings) = apply_rules(RISK_RULES, signals, scoring);
    let score = total.clamp(0.0, 10.0);

    let level = if score >= scoring.high_risk_threshold {
        RiskLevel::Bad
    } else if score >= scoring.moderate_risk_threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::Good
    };

    RiskAssessment {
        score,
        level,
        label: level.label().to_string(),
        description: level.description().to_string(),
        reasons: findings.into_iter().map(|f| f.reason).collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderAnalysis {
    pub subject: Vec<String>,
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub date: Vec<String>,
    pub from_address: Option<String>,
    pub return_path_address: Option<String>,
    pub from_domain: Option<String>,
    pub return_domain: Option<String>,
    pub auth: AuthResult,
    pub spam: SpamMarkers,
    pub hops: Vec<ReceivedHop>,
    pub risk: RiskAssessment,
    pub raw: String,
}

#[derive(Debug, Clone, Default)]
pub struct HeaderRiskAnalyzer {
    scoring: HeaderScoring,
}

impl HeaderRiskAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(scoring: &HeaderScoring) -> Self {
        Self {
            scoring: scoring.clone(),
        }
    }
}

impl Analyzer for HeaderRiskAnalyzer {
    type Report = HeaderAnalysis;

    fn analyze(&self, input: &str) -> Result<HeaderAnalysis, AnalyzerError> {
        let raw = require_input(input, "Paste a header first.")?;
        let headers = HeaderFieldMap::parse(raw);
        if headers.is_empty() {
            log::warn!("no 'Name: value' header fields found in the input");
        } else {
            log::debug!("parsed {} distinct header fields", headers.len());
        }

        let from_address = headers
            .joined("from")
            .and_then(|v| DomainUtils::extract_address(&v));
        let return_path_address = headers
            .joined("return-path")
            .and_then(|v| DomainUtils::extract_address(&v));
        let from_domain = from_address
            .as_deref()
            .and_then(DomainUtils::extract_domain);
        let return_domain = return_path_address
            .as_deref()
            .and_then(DomainUtils::extract_domain);

        let auth = AuthResult::parse(headers.joined("authentication-results").as_deref());
        let spam = SpamMarkers::parse(headers.joined("x-spam-score"), headers.joined("x-spam-status"));
        let hops: Vec<ReceivedHop> = headers
            .get_all("received")
            .iter()
            .enumerate()
            .map(|(i, line)| ReceivedHop::parse(i + 1, line))
            .collect();

        let signals = HeaderSignals {
            auth,
            from_domain,
            return_domain,
            spam_score: spam.score,
        };
        let risk = score_risk(&signals, &self.scoring);
        log::debug!("header risk {} ({})", risk.score, risk.label);

        Ok(HeaderAnalysis {
            subject: headers.get_all("subject").to_vec(),
            from: headers.get_all("from").to_vec(),
            to: headers.get_all("to").to_vec(),
            date: headers.get_all("date").to_vec(),
            from_address,
            return_path_address,
            from_domain: signals.from_domain,
            return_domain: signals.return_domain,
            auth: signals.auth,
            spam,
            hops,
            risk,
            raw: raw.to_string(),
        })
    }

    fn name(&self) -> &str {
        "Email Header Risk"
    }
}
