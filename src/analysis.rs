//! Local sub-analyses of a lead.
//!
//! These are pure functions of the lead record. Their output is embedded in
//! the prompt sent to the scoring service, giving the model pre-digested
//! signals about website, contacts and market.

use crate::models::{Contact, LeadRecord};
use crate::validation::{is_decision_maker, is_valid_email, is_valid_phone};
use serde::Serialize;
use url::{ParseError, Url};

const HIGH_VALUE_INDUSTRIES: [&str; 5] = [
    "technology",
    "healthcare",
    "finance",
    "manufacturing",
    "consulting",
];
const MEDIUM_VALUE_INDUSTRIES: [&str; 5] =
    ["retail", "education", "real_estate", "legal", "marketing"];

const MAJOR_MARKETS: [&str; 6] = [
    "united states",
    "canada",
    "uk",
    "australia",
    "germany",
    "france",
];
const EMERGING_MARKETS: [&str; 5] = ["india", "china", "brazil", "mexico", "singapore"];

const HIGH_REVENUE: f64 = 1_000_000.0;
const MEDIUM_REVENUE: f64 = 100_000.0;

/// Domains shorter than this are considered suspicious.
const MIN_DOMAIN_LEN: usize = 5;

// ============ Website ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WebsiteQuality {
    None,
    Good,
    Poor,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebsiteAnalysis {
    pub valid: bool,
    pub quality: WebsiteQuality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub issues: Vec<String>,
}

/// Judges a company website URL.
///
/// A missing scheme is treated as `https://`. The domain is flagged when it
/// points at the local machine or is too short to be a real registered name.
pub fn analyze_website(website: &str) -> WebsiteAnalysis {
    let website = website.trim();
    if website.is_empty() {
        return WebsiteAnalysis {
            valid: false,
            quality: WebsiteQuality::None,
            domain: None,
            issues: vec!["No website provided".to_string()],
        };
    }

    // Bare domains and `host:port` forms have no usable scheme
    let parsed = match Url::parse(website) {
        Ok(url) if url.has_host() => Ok(url),
        Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{}", website))
        }
        Err(e) => Err(e),
    };

    let parsed = match parsed {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!("Website '{}' failed to parse: {}", website, e);
            return WebsiteAnalysis {
                valid: false,
                quality: WebsiteQuality::Invalid,
                domain: None,
                issues: vec!["Invalid URL format".to_string()],
            };
        }
    };

    let host = parsed.host_str().unwrap_or_default().to_lowercase();
    let domain = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    };

    let mut issues = Vec::new();
    if domain.contains("localhost") || domain.contains("127.0.0.1") {
        issues.push("Invalid domain".to_string());
    }
    if domain.len() < MIN_DOMAIN_LEN {
        issues.push("Suspiciously short domain".to_string());
    }

    WebsiteAnalysis {
        valid: issues.is_empty(),
        quality: if issues.is_empty() {
            WebsiteQuality::Good
        } else {
            WebsiteQuality::Poor
        },
        domain: Some(domain),
        issues,
    }
}

// ============ Contacts ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactQuality {
    None,
    Poor,
    Good,
    Excellent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactAnalysis {
    pub quality: ContactQuality,
    pub total_contacts: usize,
    pub valid_emails: usize,
    pub valid_phones: usize,
    pub decision_makers: usize,
    pub issues: Vec<String>,
}

/// Counts usable channels and decision makers across all contacts.
pub fn analyze_contacts(contacts: &[Contact]) -> ContactAnalysis {
    if contacts.is_empty() {
        return ContactAnalysis {
            quality: ContactQuality::None,
            total_contacts: 0,
            valid_emails: 0,
            valid_phones: 0,
            decision_makers: 0,
            issues: vec!["No contacts provided".to_string()],
        };
    }

    let valid_emails = contacts
        .iter()
        .flat_map(|c| c.emails.iter())
        .filter(|email| is_valid_email(email))
        .count();
    let valid_phones = contacts
        .iter()
        .flat_map(|c| c.phones.iter())
        .filter(|phone| is_valid_phone(phone))
        .count();
    let decision_makers = contacts
        .iter()
        .filter(|c| is_decision_maker(&c.position))
        .count();

    let quality = if valid_emails > 0 && valid_phones > 0 && decision_makers > 0 {
        ContactQuality::Excellent
    } else if valid_emails > 0 || valid_phones > 0 {
        ContactQuality::Good
    } else {
        ContactQuality::Poor
    };

    let mut issues = Vec::new();
    if valid_emails == 0 {
        issues.push("No valid emails".to_string());
    }
    if valid_phones == 0 {
        issues.push("No valid phone numbers".to_string());
    }
    if decision_makers == 0 {
        issues.push("No decision makers identified".to_string());
    }

    ContactAnalysis {
        quality,
        total_contacts: contacts.len(),
        valid_emails,
        valid_phones,
        decision_makers,
        issues,
    }
}

// ============ Market ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Potential {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarketAnalysis {
    pub industry_potential: Potential,
    pub geographic_potential: Potential,
    pub revenue_potential: Potential,
    /// Only ever `High` or `Medium`: downstream consumers rely on "low"
    /// never appearing here.
    pub overall_potential: Potential,
}

fn tier_by_keywords(value: &str, high: &[&str], medium: &[&str]) -> Potential {
    let value = value.to_lowercase();
    if high.iter().any(|keyword| value.contains(keyword)) {
        Potential::High
    } else if medium.iter().any(|keyword| value.contains(keyword)) {
        Potential::Medium
    } else {
        Potential::Low
    }
}

pub fn analyze_market_potential(industry: &str, country: &str, revenue: f64) -> MarketAnalysis {
    let industry_potential =
        tier_by_keywords(industry, &HIGH_VALUE_INDUSTRIES, &MEDIUM_VALUE_INDUSTRIES);
    let geographic_potential = tier_by_keywords(country, &MAJOR_MARKETS, &EMERGING_MARKETS);

    let revenue_potential = if revenue > HIGH_REVENUE {
        Potential::High
    } else if revenue > MEDIUM_REVENUE {
        Potential::Medium
    } else {
        Potential::Low
    };

    let overall_potential =
        if industry_potential == Potential::High && geographic_potential == Potential::High {
            Potential::High
        } else {
            Potential::Medium
        };

    MarketAnalysis {
        industry_potential,
        geographic_potential,
        revenue_potential,
        overall_potential,
    }
}

// ============ Prompt Context ============

#[derive(Debug, Clone, Serialize)]
pub struct CompanyBlock<'a> {
    pub name: &'a str,
    pub website: &'a str,
    pub industry: &'a str,
    pub country: &'a str,
    pub revenue: f64,
    pub source: &'a str,
}

/// Everything the scoring model gets to see about one lead.
#[derive(Debug, Clone, Serialize)]
pub struct LeadContext<'a> {
    pub company: CompanyBlock<'a>,
    pub contacts: &'a [Contact],
    pub notes: &'a str,
    pub website_analysis: WebsiteAnalysis,
    pub contact_analysis: ContactAnalysis,
    pub market_analysis: MarketAnalysis,
}

impl<'a> LeadContext<'a> {
    pub fn from_lead(lead: &'a LeadRecord) -> Self {
        Self {
            company: CompanyBlock {
                name: &lead.company_name,
                website: &lead.company_website,
                industry: &lead.industry,
                country: &lead.country,
                revenue: lead.revenue,
                source: &lead.source,
            },
            contacts: &lead.contacts,
            notes: &lead.notes,
            website_analysis: analyze_website(&lead.company_website),
            contact_analysis: analyze_contacts(&lead.contacts),
            market_analysis: analyze_market_potential(&lead.industry, &lead.country, lead.revenue),
        }
    }
}
