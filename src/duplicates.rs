//! Duplicate lead detection.
//!
//! Each existing lead is compared with the candidate on four independent
//! signals whose weights add up:
//!
//! | Signal                      | Weight             |
//! |-----------------------------|--------------------|
//! | Similar company name        | 30                 |
//! | Identical website           | 25                 |
//! | Contact overlap             | 20 x overlap ratio |
//! | Any shared email or phone   | 15                 |
//!
//! Matches scoring above `MIN_REPORTED_CONFIDENCE` are returned, best first.

use crate::models::{Contact, DuplicateMatch, LeadRecord};
use std::collections::HashSet;

pub const W_COMPANY_NAME: u32 = 30;
pub const W_WEBSITE: u32 = 25;
pub const W_CONTACT_OVERLAP: u32 = 20;
pub const W_CONTACT_MATCH: u32 = 15;

pub const MAX_CONFIDENCE: u32 = 100;
/// Matches must score strictly above this to be reported.
pub const MIN_REPORTED_CONFIDENCE: u32 = 20;

const COMPANY_SUFFIXES: [&str; 4] = [" inc", " llc", " corp", " company"];

/// Compares a candidate lead with every existing lead.
///
/// Returns the matches whose confidence exceeds `MIN_REPORTED_CONFIDENCE`,
/// sorted by descending confidence. Ties keep input order.
pub fn detect_duplicates(candidate: &LeadRecord, existing: &[LeadRecord]) -> Vec<DuplicateMatch> {
    let mut matches: Vec<DuplicateMatch> = existing
        .iter()
        .filter_map(|lead| compare_leads(candidate, lead))
        .collect();

    // sort_by is stable
    matches.sort_by(|a, b| b.confidence.cmp(&a.confidence));

    tracing::debug!(
        "Duplicate check for '{}': {} candidate(s) above threshold out of {}",
        candidate.company_name,
        matches.len(),
        existing.len()
    );

    matches
}

fn compare_leads(candidate: &LeadRecord, existing: &LeadRecord) -> Option<DuplicateMatch> {
    let mut confidence = 0;
    let mut reasons = Vec::new();

    if similar_company_names(&candidate.company_name, &existing.company_name) {
        confidence += W_COMPANY_NAME;
        reasons.push("Similar company name".to_string());
    }

    // Raw comparison, no scheme or case normalization
    if !candidate.company_website.is_empty()
        && candidate.company_website == existing.company_website
    {
        confidence += W_WEBSITE;
        reasons.push("Same website".to_string());
    }

    let (shared, total) = contact_overlap_counts(&candidate.contacts, &existing.contacts);
    if shared > 0 {
        // Rounded up so the integer sum clears the threshold whenever the exact one does
        confidence += (W_CONTACT_OVERLAP * shared).div_ceil(total);
        reasons.push(format!(
            "Contact overlap: {:.0}%",
            f64::from(shared) * 100.0 / f64::from(total)
        ));
    }

    if has_matching_contact(&candidate.contacts, &existing.contacts) {
        confidence += W_CONTACT_MATCH;
        reasons.push("Matching contact information".to_string());
    }

    let confidence = confidence.min(MAX_CONFIDENCE);
    if confidence <= MIN_REPORTED_CONFIDENCE {
        return None;
    }

    Some(DuplicateMatch {
        existing_lead_id: existing.id,
        confidence,
        reasons,
    })
}

/// Company names match when equal after lowercasing and trimming, equal
/// once a common legal suffix is dropped from both, or when they share at
/// least two words.
pub fn similar_company_names(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }

    let suffix_match = COMPANY_SUFFIXES.iter().any(|suffix| {
        let stripped_a = a.strip_suffix(*suffix).unwrap_or(a.as_str());
        let stripped_b = b.strip_suffix(*suffix).unwrap_or(b.as_str());
        stripped_a == stripped_b
    });
    if suffix_match {
        return true;
    }

    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();
    words_a.intersection(&words_b).count() >= 2
}

fn non_blank(values: &[String]) -> impl Iterator<Item = &str> {
    values
        .iter()
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

/// Share of the existing lead's contacts reachable through the candidate's
/// emails or phones, in [0, 1].
pub fn contact_overlap_ratio(candidate: &[Contact], existing: &[Contact]) -> f64 {
    match contact_overlap_counts(candidate, existing) {
        (0, _) => 0.0,
        (shared, total) => f64::from(shared) / f64::from(total),
    }
}

/// Existing contacts reachable through the candidate's channels, and the
/// existing contact count.
fn contact_overlap_counts(candidate: &[Contact], existing: &[Contact]) -> (u32, u32) {
    if candidate.is_empty() || existing.is_empty() {
        return (0, 0);
    }

    let emails: HashSet<&str> = candidate.iter().flat_map(|c| non_blank(&c.emails)).collect();
    let phones: HashSet<&str> = candidate.iter().flat_map(|c| non_blank(&c.phones)).collect();

    let matched = existing
        .iter()
        .filter(|contact| {
            non_blank(&contact.emails).any(|email| emails.contains(email))
                || non_blank(&contact.phones).any(|phone| phones.contains(phone))
        })
        .count();

    (
        u32::try_from(matched).unwrap_or(u32::MAX),
        u32::try_from(existing.len()).unwrap_or(u32::MAX),
    )
}

/// True as soon as any candidate contact shares an email or a phone with
/// any existing contact.
pub fn has_matching_contact(candidate: &[Contact], existing: &[Contact]) -> bool {
    candidate.iter().any(|ours| {
        existing.iter().any(|theirs| {
            non_blank(&ours.emails).any(|email| theirs.emails.iter().any(|e| e == email))
                || non_blank(&ours.phones).any(|phone| theirs.phones.iter().any(|p| p == phone))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(id: i64, name: &str, website: &str) -> LeadRecord {
        LeadRecord {
            id: Some(id),
            company_name: name.to_string(),
            company_website: website.to_string(),
            ..Default::default()
        }
    }

    fn contact(emails: &[&str], phones: &[&str]) -> Contact {
        Contact {
            emails: emails.iter().map(|s| s.to_string()).collect(),
            phones: phones.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_suffix_stripped_name_and_same_website() {
        let candidate = lead(0, "Acme Inc", "https://acme.com");
        let existing = vec![lead(7, "Acme", "https://acme.com")];

        let matches = detect_duplicates(&candidate, &existing);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].existing_lead_id, Some(7));
        assert_eq!(matches[0].confidence, 55);
        assert_eq!(matches[0].reasons, vec!["Similar company name", "Same website"]);
    }

    #[test]
    fn test_company_name_variants() {
        assert!(similar_company_names("  ACME Corp ", "acme corp"));
        assert!(similar_company_names("Initech LLC", "initech"));
        assert!(similar_company_names("Stark Company", "Stark"));
        assert!(similar_company_names("Blue Ocean Logistics", "Blue Ocean Freight"));
        assert!(!similar_company_names("Blue Logistics", "Red Logistics"));
        assert!(!similar_company_names("", ""));
        assert!(!similar_company_names("Acme", ""));
    }

    #[test]
    fn test_website_match_is_case_sensitive_and_needs_a_value() {
        let candidate = lead(0, "One", "https://Acme.com");
        let existing = vec![lead(1, "Two", "https://acme.com")];
        assert!(detect_duplicates(&candidate, &existing).is_empty());

        let blank = lead(0, "Alpha", "");
        let existing = vec![lead(2, "Beta", "")];
        assert!(detect_duplicates(&blank, &existing).is_empty());
    }

    #[test]
    fn test_shared_email_adds_overlap_and_direct_match() {
        let mut candidate = lead(0, "Alpha", "");
        candidate.contacts = vec![contact(&["ana@alpha.com"], &[])];
        let mut existing = lead(3, "Beta", "");
        existing.contacts = vec![
            contact(&["ana@alpha.com"], &[]),
            contact(&["bob@beta.com"], &[]),
        ];

        let matches = detect_duplicates(&candidate, &[existing]);
        assert_eq!(matches.len(), 1);
        // 20 * 0.5 overlap + 15 direct match
        assert_eq!(matches[0].confidence, 25);
        assert_eq!(
            matches[0].reasons,
            vec!["Contact overlap: 50%", "Matching contact information"]
        );
    }

    #[test]
    fn test_weak_overlap_alone_is_not_reported() {
        let mut candidate = lead(0, "Alpha", "");
        candidate.contacts = vec![contact(&[], &["555-0100"])];
        let mut existing = lead(4, "Beta", "");
        existing.contacts = (0..5)
            .map(|i| contact(&[], &[if i == 0 { "555-0100" } else { "555-0199" }]))
            .collect();

        // 20 * 0.2 = 4, plus 15 for the direct match: 19
        assert!(detect_duplicates(&candidate, &[existing]).is_empty());
    }

    #[test]
    fn test_partial_overlap_just_above_threshold_is_reported() {
        let mut candidate = lead(0, "Alpha", "");
        candidate.contacts = vec![contact(&[], &["5550100000", "5550100001", "5550100002"])];
        let mut existing = lead(6, "Beta", "");
        existing.contacts = (0..11)
            .map(|i| contact(&[], &[format!("55501000{:02}", i).as_str()]))
            .collect();

        // 20 * 3/11 = 5.45 rounds up to 6, plus 15 for the direct match
        let matches = detect_duplicates(&candidate, &[existing]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].confidence, 21);
        assert_eq!(
            matches[0].reasons,
            vec!["Contact overlap: 27%", "Matching contact information"]
        );
    }

    #[test]
    fn test_overlap_ratio_bounds() {
        let ours = vec![contact(&["a@x.com"], &["111"])];
        assert_eq!(contact_overlap_ratio(&ours, &[]), 0.0);
        assert_eq!(contact_overlap_ratio(&[], &ours), 0.0);
        assert_eq!(contact_overlap_ratio(&ours, &ours), 1.0);

        let theirs = vec![contact(&["b@x.com"], &["222"]), contact(&[], &["111"])];
        assert_eq!(contact_overlap_ratio(&ours, &theirs), 0.5);
    }

    #[test]
    fn test_blank_channels_never_match() {
        let ours = vec![contact(&[""], &["  "])];
        let theirs = vec![contact(&[""], &["  "])];
        assert_eq!(contact_overlap_ratio(&ours, &theirs), 0.0);
        assert!(!has_matching_contact(&ours, &theirs));
    }

    #[test]
    fn test_confidence_is_capped_and_sorted() {
        let mut candidate = lead(0, "Acme Widgets Inc", "https://acme.com");
        candidate.contacts = vec![contact(&["ceo@acme.com"], &["5550100000"])];

        let mut full = lead(1, "Acme Widgets", "https://acme.com");
        full.contacts = vec![contact(&["ceo@acme.com"], &[])];
        let name_only = lead(2, "acme widgets inc", "");
        let unrelated = lead(3, "Globex", "https://globex.com");

        let matches = detect_duplicates(&candidate, &[name_only, unrelated, full]);
        let ids: Vec<_> = matches.iter().map(|m| m.existing_lead_id).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
        // 30 + 25 + 20 + 15 = 90
        assert_eq!(matches[0].confidence, 90);
        assert_eq!(matches[1].confidence, 30);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let candidate = lead(0, "Acme", "https://acme.com");
        let existing = vec![
            lead(10, "Other", "https://acme.com"),
            lead(11, "Acme", "https://acme.org"),
            lead(12, "Different", "https://acme.com"),
        ];
        let ids: Vec<_> = detect_duplicates(&candidate, &existing)
            .iter()
            .map(|m| m.existing_lead_id)
            .collect();
        assert_eq!(ids, vec![Some(11), Some(10), Some(12)]);
    }
}
