/// Lead assessment workflow shared by the batch binary and host applications
///
/// This module ties the scorer and the duplicate detector together the way a
/// lead-creation handler uses them:
/// 1. Score the lead (AI call or fallback)
/// 2. Project a successful score onto persistable fields
/// 3. Detect duplicates among existing leads
/// 4. Flag the lead when the best match clears the acceptance threshold
use crate::duplicates::detect_duplicates;
use crate::models::{DuplicateMatch, LeadRecord, ScoreResult};
use crate::scoring::LeadScorer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version tag stored alongside every persisted AI score.
pub const SCORE_VERSION: &str = "1.0";

/// Duplicate marker for a lead whose best match clears the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateFlag {
    pub original_lead_id: Option<i64>,
    pub confidence: u32,
    pub reasons: Vec<String>,
}

/// Flags the top match when its confidence is strictly above `threshold`.
///
/// `matches` must be ordered best first, as returned by `detect_duplicates`.
pub fn flag_duplicate(matches: &[DuplicateMatch], threshold: u32) -> Option<DuplicateFlag> {
    let best = matches.first()?;
    if best.confidence <= threshold {
        return None;
    }

    Some(DuplicateFlag {
        original_lead_id: best.existing_lead_id,
        confidence: best.confidence,
        reasons: best.reasons.clone(),
    })
}

/// AI scoring fields as a relational lead table stores them.
///
/// Structured fields are serialized to JSON text for stores without
/// native document columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRecord {
    pub ai_score: u8,
    pub ai_score_reasoning: String,
    pub ai_confidence: f64,
    pub ai_priority_level: String,
    pub ai_suggested_followup_timing: String,
    pub ai_score_factors: String,
    pub ai_recommendations: String,
    pub ai_risk_factors: String,
    pub ai_last_scored: DateTime<Utc>,
    pub ai_score_version: String,
}

impl ScoringRecord {
    /// Builds the record for a successful AI score.
    ///
    /// Fallback results are not persisted, so this returns `None` for them.
    pub fn from_result(
        result: &ScoreResult,
        scored_at: DateTime<Utc>,
    ) -> serde_json::Result<Option<Self>> {
        if !result.success {
            return Ok(None);
        }

        Ok(Some(Self {
            ai_score: result.score,
            ai_score_reasoning: result.reasoning.clone(),
            ai_confidence: result.confidence,
            ai_priority_level: result.priority_level.as_str().to_string(),
            ai_suggested_followup_timing: result.suggested_followup_timing.as_str().to_string(),
            ai_score_factors: serde_json::to_string(&result.factors)?,
            ai_recommendations: serde_json::to_string(&result.recommendations)?,
            ai_risk_factors: serde_json::to_string(&result.risk_factors)?,
            ai_last_scored: scored_at,
            ai_score_version: SCORE_VERSION.to_string(),
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    High,
    Good,
    NeedsAttention,
}

impl QualityTier {
    pub fn from_score(score: u8) -> Self {
        if score >= 8 {
            QualityTier::High
        } else if score >= 6 {
            QualityTier::Good
        } else {
            QualityTier::NeedsAttention
        }
    }
}

/// Outcome of scoring and duplicate-checking one lead.
#[derive(Debug, Clone, Serialize)]
pub struct LeadAssessment {
    pub lead_id: Option<i64>,
    pub scoring: ScoreResult,
    /// Present only when the AI call succeeded.
    pub record: Option<ScoringRecord>,
    pub duplicates: Vec<DuplicateMatch>,
    pub duplicate_flag: Option<DuplicateFlag>,
}

impl LeadAssessment {
    pub fn quality_tier(&self) -> QualityTier {
        QualityTier::from_score(self.scoring.score)
    }

    /// One-line summary for the user who saved the lead.
    pub fn status_message(&self) -> String {
        if !self.scoring.success {
            return "Lead saved! (AI scoring unavailable)".to_string();
        }

        let score = self.scoring.score;
        match self.quality_tier() {
            QualityTier::High => format!("Lead saved! AI Score: {}/10 - High Quality Lead!", score),
            QualityTier::Good => format!("Lead saved! AI Score: {}/10 - Good Quality Lead!", score),
            QualityTier::NeedsAttention => {
                format!("Lead saved! AI Score: {}/10 - Needs attention", score)
            }
        }
    }
}

/// Complete assessment workflow for a lead
///
/// Scoring and duplicate detection are independent: duplicates are checked
/// even when the scorer had to fall back.
pub async fn assess_lead(
    scorer: &LeadScorer,
    candidate: &LeadRecord,
    existing: &[LeadRecord],
    duplicate_threshold: u32,
) -> LeadAssessment {
    tracing::info!(
        "Assessing lead {:?} ('{}') against {} existing lead(s)",
        candidate.id,
        candidate.company_name,
        existing.len()
    );

    // Step 1: Score
    let scoring = scorer.score(candidate).await;

    // Step 2: Persistable projection
    let record = match ScoringRecord::from_result(&scoring, Utc::now()) {
        Ok(record) => record,
        Err(e) => {
            tracing::error!("Failed to serialize scoring fields: {}", e);
            None
        }
    };

    // Step 3: Duplicates
    let duplicates = detect_duplicates(candidate, existing);

    // Step 4: Flag
    let duplicate_flag = flag_duplicate(&duplicates, duplicate_threshold);
    if let Some(ref flag) = duplicate_flag {
        tracing::warn!(
            "⚠ Lead {:?} flagged as duplicate of {:?} ({}%): {}",
            candidate.id,
            flag.original_lead_id,
            flag.confidence,
            flag.reasons.join(", ")
        );
    }

    LeadAssessment {
        lead_id: candidate.id,
        scoring,
        record,
        duplicates,
        duplicate_flag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FollowupTiming, PriorityLevel, ScoreFactors};
    use crate::scoring::fallback;

    fn ai_result(score: u8) -> ScoreResult {
        ScoreResult {
            score,
            reasoning: "Good fit".to_string(),
            factors: ScoreFactors {
                company_quality: 8,
                contact_quality: 7,
                market_potential: 9,
                data_completeness: 6,
            },
            confidence: 0.9,
            recommendations: vec!["Book a demo".to_string()],
            risk_factors: vec![],
            priority_level: PriorityLevel::High,
            suggested_followup_timing: FollowupTiming::Immediate,
            success: true,
        }
    }

    fn dup(id: i64, confidence: u32) -> DuplicateMatch {
        DuplicateMatch {
            existing_lead_id: Some(id),
            confidence,
            reasons: vec!["Same website".to_string()],
        }
    }

    #[test]
    fn test_flag_requires_strictly_greater_than_threshold() {
        assert_eq!(flag_duplicate(&[dup(1, 70)], 70), None);
        let flag = flag_duplicate(&[dup(2, 71), dup(3, 95)], 70).unwrap();
        // Only the first entry is considered
        assert_eq!(flag.original_lead_id, Some(2));
        assert_eq!(flag.confidence, 71);
        assert_eq!(flag_duplicate(&[], 70), None);
    }

    #[test]
    fn test_record_serializes_structured_fields() {
        let now = Utc::now();
        let record = ScoringRecord::from_result(&ai_result(9), now)
            .unwrap()
            .unwrap();
        assert_eq!(record.ai_score, 9);
        assert_eq!(record.ai_priority_level, "high");
        assert_eq!(record.ai_suggested_followup_timing, "immediate");
        assert_eq!(record.ai_recommendations, r#"["Book a demo"]"#);
        assert_eq!(record.ai_risk_factors, "[]");
        assert_eq!(record.ai_score_version, SCORE_VERSION);
        assert_eq!(record.ai_last_scored, now);

        let factors: ScoreFactors = serde_json::from_str(&record.ai_score_factors).unwrap();
        assert_eq!(factors.market_potential, 9);
    }

    #[test]
    fn test_fallback_results_are_not_persisted() {
        let result = fallback(&LeadRecord::default());
        assert_eq!(ScoringRecord::from_result(&result, Utc::now()).unwrap(), None);
    }

    #[test]
    fn test_quality_tiers() {
        assert_eq!(QualityTier::from_score(10), QualityTier::High);
        assert_eq!(QualityTier::from_score(8), QualityTier::High);
        assert_eq!(QualityTier::from_score(7), QualityTier::Good);
        assert_eq!(QualityTier::from_score(6), QualityTier::Good);
        assert_eq!(QualityTier::from_score(5), QualityTier::NeedsAttention);
        assert_eq!(QualityTier::from_score(1), QualityTier::NeedsAttention);
    }

    #[tokio::test]
    async fn test_assess_lead_flags_duplicates_even_on_fallback() {
        let scorer = LeadScorer::fallback_only();
        let candidate = LeadRecord {
            id: Some(100),
            company_name: "Acme Widgets Inc".to_string(),
            company_website: "https://acme.com".to_string(),
            contacts: vec![crate::models::Contact {
                emails: vec!["ceo@acme.com".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        };
        let existing = vec![LeadRecord {
            id: Some(1),
            company_name: "Acme Widgets".to_string(),
            company_website: "https://acme.com".to_string(),
            contacts: vec![crate::models::Contact {
                emails: vec!["ceo@acme.com".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        }];

        let assessment = assess_lead(&scorer, &candidate, &existing, 70).await;
        assert!(!assessment.scoring.success);
        assert_eq!(assessment.record, None);
        assert_eq!(assessment.status_message(), "Lead saved! (AI scoring unavailable)");
        assert_eq!(assessment.duplicates.len(), 1);

        let flag = assessment.duplicate_flag.unwrap();
        assert_eq!(flag.original_lead_id, Some(1));
        assert_eq!(flag.confidence, 90);
    }

    #[test]
    fn test_status_message_for_ai_scores() {
        let assessment = LeadAssessment {
            lead_id: None,
            scoring: ai_result(8),
            record: None,
            duplicates: vec![],
            duplicate_flag: None,
        };
        assert_eq!(
            assessment.status_message(),
            "Lead saved! AI Score: 8/10 - High Quality Lead!"
        );
    }
}
