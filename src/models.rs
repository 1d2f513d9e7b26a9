use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============ Input Models ============

/// A lead as supplied by the host application.
///
/// Used both for the lead being scored and for every existing lead it is
/// compared against. Every field is optional on the wire; missing or
/// ill-typed values are coerced here so the scoring and duplicate logic
/// never has to deal with absent data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    /// Identifier of the lead in the host's storage.
    #[serde(default, deserialize_with = "de_opt_i64_loose")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "de_string_loose")]
    pub company_name: String,
    #[serde(default, deserialize_with = "de_string_loose")]
    pub company_website: String,
    #[serde(default, deserialize_with = "de_string_loose")]
    pub industry: String,
    #[serde(default, deserialize_with = "de_string_loose")]
    pub country: String,
    /// Annual revenue, never negative.
    #[serde(default, deserialize_with = "de_revenue_loose")]
    pub revenue: f64,
    #[serde(default, deserialize_with = "de_string_loose")]
    pub source: String,
    #[serde(default, deserialize_with = "de_string_loose")]
    pub notes: String,
    #[serde(default, deserialize_with = "de_contacts_loose")]
    pub contacts: Vec<Contact>,
}

/// A person attached to a lead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, deserialize_with = "de_string_loose")]
    pub name: String,
    /// Job title, used for decision-maker detection.
    #[serde(default, deserialize_with = "de_string_loose")]
    pub position: String,
    #[serde(default, deserialize_with = "de_string_list_loose")]
    pub phones: Vec<String>,
    #[serde(default, deserialize_with = "de_string_list_loose")]
    pub emails: Vec<String>,
    #[serde(default, deserialize_with = "de_socials_loose")]
    pub socials: Vec<SocialProfile>,
}

/// A social profile link of a contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialProfile {
    #[serde(default, deserialize_with = "de_string_loose")]
    pub url: String,
    #[serde(rename = "type", default, deserialize_with = "de_string_loose")]
    pub kind: String,
}

// ============ Scoring Output ============

/// Per-dimension scores, each in [0, 10].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreFactors {
    pub company_quality: u8,
    pub contact_quality: u8,
    pub market_potential: u8,
    pub data_completeness: u8,
}

impl ScoreFactors {
    /// Neutral factors reported by the fallback scorer.
    pub fn neutral() -> Self {
        Self {
            company_quality: 5,
            contact_quality: 5,
            market_potential: 5,
            data_completeness: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    /// Parses the service's label; unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowupTiming {
    Immediate,
    #[serde(rename = "within_24h")]
    Within24h,
    WithinWeek,
    LowPriority,
}

impl FollowupTiming {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "immediate" => Some(Self::Immediate),
            "within_24h" => Some(Self::Within24h),
            "within_week" => Some(Self::WithinWeek),
            "low_priority" => Some(Self::LowPriority),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Within24h => "within_24h",
            Self::WithinWeek => "within_week",
            Self::LowPriority => "low_priority",
        }
    }
}

/// Quality assessment of one lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Overall quality, 1 (worst) to 10 (best).
    pub score: u8,
    pub reasoning: String,
    pub factors: ScoreFactors,
    /// Self-reported certainty, in [0, 1].
    pub confidence: f64,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<String>,
    pub priority_level: PriorityLevel,
    pub suggested_followup_timing: FollowupTiming,
    /// `false` when the result came from the local fallback.
    pub success: bool,
}

// ============ Duplicate Output ============

/// One existing lead that resembles the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    pub existing_lead_id: Option<i64>,
    /// Sum of the triggered signal weights, capped at 100.
    pub confidence: u32,
    /// One entry per triggered signal, in evaluation order.
    pub reasons: Vec<String>,
}

// ============ Lenient Deserializers ============

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        // Arrays and objects carry no usable text
        _ => None,
    }
}

fn de_string_loose<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(value_to_string).unwrap_or_default())
}

fn de_string_list_loose<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let list = match raw {
        Some(Value::Array(items)) => items.into_iter().filter_map(value_to_string).collect(),
        // A single bare value is treated as a one-element list
        Some(other) => value_to_string(other).into_iter().collect(),
        None => Vec::new(),
    };
    Ok(list)
}

fn de_opt_i64_loose<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(parsed)
}

fn de_revenue_loose<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed
        .filter(|revenue| revenue.is_finite() && *revenue > 0.0)
        .unwrap_or(0.0))
}

fn de_contacts_loose<'de, D>(deserializer: D) -> Result<Vec<Contact>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let contacts = match raw {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter(|item| item.is_object())
            .filter_map(|item| serde_json::from_value::<Contact>(item).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(contacts)
}

fn de_socials_loose<'de, D>(deserializer: D) -> Result<Vec<SocialProfile>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let socials = match raw {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter(|item| item.is_object())
            .filter_map(|item| serde_json::from_value::<SocialProfile>(item).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(socials)
}
