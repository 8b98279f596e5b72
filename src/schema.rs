use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{BriefAnalyzerError, Result};

/// Rescale a score reported on an unknown scale onto 0–10.
///
/// Models answer with 0–1, 0–10 or 0–100 depending on the run. Values up to 10
/// are returned unchanged, values up to 100 are divided by 10, anything larger by 100.
pub fn normalize_score(x: f64) -> f64 {
    if x <= 10.0 {
        x
    } else if x <= 100.0 {
        x / 10.0
    } else {
        x / 100.0
    }
}

/// A coherence/completeness score stored canonically in `[0, 1]`.
///
/// Conversion from whatever scale the model used happens once, at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    pub fn from_raw(raw: f64) -> std::result::Result<Self, String> {
        if !raw.is_finite() || raw < 0.0 {
            return Err(format!("score {} is not a non-negative number", raw));
        }
        let unit = if raw <= 1.0 {
            raw
        } else {
            normalize_score(raw) / 10.0
        };
        Ok(Self(unit.min(1.0)))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Score on the 0–10 display scale.
    pub fn out_of_ten(self) -> f64 {
        self.0 * 10.0
    }

    /// Display form, e.g. `7.5/10`.
    pub fn display(self) -> String {
        format!("{:.1}/10", self.out_of_ten())
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Score::from_raw(raw).map_err(serde::de::Error::custom)
    }
}

fn non_negative_hours<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let hours = f64::deserialize(deserializer)?;
    if !hours.is_finite() || hours < 0.0 {
        return Err(serde::de::Error::custom(format!(
            "estimated hours {} must be a non-negative number",
            hours
        )));
    }
    Ok(hours)
}

/// Whole, non-negative count. Models sometimes write `3.0` for `3`.
fn whole_count<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let count = f64::deserialize(deserializer)?;
    if !count.is_finite() || count < 0.0 || count.fract() != 0.0 || count > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "team size {} must be a whole non-negative number",
            count
        )));
    }
    Ok(count as u32)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "High", alias = "HIGH")]
    High,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }

    /// Marker colour used by the report: red, orange, green.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Level::High => (231, 76, 60),
            Level::Medium => (243, 156, 18),
            Level::Low => (46, 204, 113),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Analysis {
    #[schemars(description = "What the brief already does well")]
    pub strengths: Vec<String>,
    #[schemars(description = "Ambiguities, contradictions or risks in the brief")]
    pub weaknesses: Vec<String>,
    #[schemars(description = "Information a project team would still need")]
    pub missing_information: Vec<String>,
    #[schemars(description = "How internally consistent the brief is, between 0 and 1")]
    pub coherence_score: Score,
    #[schemars(description = "How complete the brief is, between 0 and 1")]
    pub completeness_score: Score,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ClarificationQuestion {
    pub question: String,
    pub category: String,
    pub importance: Level,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Approach {
    pub title: String,
    pub description: String,
    pub benefits: Vec<String>,
    pub considerations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct AlternativeViews {
    pub functional_approaches: Vec<Approach>,
    pub technical_approaches: Vec<Approach>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Task {
    pub name: String,
    #[serde(deserialize_with = "non_negative_hours")]
    #[schemars(with = "f64", range(min = 0))]
    pub estimated_hours: f64,
    pub priority: Level,
    #[schemars(description = "Names of tasks that must be finished first")]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Phase {
    pub name: String,
    pub objectives: Vec<String>,
    pub deliverables: Vec<String>,
    pub tasks: Vec<Task>,
}

impl Phase {
    pub fn total_hours(&self) -> f64 {
        self.tasks.iter().map(|t| t.estimated_hours).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ProjectStructure {
    pub phases: Vec<Phase>,
    #[serde(deserialize_with = "non_negative_hours")]
    #[schemars(with = "f64", range(min = 0))]
    pub estimated_total_hours: f64,
    #[serde(deserialize_with = "whole_count")]
    #[schemars(with = "u32")]
    pub recommended_team_size: u32,
}

impl ProjectStructure {
    /// `(phase name, summed task hours)` in phase order.
    pub fn phase_hours(&self) -> Vec<(String, f64)> {
        self.phases
            .iter()
            .map(|p| (p.name.clone(), p.total_hours()))
            .collect()
    }
}

/// The validated model answer. Never mutated after ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct AnalysisResult {
    pub analysis: Analysis,
    pub clarification_questions: Vec<ClarificationQuestion>,
    pub alternative_views: AlternativeViews,
    pub project_structure: ProjectStructure,
}

impl AnalysisResult {
    /// Strict, all-or-nothing parse of the model's textual payload.
    pub fn from_model_output(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| {
            BriefAnalyzerError::MalformedResponse(format!("payload does not match schema: {}", e))
        })
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn json_schema() -> serde_json::Value {
        let schema = schemars::schema_for!(AnalysisResult);
        serde_json::to_value(&schema).unwrap_or(serde_json::Value::Null)
    }
}
