use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriteriaType {
    Streak,
    TotalCompletions,
}

impl CriteriaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CriteriaType::Streak => "STREAK",
            CriteriaType::TotalCompletions => "TOTAL_COMPLETIONS",
        }
    }
}

impl FromStr for CriteriaType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STREAK" => Ok(CriteriaType::Streak),
            "TOTAL_COMPLETIONS" => Ok(CriteriaType::TotalCompletions),
            _ => Err(anyhow::anyhow!("Unknown achievement criteria: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: i64,
    pub key: String,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub criteria_type: CriteriaType,
    pub criteria_value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementProgress {
    pub achievement: Achievement,
    pub progress: u32,
    pub unlocked: bool,
    pub unlocked_at: Option<String>,
}

impl AchievementProgress {
    pub fn percent(&self) -> u32 {
        let target = self.achievement.criteria_value.max(1);
        ((self.progress as f64 / target as f64) * 100.0).round().min(100.0) as u32
    }
}
