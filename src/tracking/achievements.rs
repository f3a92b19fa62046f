use crate::models::{Achievement, CriteriaType};

/// Built-in catalogue: (key, title, description, icon, criteria, value).
pub const BUILTIN: [(&str, &str, &str, &str, CriteriaType, u32); 6] = [
    ("first_step", "First Step", "Complete a habit for the first time", "🌱", CriteriaType::TotalCompletions, 1),
    ("getting_started", "Getting Started", "Log 10 completions", "🌟", CriteriaType::TotalCompletions, 10),
    ("week_warrior", "Week Warrior", "Keep a habit going for 7 days", "⚡", CriteriaType::Streak, 7),
    ("fortnight_focus", "Fortnight Focus", "Keep a habit going for 14 days", "🔥", CriteriaType::Streak, 14),
    ("monthly_master", "Monthly Master", "Keep a habit going for 30 days", "👑", CriteriaType::Streak, 30),
    ("century", "Century", "Log 100 completions", "💯", CriteriaType::TotalCompletions, 100),
];

/// Progress towards `achievement`, capped at its target, and whether it is reached.
pub fn evaluate(achievement: &Achievement, best_streak: u32, total_completions: u32) -> (u32, bool) {
    let raw = match achievement.criteria_type {
        CriteriaType::Streak => best_streak,
        CriteriaType::TotalCompletions => total_completions,
    };
    let progress = raw.min(achievement.criteria_value);
    (progress, raw >= achievement.criteria_value)
}

pub fn streak_emoji(streak: u32) -> &'static str {
    match streak {
        100.. => "💯",
        50.. => "🏆",
        30.. => "👑",
        14.. => "🔥",
        7.. => "⚡",
        3.. => "🌟",
        _ => "💪",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn achievement(criteria_type: CriteriaType, criteria_value: u32) -> Achievement {
        Achievement {
            id: 1,
            key: "test".to_string(),
            title: "Test".to_string(),
            description: None,
            icon: None,
            criteria_type,
            criteria_value,
        }
    }

    #[test]
    fn streak_criteria_uses_best_streak() {
        let a = achievement(CriteriaType::Streak, 7);
        assert_eq!(evaluate(&a, 3, 50), (3, false));
        assert_eq!(evaluate(&a, 7, 0), (7, true));
        assert_eq!(evaluate(&a, 12, 0), (7, true));
    }

    #[test]
    fn total_criteria_uses_completions() {
        let a = achievement(CriteriaType::TotalCompletions, 10);
        assert_eq!(evaluate(&a, 30, 4), (4, false));
        assert_eq!(evaluate(&a, 0, 10), (10, true));
    }

    #[test]
    fn builtin_keys_are_unique() {
        let mut keys: Vec<_> = BUILTIN.iter().map(|b| b.0).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), BUILTIN.len());
    }

    #[test]
    fn emoji_thresholds() {
        assert_eq!(streak_emoji(0), "💪");
        assert_eq!(streak_emoji(3), "🌟");
        assert_eq!(streak_emoji(7), "⚡");
        assert_eq!(streak_emoji(29), "🔥");
        assert_eq!(streak_emoji(30), "👑");
        assert_eq!(streak_emoji(120), "💯");
    }
}
