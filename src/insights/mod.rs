//! AI coaching: prompt construction, reply parsing and canned fallbacks.
//!
//! Every public function here returns something printable even when the
//! model cannot be reached; failures are logged and replaced by fallbacks.

pub mod gemini;

use log::warn;

use crate::models::{HabitSuggestion, HabitSummary};

pub use gemini::{AiError, GeminiClient, TextGenerator};

pub const DEFAULT_GOALS: &str = "improve overall wellness and productivity";

pub const WELCOME_MESSAGE: &str = "Welcome to your habit tracking journey! Start by creating your \
first habit and track it daily to build momentum. I'll provide personalized insights as you build \
your routine.";

pub const FALLBACK_INSIGHT: &str = "Great job on tracking your habits! Keep building those positive \
routines, and remember that consistency is more important than perfection. Every small step counts \
toward your goals. Focus on progress, not perfection!";

pub const CATEGORIES: [&str; 10] = [
    "Health",
    "Fitness",
    "Productivity",
    "Learning",
    "Personal",
    "Social",
    "Finance",
    "Career",
    "Creativity",
    "Mindfulness",
];

pub fn insight_prompt(summaries: &[HabitSummary]) -> String {
    let data = serde_json::to_string_pretty(summaries).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Analyze this habit tracking data and provide personalized insights:\n\
         {data}\n\n\
         Please provide an encouraging analysis in 3-4 sentences covering:\n\
         1. Overall progress and what's going well\n\
         2. Specific patterns you notice\n\
         3. One actionable suggestion for improvement\n\
         4. Motivational message for continued success\n\n\
         Keep the tone positive, personal, and actionable. Focus on progress made.\n\
         Write in a friendly, supportive tone as if you're a personal coach."
    )
}

pub fn suggestion_prompt(goals: &str) -> String {
    format!(
        "Based on these goals: \"{goals}\"\n\n\
         Suggest 3 specific, achievable daily habits that would help achieve these goals.\n\n\
         Return a valid JSON array with objects containing exactly these fields:\n\
         - name: string (specific habit name)\n\
         - description: string (brief description of the habit)\n\
         - category: string (one of: {categories})\n\n\
         Make suggestions practical, measurable, and beginner-friendly.\n\n\
         Example format:\n\
         [\n  {{\n    \"name\": \"Morning Meditation\",\n    \
         \"description\": \"5 minutes of mindfulness meditation\",\n    \
         \"category\": \"Mindfulness\"\n  }}\n]",
        categories = CATEGORIES.join(", ")
    )
}

/// Pull the first `[ ... ]` span out of a reply that may be wrapped in prose
/// or a fenced code block.
pub fn parse_suggestions(reply: &str) -> Result<Vec<HabitSuggestion>, AiError> {
    let json = match (reply.find('['), reply.rfind(']')) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => reply.trim().trim_start_matches("```json").trim_matches('`').trim(),
    };
    serde_json::from_str(json).map_err(|e| AiError::Serde(e.to_string()))
}

pub fn fallback_suggestions() -> Vec<HabitSuggestion> {
    vec![
        HabitSuggestion::new(
            "Morning Walk",
            "Take a 10-minute walk to start your day",
            "Health",
        ),
        HabitSuggestion::new(
            "Deep Work Session",
            "Focus on important tasks for 25 minutes",
            "Productivity",
        ),
        HabitSuggestion::new(
            "Evening Reflection",
            "Spend 5 minutes reflecting on the day",
            "Personal",
        ),
    ]
}

/// Coaching text for the given habits.
pub fn generate_insights(
    generator: Result<&dyn TextGenerator, AiError>,
    summaries: &[HabitSummary],
) -> String {
    if summaries.is_empty() {
        return WELCOME_MESSAGE.to_string();
    }
    let result = generator.and_then(|g| g.generate(&insight_prompt(summaries)));
    match result {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!("Falling back to canned insight: {}", e);
            FALLBACK_INSIGHT.to_string()
        }
    }
}

/// Three habit ideas for `goals`; empty goals use [`DEFAULT_GOALS`].
pub fn generate_suggestions(
    generator: Result<&dyn TextGenerator, AiError>,
    goals: &str,
) -> Vec<HabitSuggestion> {
    let goals = if goals.trim().is_empty() { DEFAULT_GOALS } else { goals.trim() };
    let result = generator
        .and_then(|g| g.generate(&suggestion_prompt(goals)))
        .and_then(|reply| parse_suggestions(&reply));
    match result {
        Ok(suggestions) if !suggestions.is_empty() => suggestions,
        Ok(_) => {
            warn!("Model returned no suggestions, using defaults");
            fallback_suggestions()
        }
        Err(e) => {
            warn!("Falling back to default suggestions: {}", e);
            fallback_suggestions()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Canned {
        reply: Result<String, AiError>,
        prompts: RefCell<Vec<String>>,
    }

    impl Canned {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(AiError::Timeout),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for Canned {
        fn generate(&self, prompt: &str) -> Result<String, AiError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.reply.clone()
        }
    }

    fn summary() -> HabitSummary {
        HabitSummary {
            name: "Read".to_string(),
            category: "Learning".to_string(),
            completed_days: 4,
            total_days: 5,
            recent_streak: 2,
        }
    }

    #[test]
    fn no_habits_returns_welcome_without_calling_the_model() {
        let canned = Canned::ok("unused");
        let text = generate_insights(Ok(&canned), &[]);
        assert_eq!(text, WELCOME_MESSAGE);
        assert!(canned.prompts.borrow().is_empty());
    }

    #[test]
    fn insight_prompt_embeds_habit_data() {
        let canned = Canned::ok("  You're doing great.  ");
        let text = generate_insights(Ok(&canned), &[summary()]);
        assert_eq!(text, "You're doing great.");
        let prompts = canned.prompts.borrow();
        assert!(prompts[0].contains("\"recentStreak\": 2"));
        assert!(prompts[0].contains("\"completedDays\": 4"));
    }

    #[test]
    fn failed_insight_uses_fallback() {
        let canned = Canned::failing();
        assert_eq!(generate_insights(Ok(&canned), &[summary()]), FALLBACK_INSIGHT);
        assert_eq!(
            generate_insights(Err(AiError::MissingApiKey("K".into())), &[summary()]),
            FALLBACK_INSIGHT
        );
    }

    #[test]
    fn suggestions_are_extracted_from_fenced_reply() {
        let reply = "Here you go:\n```json\n[\n  {\"name\": \"Stretch\", \"description\": \"5 minutes\", \"category\": \"Fitness\"}\n]\n```";
        let parsed = parse_suggestions(reply).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "Stretch");
        assert_eq!(parsed[0].category, "Fitness");
    }

    #[test]
    fn unparseable_suggestions_fall_back() {
        let canned = Canned::ok("I cannot help with that.");
        let suggestions = generate_suggestions(Ok(&canned), "");
        assert_eq!(suggestions, fallback_suggestions());
        assert!(canned.prompts.borrow()[0].contains(DEFAULT_GOALS));
    }

    #[test]
    fn empty_suggestion_list_falls_back() {
        let canned = Canned::ok("[]");
        assert_eq!(generate_suggestions(Ok(&canned), "sleep better").len(), 3);
    }

    #[test]
    fn goals_are_quoted_in_prompt() {
        let prompt = suggestion_prompt("run a marathon");
        assert!(prompt.contains("\"run a marathon\""));
        assert!(prompt.contains("Mindfulness"));
    }
}
