//! Prompt templates for the coaching flows.

use crate::models::TargetLevel;

/// System prompt for training plan generation.
pub const TRAINING_PLAN_SYSTEM_PROMPT: &str = r#"You are a world-class volleyball skills development coach.
You turn coach feedback into concrete training plans.
Respond with a single JSON object and nothing else."#;

/// System prompt for footage analysis.
pub const FOOTAGE_SYSTEM_PROMPT: &str = r#"You are an expert volleyball coach evaluating player highlight footage.
Your goal is constructive, actionable feedback, not a recruiting evaluation.
Respond with a single JSON object and nothing else."#;

/// Build the user prompt for a training plan.
pub fn training_plan_prompt(feedback: &str, position: &str) -> String {
    let position = if position.trim().is_empty() {
        "volleyball player"
    } else {
        position.trim()
    };

    let mut prompt = String::new();
    prompt.push_str(&format!(
        "Based on the coach feedback provided for a player who is a {}, create a personalized training plan.\n\n",
        position
    ));
    prompt.push_str("The plan should include:\n");
    prompt.push_str("1. A set of clear, actionable steps and drills the player can perform.\n");
    prompt.push_str("2. A list of suggested YouTube videos that demonstrate these drills or related concepts.\n\n");
    prompt.push_str("Prioritize the most critical areas for improvement identified in the feedback.\n\n");
    prompt.push_str("Coach Feedback:\n\"");
    prompt.push_str(feedback);
    prompt.push_str("\"\n\n");
    prompt.push_str("Output JSON in exactly this shape:\n");
    prompt.push_str(r#"{"actionableSteps": [{"title": "Drill title", "description": "What to do and why"}], "suggestedVideos": [{"title": "Video title", "url": "https://www.youtube.com/watch?v=..."}]}"#);
    prompt.push_str("\n\nEnsure the video URLs are valid and relevant.");
    prompt
}

/// Build the user prompt for a footage assessment.
pub fn footage_prompt(video_url: &str, target: TargetLevel, preferred_schools: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("Identify the player's strengths and weaknesses based on the footage provided, tailored to their target level of play.\n");
    prompt.push_str("Consider the player's preferred schools for context only.\n\n");
    prompt.push_str(&format!("Video Footage: {}\n", video_url));
    prompt.push_str(&format!("Target Level: {}\n", target));
    prompt.push_str(&format!("Preferred Schools: {}\n\n", preferred_schools));
    prompt.push_str("Focus on where the player excels and what must improve to reach the target level. Be specific.\n\n");
    prompt.push_str("Output JSON in exactly this shape:\n");
    prompt.push_str(r#"{"strengths": "...", "weaknesses": "...", "overallAssessment": "..."}"#);
    prompt
}
