//! Mentor guidance contract: profiles, request validation, reply parsing, and fallbacks.
//!
//! The hosted model call lives outside this crate behind [`MentorAdvisor`].
//! Everything here is deterministic so hosts can rely on a usable
//! [`MentorResponse`] even when the advisor misbehaves.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_MENTOR, MISSIONS_PER_PATH};
use crate::paths::Location;

const DEFAULT_MENTOR_DATA: &str = include_str!("../assets/data/mentors.json");
const PROMPT_HISTORY_LIMIT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorProfile {
    pub name: String,
    pub specialty: String,
    #[serde(default)]
    pub path: Location,
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub expertise: String,
    #[serde(default)]
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MentorDirectory {
    #[serde(default)]
    pub mentors: Vec<MentorProfile>,
}

impl MentorDirectory {
    /// Load mentor profiles from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into mentor profiles.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_MENTOR_DATA).unwrap_or_else(|err| {
            log::warn!("mentor directory asset unreadable, using empty directory: {err}");
            Self::default()
        })
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MentorProfile> {
        self.mentors.iter().find(|profile| profile.name == name)
    }

    /// Mentor assigned to a location, falling back to the hub mentor.
    #[must_use]
    pub fn mentor_for_path(&self, location: Location) -> Option<&MentorProfile> {
        self.mentors
            .iter()
            .find(|profile| profile.path == location)
            .or_else(|| self.get(DEFAULT_MENTOR))
    }

    /// # Errors
    ///
    /// Returns `MentorError::UnknownMentor` when no profile carries `name`.
    pub fn require(&self, name: &str) -> Result<&MentorProfile, MentorError> {
        self.get(name)
            .ok_or_else(|| MentorError::UnknownMentor(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// What the student is doing while asking for help.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MentorContext {
    #[serde(default)]
    pub current_path: Option<String>,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub mission_type: Option<String>,
    #[serde(default)]
    pub previous_messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorRequest {
    pub mentor_name: String,
    pub student_message: String,
    #[serde(default)]
    pub context: MentorContext,
}

impl MentorRequest {
    #[must_use]
    pub fn new(mentor_name: impl Into<String>, student_message: impl Into<String>) -> Self {
        Self {
            mentor_name: mentor_name.into(),
            student_message: student_message.into(),
            context: MentorContext::default(),
        }
    }

    /// # Errors
    ///
    /// Returns `MentorError::MissingField` when the mentor name or the
    /// student message is blank.
    pub fn validate(&self) -> Result<(), MentorError> {
        if self.mentor_name.trim().is_empty() {
            return Err(MentorError::MissingField("mentorName"));
        }
        if self.student_message.trim().is_empty() {
            return Err(MentorError::MissingField("studentMessage"));
        }
        Ok(())
    }

    /// System prompt for the advisor, carrying the profile and recent history.
    #[must_use]
    pub fn system_prompt(&self, profile: &MentorProfile) -> String {
        let context = &self.context;
        let mut prompt = format!(
            "You are {}, NASA mentor for {}.\nExpertise: {}\nSpeaking style: {}\n\n\
             Current context:\n\
             - Student is working on: {}\n\
             - Progress level: {}/{} missions completed\n\
             - Current mission type: {}\n",
            profile.name,
            profile.specialty,
            profile.expertise,
            profile.style,
            context.current_path.as_deref().unwrap_or("general training"),
            context.progress.min(MISSIONS_PER_PATH),
            MISSIONS_PER_PATH,
            context.mission_type.as_deref().unwrap_or("general learning"),
        );
        let skip = context
            .previous_messages
            .len()
            .saturating_sub(PROMPT_HISTORY_LIMIT);
        let recent: Vec<String> = context
            .previous_messages
            .iter()
            .skip(skip)
            .map(|msg| format!("{}: {}", msg.role, msg.content))
            .collect();
        if !recent.is_empty() {
            prompt.push_str("\nPrevious conversation:\n");
            prompt.push_str(&recent.join("\n"));
            prompt.push('\n');
        }
        prompt.push_str(
            "\nRespond as JSON with content, educationalFacts, nextSteps, \
             encouragement, and nasaReference.",
        );
        prompt
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorResponse {
    pub content: String,
    #[serde(default)]
    pub educational_facts: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub encouragement: String,
    #[serde(default)]
    pub nasa_reference: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MentorError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("mentor {0} not found")]
    UnknownMentor(String),
}

/// Source of mentor guidance, typically a hosted language model.
pub trait MentorAdvisor {
    type Error: std::error::Error + Send + Sync + 'static;

    /// # Errors
    ///
    /// Returns the advisor's own error when guidance cannot be produced.
    fn advise(&self, request: &MentorRequest) -> Result<MentorResponse, Self::Error>;
}

/// Broad failure classes, each mapped to a fixed fallback reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentorFailure {
    MissingApiKey,
    Network,
    Other(String),
}

impl MentorFailure {
    /// Classify an advisor error message.
    #[must_use]
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_ascii_lowercase();
        if lowered.contains("api key") || lowered.contains("401") {
            Self::MissingApiKey
        } else if lowered.contains("fetch") || lowered.contains("network") {
            Self::Network
        } else {
            Self::Other(message.to_string())
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

/// Decode an advisor reply; non-JSON text is wrapped in stock guidance.
#[must_use]
pub fn parse_mentor_reply(raw: &str) -> MentorResponse {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        log::debug!("mentor reply is not structured JSON, wrapping raw text: {err}");
        MentorResponse {
            content: raw.to_string(),
            educational_facts: strings(&[
                "NASA has conducted over 200 missions to space since 1958",
                "Astronauts train for years in various environments including underwater and aircraft simulations",
                "Space exploration requires teamwork, precision, and continuous learning",
            ]),
            next_steps: strings(&[
                "Continue exploring your chosen path",
                "Ask questions about space systems",
                "Practice problem-solving skills",
                "Stay curious about the universe",
            ]),
            encouragement: "Every great astronaut started with curiosity and determination. You're on the right path!".to_string(),
            nasa_reference: Some("International Space Station program".to_string()),
        }
    })
}

#[must_use]
pub fn fallback_response(failure: &MentorFailure) -> MentorResponse {
    match failure {
        MentorFailure::MissingApiKey => MentorResponse {
            content: "I'm experiencing technical difficulties connecting to mission control. Please ensure the mentor service API key is configured.".to_string(),
            educational_facts: strings(&[
                "An API key is required for mentor interactions",
                "Mission control verifies every station before opening a channel",
            ]),
            next_steps: strings(&[
                "Check the mentor service configuration",
                "Restart the application after adding the key",
            ]),
            encouragement: "Technical setup is part of becoming an astronaut!".to_string(),
            nasa_reference: Some("Mission Control Systems".to_string()),
        },
        MentorFailure::Network => MentorResponse {
            content: "Unable to reach mission control. Please check your internet connection.".to_string(),
            educational_facts: strings(&[
                "Space missions require reliable communication systems",
                "NASA uses multiple redundant communication channels",
            ]),
            next_steps: strings(&[
                "Check your internet connection",
                "Try again in a moment",
                "Contact support if the issue persists",
            ]),
            encouragement: "Communication challenges are part of space exploration!".to_string(),
            nasa_reference: Some("Deep Space Network".to_string()),
        },
        MentorFailure::Other(message) => MentorResponse {
            content: format!(
                "I'm experiencing technical difficulties: {message}. Let me provide some general guidance instead."
            ),
            educational_facts: strings(&[
                "Space training includes physical fitness, technical skills, and psychological preparation",
                "NASA selects candidates from diverse backgrounds including scientists, engineers, pilots, and medical professionals",
            ]),
            next_steps: strings(&[
                "Explore different NASA career paths",
                "Learn about space mission requirements",
                "Practice teamwork and leadership skills",
            ]),
            encouragement: "Your curiosity about space is the first step toward an amazing journey!".to_string(),
            nasa_reference: Some("NASA Astronaut Candidate Program".to_string()),
        },
    }
}

/// Ask the advisor, substituting a fallback reply when it fails.
///
/// # Errors
///
/// Returns `MentorError` only for an invalid request; advisor failures
/// become fallback replies.
pub fn advise_or_fallback<A: MentorAdvisor>(
    advisor: &A,
    request: &MentorRequest,
) -> Result<MentorResponse, MentorError> {
    request.validate()?;
    Ok(advisor.advise(request).unwrap_or_else(|err| {
        log::warn!("mentor advisor failed for {}: {err}", request.mentor_name);
        fallback_response(&MentorFailure::classify(&err.to_string()))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::TrainingPath;

    #[derive(Debug, Error)]
    #[error("{0}")]
    struct CannedError(String);

    struct CannedAdvisor(Result<String, String>);

    impl MentorAdvisor for CannedAdvisor {
        type Error = CannedError;

        fn advise(&self, _request: &MentorRequest) -> Result<MentorResponse, Self::Error> {
            self.0
                .as_ref()
                .map(|raw| parse_mentor_reply(raw))
                .map_err(|msg| CannedError(msg.clone()))
        }
    }

    #[test]
    fn directory_maps_paths_to_mentors() {
        let directory = MentorDirectory::load_from_static();
        let jemison = directory
            .mentor_for_path(Location::Track(TrainingPath::ScienceResearch))
            .unwrap();
        assert_eq!(jemison.name, "Dr. Mae Jemison");
        assert_eq!(
            directory.mentor_for_path(Location::Hub).unwrap().specialty,
            "Engineering & Leadership"
        );
        assert_eq!(
            directory.require("HAL 9000"),
            Err(MentorError::UnknownMentor("HAL 9000".into()))
        );
    }

    #[test]
    fn requests_need_mentor_and_message() {
        assert_eq!(
            MentorRequest::new("", "hello").validate(),
            Err(MentorError::MissingField("mentorName"))
        );
        assert_eq!(
            MentorRequest::new("Chris Hadfield", "   ").validate(),
            Err(MentorError::MissingField("studentMessage"))
        );
        assert!(MentorRequest::new("Chris Hadfield", "How do radios work?").validate().is_ok());
    }

    #[test]
    fn structured_replies_parse_and_prose_is_wrapped() {
        let json = r#"{"content":"Great question","educationalFacts":["a"],"nextSteps":["b"],"encouragement":"Go"}"#;
        let parsed = parse_mentor_reply(json);
        assert_eq!(parsed.content, "Great question");
        assert_eq!(parsed.nasa_reference, None);

        let wrapped = parse_mentor_reply("Just keep swimming.");
        assert_eq!(wrapped.content, "Just keep swimming.");
        assert_eq!(wrapped.educational_facts.len(), 3);
        assert_eq!(wrapped.next_steps.len(), 4);
        assert_eq!(
            wrapped.nasa_reference.as_deref(),
            Some("International Space Station program")
        );
    }

    #[test]
    fn advisor_failures_become_classified_fallbacks() {
        let request = MentorRequest::new("Bob Behnken", "What is a torque wrench?");
        let missing_key = CannedAdvisor(Err("OpenRouter API key is missing".into()));
        let reply = advise_or_fallback(&missing_key, &request).unwrap();
        assert_eq!(reply.nasa_reference.as_deref(), Some("Mission Control Systems"));

        let offline = CannedAdvisor(Err("fetch failed".into()));
        let reply = advise_or_fallback(&offline, &request).unwrap();
        assert_eq!(reply.nasa_reference.as_deref(), Some("Deep Space Network"));

        let other = CannedAdvisor(Err("quota exceeded".into()));
        let reply = advise_or_fallback(&other, &request).unwrap();
        assert!(reply.content.contains("quota exceeded"));

        let ok = CannedAdvisor(Ok("plain prose".into()));
        assert_eq!(advise_or_fallback(&ok, &request).unwrap().content, "plain prose");

        let blank = MentorRequest::new("Bob Behnken", "");
        assert!(advise_or_fallback(&ok, &blank).is_err());
    }

    #[test]
    fn prompt_keeps_only_recent_history() {
        let directory = MentorDirectory::load_from_static();
        let profile = directory.require("Jessica Watkins").unwrap();
        let mut request = MentorRequest::new("Jessica Watkins", "Which star is Polaris?");
        request.context.progress = 2;
        request.context.previous_messages = (0..6)
            .map(|idx| ChatMessage {
                role: "user".into(),
                content: format!("message {idx}"),
            })
            .collect();
        let prompt = request.system_prompt(profile);
        assert!(prompt.contains("Progress level: 2/3"));
        assert!(prompt.contains("general training"));
        assert!(!prompt.contains("message 1"));
        assert!(prompt.contains("message 2"));
        assert!(prompt.contains("message 5"));
    }
}
