//! Domain Entities
//!
//! Core business entities for the unlock domain.

use chrono::{DateTime, Utc};
use kernel::id::{CreatorId, ResourceId, UnlockSessionId};
use serde::Serialize;

use crate::domain::value_objects::{FileReference, FileType, UnlockMethod};
use crate::error::{UnlockError, UnlockResult};

/// Resource entity - a locked file or link published by a creator
#[derive(Debug, Clone)]
pub struct Resource {
    pub id: ResourceId,
    pub creator_id: CreatorId,
    pub title: String,
    pub description: String,
    pub file_type: FileType,
    pub file_url: FileReference,
    pub preview_image: Option<FileReference>,
    pub unlock_method: UnlockMethod,
    /// Code, task URL or delay seconds, depending on `unlock_method`
    pub unlock_requirement: String,
    pub unlock_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Public identity of a creator
///
/// Rows are written by the identity provider; the unlock engine only reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorProfile {
    pub creator_id: CreatorId,
    pub display_name: String,
    pub bio: String,
    pub avatar: Option<FileReference>,
}

impl CreatorProfile {
    /// Profile for a creator the identity provider has not mirrored yet
    pub fn anonymous(creator_id: CreatorId) -> Self {
        Self {
            creator_id,
            display_name: String::new(),
            bio: String::new(),
            avatar: None,
        }
    }
}

/// Where an unlock session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Locked,
    /// Countdown running, or task link opened and pass pending
    Verifying,
    /// Terminal
    Unlocked,
}

/// Error message shown to the visitor until `expires_at_ms`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientError {
    pub message: String,
    pub expires_at_ms: i64,
}

/// Result of one countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Remaining(u32),
    Elapsed,
}

/// UnlockSession entity - one visitor's attempt to unlock one resource
///
/// Lives only in memory for as long as the visitor keeps the unlock view open.
/// `requirement_met` and `state` are kept apart so that a satisfied requirement
/// whose download link could not be prepared does not read as unlocked.
#[derive(Debug, Clone)]
pub struct UnlockSession {
    pub id: UnlockSessionId,
    pub resource_id: ResourceId,
    pub method: UnlockMethod,
    pub requirement: String,
    pub file_url: FileReference,
    pub state: SessionState,
    pub attempt_input: Option<String>,
    pub remaining_seconds: Option<u32>,
    pub requirement_met: bool,
    pub error: Option<TransientError>,
    pub download_url: Option<String>,
    pub visitor_hash: [u8; 32],
    pub created_at: DateTime<Utc>,
    pub last_seen_ms: i64,
}

impl UnlockSession {
    /// Start a fresh session in `Locked`
    ///
    /// `countdown` is the parsed delay for `TIME_DELAY` resources.
    pub fn new(resource: &Resource, visitor_hash: [u8; 32], countdown: Option<u32>) -> Self {
        let now = Utc::now();
        Self {
            id: UnlockSessionId::new(),
            resource_id: resource.id,
            method: resource.unlock_method,
            requirement: resource.unlock_requirement.clone(),
            file_url: resource.file_url.clone(),
            state: SessionState::Locked,
            attempt_input: None,
            remaining_seconds: countdown,
            requirement_met: false,
            error: None,
            download_url: None,
            visitor_hash,
            created_at: now,
            last_seen_ms: now.timestamp_millis(),
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == SessionState::Unlocked
    }

    pub fn touch(&mut self, now_ms: i64) {
        self.last_seen_ms = now_ms;
    }

    /// Record a rejected code; state stays `Locked`
    pub fn record_failed_attempt(
        &mut self,
        input: &str,
        message: &str,
        now_ms: i64,
        display_ms: i64,
    ) {
        self.attempt_input = Some(input.to_string());
        self.show_error(message, now_ms, display_ms);
    }

    /// Record an accepted code
    pub fn record_passed_attempt(&mut self, input: &str) {
        self.attempt_input = Some(input.to_string());
        self.error = None;
        self.requirement_met = true;
    }

    /// `Locked -> Verifying` for a countdown of `seconds`
    pub fn begin_countdown(&mut self, seconds: u32) -> UnlockResult<()> {
        self.ensure_locked()?;
        self.state = SessionState::Verifying;
        self.remaining_seconds = Some(seconds);
        Ok(())
    }

    /// `Locked -> Verifying` after the task link was handed out
    pub fn begin_task(&mut self) -> UnlockResult<()> {
        self.ensure_locked()?;
        self.state = SessionState::Verifying;
        Ok(())
    }

    /// Decrement the countdown by one second
    ///
    /// Only valid while a countdown is running. Reaching zero marks the
    /// requirement as met.
    pub fn tick(&mut self) -> UnlockResult<Tick> {
        let remaining = match (self.state, self.remaining_seconds) {
            (SessionState::Verifying, Some(remaining)) if remaining > 0 => remaining - 1,
            _ => return Err(UnlockError::UnsupportedAction("No countdown is running")),
        };
        self.remaining_seconds = Some(remaining);
        if remaining == 0 {
            self.requirement_met = true;
            Ok(Tick::Elapsed)
        } else {
            Ok(Tick::Remaining(remaining))
        }
    }

    /// The external task window passed
    pub fn complete_task(&mut self) -> UnlockResult<()> {
        if self.state != SessionState::Verifying || self.method != UnlockMethod::TaskVerification {
            return Err(UnlockError::UnsupportedAction("No task is pending"));
        }
        self.requirement_met = true;
        Ok(())
    }

    /// Transition to `Unlocked` with the resolved download link
    ///
    /// Returns `true` only for the transition itself, so callers can attach
    /// once-per-session effects to it.
    pub fn unlock(&mut self, download_url: String) -> UnlockResult<bool> {
        if self.is_unlocked() {
            return Ok(false);
        }
        if !self.requirement_met {
            return Err(UnlockError::RequirementNotMet);
        }
        self.state = SessionState::Unlocked;
        self.download_url = Some(download_url);
        self.error = None;
        Ok(true)
    }

    pub fn show_error(&mut self, message: &str, now_ms: i64, display_ms: i64) {
        self.error = Some(TransientError {
            message: message.to_string(),
            expires_at_ms: now_ms + display_ms,
        });
    }

    /// Error still within its display window, dropping it once expired
    pub fn visible_error(&mut self, now_ms: i64) -> Option<&str> {
        if self
            .error
            .as_ref()
            .is_some_and(|e| now_ms >= e.expires_at_ms)
        {
            self.error = None;
        }
        self.error.as_ref().map(|e| e.message.as_str())
    }

    fn ensure_locked(&self) -> UnlockResult<()> {
        match self.state {
            SessionState::Locked => Ok(()),
            SessionState::Verifying => Err(UnlockError::UnsupportedAction(
                "Verification already started",
            )),
            SessionState::Unlocked => Err(UnlockError::UnsupportedAction("Already unlocked")),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Owner of every fixture resource; fixture paths live in its folder
    pub const CREATOR: &str = "00000000-0000-0000-0000-0000000000c1";

    pub fn creator() -> CreatorId {
        CREATOR.parse().unwrap()
    }

    pub fn resource(method: UnlockMethod, requirement: &str, file_url: &str) -> Resource {
        Resource {
            id: ResourceId::new(),
            creator_id: creator(),
            title: "Modern React Architecture PDF".to_string(),
            description: "A complete guide".to_string(),
            file_type: FileType::Pdf,
            file_url: FileReference::parse(file_url).unwrap(),
            preview_image: None,
            unlock_method: method,
            unlock_requirement: requirement.to_string(),
            unlock_count: 0,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::resource;
    use super::*;

    fn countdown_session(seconds: u32) -> UnlockSession {
        let res = resource(UnlockMethod::TimeDelay, &seconds.to_string(), "c1/r1/file.png");
        UnlockSession::new(&res, [0u8; 32], Some(seconds))
    }

    #[test]
    fn test_new_session_is_locked() {
        let session = countdown_session(30);
        assert_eq!(session.state, SessionState::Locked);
        assert_eq!(session.remaining_seconds, Some(30));
        assert!(!session.requirement_met);
    }

    #[test]
    fn test_no_ticks_before_start() {
        let mut session = countdown_session(3);
        assert!(session.tick().is_err());
        assert_eq!(session.remaining_seconds, Some(3));
    }

    #[test]
    fn test_thirty_second_countdown() {
        let mut session = countdown_session(30);
        session.begin_countdown(30).unwrap();

        for _ in 0..29 {
            assert!(matches!(session.tick().unwrap(), Tick::Remaining(_)));
        }
        assert_eq!(session.state, SessionState::Verifying);
        assert_eq!(session.remaining_seconds, Some(1));
        assert!(!session.requirement_met);

        assert_eq!(session.tick().unwrap(), Tick::Elapsed);
        assert!(session.requirement_met);
        assert!(session.unlock("https://cdn/file.png".into()).unwrap());
        assert_eq!(session.state, SessionState::Unlocked);

        // No further ticks once elapsed
        assert!(session.tick().is_err());
    }

    #[test]
    fn test_countdown_cannot_restart() {
        let mut session = countdown_session(5);
        session.begin_countdown(5).unwrap();
        assert!(session.begin_countdown(5).is_err());
    }

    #[test]
    fn test_unlock_requires_requirement() {
        let res = resource(UnlockMethod::ManualCode, "REACT2024", "c1/r1/file.pdf");
        let mut session = UnlockSession::new(&res, [0u8; 32], None);
        assert!(matches!(
            session.unlock("x".into()),
            Err(UnlockError::RequirementNotMet)
        ));
        session.record_passed_attempt("react2024");
        assert!(session.unlock("x".into()).unwrap());
        // Second transition is a no-op
        assert!(!session.unlock("y".into()).unwrap());
        assert_eq!(session.download_url.as_deref(), Some("x"));
    }

    #[test]
    fn test_failed_attempt_error_expires() {
        let res = resource(UnlockMethod::ManualCode, "REACT2024", "c1/r1/file.pdf");
        let mut session = UnlockSession::new(&res, [0u8; 32], None);

        session.record_failed_attempt("REACT2025", "Invalid code", 1_000, 3_000);
        assert_eq!(session.state, SessionState::Locked);
        assert_eq!(session.attempt_input.as_deref(), Some("REACT2025"));
        assert_eq!(session.visible_error(3_999), Some("Invalid code"));
        assert_eq!(session.visible_error(4_000), None);
        assert!(session.error.is_none());
    }

    #[test]
    fn test_task_flow() {
        let res = resource(
            UnlockMethod::TaskVerification,
            "https://youtube.com/watch?v=1",
            "c1/r1/preset.zip",
        );
        let mut session = UnlockSession::new(&res, [0u8; 32], None);
        assert!(session.complete_task().is_err());
        session.begin_task().unwrap();
        assert_eq!(session.state, SessionState::Verifying);
        session.complete_task().unwrap();
        assert!(session.requirement_met);
    }
}
