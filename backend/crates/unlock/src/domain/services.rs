//! Domain Services
//!
//! Pure decision logic: given a method, its raw requirement and what the
//! visitor supplied, decide the outcome and which side effect to trigger.

use crate::domain::value_objects::{UnlockMethod, UnlockRequirement};
use crate::error::UnlockResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail,
    /// Passes later, once the side effect has run its course
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Open the URL in a new browsing context; nothing is read back
    OpenExternal(String),
    /// Count down this many seconds, one tick per second
    StartCountdown(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub outcome: Outcome,
    pub side_effect: Option<SideEffect>,
}

impl Evaluation {
    fn settled(outcome: Outcome) -> Self {
        Self {
            outcome,
            side_effect: None,
        }
    }

    fn pending(side_effect: SideEffect) -> Self {
        Self {
            outcome: Outcome::Pending,
            side_effect: Some(side_effect),
        }
    }
}

/// Evaluate visitor input against a resource's unlock requirement
///
/// - `MANUAL_CODE`: `Pass` iff the normalized input equals the normalized code;
///   missing input is a `Fail`. Retries are unlimited.
/// - `TASK_VERIFICATION`: `Pending` with [`SideEffect::OpenExternal`]; opening the
///   link is accepted as completion.
/// - `TIME_DELAY`: `Pending` with [`SideEffect::StartCountdown`]; input is ignored.
///
/// A requirement that does not fit its method is a `DataIntegrity` error, never
/// a pass.
pub fn evaluate(
    method: UnlockMethod,
    requirement: &str,
    input: Option<&str>,
) -> UnlockResult<Evaluation> {
    let evaluation = match UnlockRequirement::parse(method, requirement)? {
        UnlockRequirement::Code(code) => match input {
            Some(input) if code.matches(input) => Evaluation::settled(Outcome::Pass),
            _ => Evaluation::settled(Outcome::Fail),
        },
        UnlockRequirement::Task(url) => {
            Evaluation::pending(SideEffect::OpenExternal(url.as_str().to_string()))
        }
        UnlockRequirement::Delay(delay) => {
            Evaluation::pending(SideEffect::StartCountdown(delay.get()))
        }
    };
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnlockError;

    #[test]
    fn test_manual_code_pass_ignores_case_and_whitespace() {
        for input in ["REACT2024", "react2024 ", "  React2024", "\nreact2024\t"] {
            let eval = evaluate(UnlockMethod::ManualCode, "REACT2024", Some(input)).unwrap();
            assert_eq!(eval.outcome, Outcome::Pass, "input {:?}", input);
            assert_eq!(eval.side_effect, None);
        }
    }

    #[test]
    fn test_manual_code_requirement_is_normalized_too() {
        let eval = evaluate(UnlockMethod::ManualCode, " react2024", Some("REACT2024")).unwrap();
        assert_eq!(eval.outcome, Outcome::Pass);
    }

    #[test]
    fn test_manual_code_fail() {
        let eval = evaluate(UnlockMethod::ManualCode, "REACT2024", Some("REACT2025")).unwrap();
        assert_eq!(eval.outcome, Outcome::Fail);

        let eval = evaluate(UnlockMethod::ManualCode, "REACT2024", None).unwrap();
        assert_eq!(eval.outcome, Outcome::Fail);

        let eval = evaluate(UnlockMethod::ManualCode, "REACT2024", Some("")).unwrap();
        assert_eq!(eval.outcome, Outcome::Fail);
    }

    #[test]
    fn test_manual_code_retry_unlimited() {
        for _ in 0..100 {
            let eval = evaluate(UnlockMethod::ManualCode, "REACT2024", Some("nope")).unwrap();
            assert_eq!(eval.outcome, Outcome::Fail);
        }
        let eval = evaluate(UnlockMethod::ManualCode, "REACT2024", Some("react2024")).unwrap();
        assert_eq!(eval.outcome, Outcome::Pass);
    }

    #[test]
    fn test_task_verification_opens_link() {
        let eval = evaluate(
            UnlockMethod::TaskVerification,
            "https://youtube.com/watch?v=dQw4w9WgXcQ",
            None,
        )
        .unwrap();
        assert_eq!(eval.outcome, Outcome::Pending);
        assert_eq!(
            eval.side_effect,
            Some(SideEffect::OpenExternal(
                "https://youtube.com/watch?v=dQw4w9WgXcQ".into()
            ))
        );
    }

    #[test]
    fn test_time_delay_ignores_input() {
        let eval = evaluate(UnlockMethod::TimeDelay, "30", Some("REACT2024")).unwrap();
        assert_eq!(eval.outcome, Outcome::Pending);
        assert_eq!(eval.side_effect, Some(SideEffect::StartCountdown(30)));
    }

    #[test]
    fn test_malformed_delay_fails_closed() {
        for raw in ["abc", "", "0", "-1", "1e3"] {
            let result = evaluate(UnlockMethod::TimeDelay, raw, None);
            assert!(
                matches!(result, Err(UnlockError::DataIntegrity(_))),
                "requirement {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_malformed_task_url_fails_closed() {
        let result = evaluate(UnlockMethod::TaskVerification, "not a link", None);
        assert!(matches!(result, Err(UnlockError::DataIntegrity(_))));
    }
}
