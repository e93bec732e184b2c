//! The meal capture flow.
//!
//! ```text
//! Idle -> Capturing -> Analyzing -> Reviewing -> (confirm) -> Idle
//!             ^            |
//!             +- failure --+
//! ```
//!
//! Cancelling from any state returns to `Idle`. An analysis result that
//! arrives after its capture was cancelled or superseded carries a stale
//! ticket and is dropped. The session is client-local and never persisted.

use coach_core::{
    CoachError, MealAnalysisResponse, MealItemRecognition, PhotoImage, PORTION_MAX, PORTION_MIN,
};
use tracing::debug;

use crate::error::{Result, StateError};
use crate::reconciler::validate_portion;

/// Portion selected when a review starts.
pub const DEFAULT_PORTION: f64 = 1.0;

/// Identifies one analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnalysisTicket(u64);

/// Current step of the capture flow.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureState {
    Idle,
    /// Waiting for a photo. Holds the message of the last failed analysis.
    Capturing { error: Option<String> },
    Analyzing {
        ticket: AnalysisTicket,
        photo: PhotoImage,
    },
    Reviewing(Review),
}

impl CaptureState {
    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            CaptureState::Idle => "idle",
            CaptureState::Capturing { .. } => "capturing",
            CaptureState::Analyzing { .. } => "analyzing",
            CaptureState::Reviewing(_) => "reviewing",
        }
    }
}

/// An analysis awaiting confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub photo: PhotoImage,
    pub analysis: MealAnalysisResponse,
    /// Always within the accepted portion range.
    pub portion: f64,
}

impl Review {
    /// Items with calories as they would be saved at the current portion.
    pub fn preview_items(&self) -> Vec<MealItemRecognition> {
        self.analysis.scaled_items(self.portion)
    }

    /// Total calories as they would be saved at the current portion.
    pub fn preview_total(&self) -> f64 {
        self.analysis.scaled_total(self.portion)
    }
}

/// What happened to a completed analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The analysis succeeded and is now under review.
    Reviewing,
    /// The analysis failed; the session is back to capturing.
    Failed(String),
    /// The result belonged to a cancelled or superseded capture.
    Discarded,
}

/// Drives one capture overlay.
#[derive(Debug)]
pub struct CaptureSession {
    state: CaptureState,
    next_ticket: u64,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSession {
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            next_ticket: 0,
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// The pending review, if any.
    pub fn review(&self) -> Option<&Review> {
        match &self.state {
            CaptureState::Reviewing(review) => Some(review),
            _ => None,
        }
    }

    fn reject(&self, action: &'static str) -> StateError {
        StateError::InvalidTransition {
            state: self.state.name(),
            action,
        }
    }

    /// Open the capture overlay.
    pub fn open(&mut self) -> Result<()> {
        match self.state {
            CaptureState::Idle => {
                self.state = CaptureState::Capturing { error: None };
                Ok(())
            }
            CaptureState::Capturing { .. } => Ok(()),
            _ => Err(self.reject("open capture")),
        }
    }

    /// Start analyzing `photo`.
    pub fn begin_analysis(&mut self, photo: PhotoImage) -> Result<AnalysisTicket> {
        if !matches!(self.state, CaptureState::Capturing { .. }) {
            return Err(self.reject("analyze a photo"));
        }

        self.next_ticket += 1;
        let ticket = AnalysisTicket(self.next_ticket);
        self.state = CaptureState::Analyzing { ticket, photo };
        Ok(ticket)
    }

    /// Deliver the outcome of the analysis started with `ticket`.
    ///
    /// A failure is turned into a user-facing message, `fallback` being
    /// used when the error carries none.
    pub fn complete(
        &mut self,
        ticket: AnalysisTicket,
        result: std::result::Result<MealAnalysisResponse, CoachError>,
        fallback: &str,
    ) -> Completion {
        let photo = match &self.state {
            CaptureState::Analyzing {
                ticket: current,
                photo,
            } if *current == ticket => photo.clone(),
            _ => {
                debug!("Discarding analysis result for stale ticket {:?}", ticket);
                return Completion::Discarded;
            }
        };

        match result {
            Ok(analysis) => {
                self.state = CaptureState::Reviewing(Review {
                    photo,
                    analysis,
                    portion: DEFAULT_PORTION,
                });
                Completion::Reviewing
            }
            Err(err) => {
                let message = err.user_message(fallback);
                self.state = CaptureState::Capturing {
                    error: Some(message.clone()),
                };
                Completion::Failed(message)
            }
        }
    }

    /// Change the portion under review.
    pub fn set_portion(&mut self, portion: f64) -> Result<()> {
        validate_portion(portion)?;
        if let CaptureState::Reviewing(review) = &mut self.state {
            review.portion = portion;
            return Ok(());
        }
        Err(self.reject("adjust the portion"))
    }

    /// Give up on the analysis started with `ticket` without a result.
    ///
    /// The session goes back to capturing so another photo can be taken.
    /// Does nothing when `ticket` is no longer the current analysis.
    pub fn abandon(&mut self, ticket: AnalysisTicket) {
        if matches!(self.state, CaptureState::Analyzing { ticket: current, .. } if current == ticket)
        {
            debug!("Analysis {:?} abandoned", ticket);
            self.state = CaptureState::Capturing { error: None };
        }
    }

    /// Discard whatever is in progress.
    pub fn cancel(&mut self) {
        if self.state != CaptureState::Idle {
            debug!("Capture cancelled while {}", self.state.name());
        }
        self.state = CaptureState::Idle;
    }

    /// Finish the review and return it for saving.
    pub fn confirm(&mut self) -> Result<Review> {
        match std::mem::replace(&mut self.state, CaptureState::Idle) {
            CaptureState::Reviewing(review) => Ok(review),
            other => {
                self.state = other;
                Err(self.reject("confirm a meal"))
            }
        }
    }
}

/// Allowed portion range, for rendering a slider.
pub fn portion_range() -> std::ops::RangeInclusive<f64> {
    PORTION_MIN..=PORTION_MAX
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo() -> PhotoImage {
        PhotoImage::jpeg(vec![0xff, 0xd8]).unwrap()
    }

    fn analysis() -> MealAnalysisResponse {
        MealAnalysisResponse {
            items: vec![
                MealItemRecognition {
                    name: "Rice".to_string(),
                    calories: 200.0,
                    description: None,
                },
                MealItemRecognition {
                    name: "Egg".to_string(),
                    calories: 75.0,
                    description: None,
                },
            ],
            total_calories: 275.0,
            health_alerts: vec![],
            coach_verdict: "OK".to_string(),
        }
    }

    fn reviewing() -> CaptureSession {
        let mut session = CaptureSession::new();
        session.open().unwrap();
        let ticket = session.begin_analysis(photo()).unwrap();
        assert_eq!(
            session.complete(ticket, Ok(analysis()), "fallback"),
            Completion::Reviewing
        );
        session
    }

    #[test]
    fn test_happy_path() {
        let mut session = reviewing();
        assert_eq!(session.review().unwrap().portion, 1.0);

        session.set_portion(2.0).unwrap();
        let review = session.confirm().unwrap();

        assert_eq!(review.portion, 2.0);
        assert_eq!(review.preview_total(), 550.0);
        assert_eq!(session.state(), &CaptureState::Idle);
    }

    #[test]
    fn test_preview_uses_save_rounding() {
        let mut session = reviewing();
        session.set_portion(1.5).unwrap();

        let review = session.review().unwrap();
        let items = review.preview_items();
        assert_eq!(items[0].calories, 300.0);
        assert_eq!(items[1].calories, 113.0); // 112.5 rounds up
        assert_eq!(review.preview_total(), 413.0); // 412.5 rounds up
    }

    #[test]
    fn test_failure_returns_to_capturing() {
        let mut session = CaptureSession::new();
        session.open().unwrap();
        let ticket = session.begin_analysis(photo()).unwrap();

        let outcome = session.complete(
            ticket,
            Err(CoachError::Transient("429 quota".to_string())),
            "Meal analysis failed.",
        );

        assert_eq!(outcome, Completion::Failed("429 quota".to_string()));
        assert_eq!(
            session.state(),
            &CaptureState::Capturing {
                error: Some("429 quota".to_string())
            }
        );
        // A fresh photo can be submitted
        assert!(session.begin_analysis(photo()).is_ok());
    }

    #[test]
    fn test_failure_without_message_uses_fallback() {
        let mut session = CaptureSession::new();
        session.open().unwrap();
        let ticket = session.begin_analysis(photo()).unwrap();

        let outcome = session.complete(
            ticket,
            Err(CoachError::Service {
                status: None,
                message: String::new(),
            }),
            "Meal analysis failed. Ensure your photo is clear.",
        );
        assert_eq!(
            outcome,
            Completion::Failed("Meal analysis failed. Ensure your photo is clear.".to_string())
        );
    }

    #[test]
    fn test_late_result_after_cancel_is_discarded() {
        let mut session = CaptureSession::new();
        session.open().unwrap();
        let ticket = session.begin_analysis(photo()).unwrap();
        session.cancel();

        assert_eq!(
            session.complete(ticket, Ok(analysis()), "fallback"),
            Completion::Discarded
        );
        assert_eq!(session.state(), &CaptureState::Idle);
    }

    #[test]
    fn test_superseded_ticket_is_discarded() {
        let mut session = CaptureSession::new();
        session.open().unwrap();
        let old = session.begin_analysis(photo()).unwrap();
        session.cancel();
        session.open().unwrap();
        let new = session.begin_analysis(photo()).unwrap();

        assert_ne!(old, new);
        assert_eq!(
            session.complete(old, Ok(analysis()), "fallback"),
            Completion::Discarded
        );
        assert!(matches!(session.state(), CaptureState::Analyzing { .. }));
        assert_eq!(
            session.complete(new, Ok(analysis()), "fallback"),
            Completion::Reviewing
        );
    }

    #[test]
    fn test_abandon_returns_to_capturing() {
        let mut session = CaptureSession::new();
        session.open().unwrap();
        let ticket = session.begin_analysis(photo()).unwrap();

        session.abandon(ticket);
        assert_eq!(session.state(), &CaptureState::Capturing { error: None });
        assert!(session.open().is_ok());

        // Abandoning a stale ticket leaves the newer analysis alone
        let current = session.begin_analysis(photo()).unwrap();
        session.abandon(ticket);
        assert!(matches!(session.state(), CaptureState::Analyzing { .. }));
        assert_eq!(
            session.complete(current, Ok(analysis()), "fallback"),
            Completion::Reviewing
        );
    }

    #[test]
    fn test_cancel_from_review_discards() {
        let mut session = reviewing();
        session.cancel();
        assert!(session.review().is_none());
        assert!(session.confirm().is_err());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut session = CaptureSession::new();
        assert!(matches!(
            session.begin_analysis(photo()),
            Err(StateError::InvalidTransition {
                state: "idle",
                ..
            })
        ));
        assert!(session.set_portion(1.0).is_err());

        let mut session = reviewing();
        assert!(session.open().is_err());
        assert!(session.begin_analysis(photo()).is_err());
        assert!(session.set_portion(5.0).is_err());
        assert_eq!(session.review().unwrap().portion, 1.0);
    }

    #[test]
    fn test_portion_range() {
        assert!(portion_range().contains(&0.1));
        assert!(!portion_range().contains(&3.1));
    }
}
