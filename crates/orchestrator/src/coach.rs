//! The top-level coach controller.

use std::sync::Arc;

use coach_core::{
    CoachError, CoachResponse, GenerativeModel, LoggedMeal, MealAnalysisResponse,
    MealItemRecognition, PhotoImage, UserProfile,
};
use coach_services::{
    MealAnalysisService, PlanService, RequestClient, MEAL_ANALYSIS_FALLBACK, PLAN_FALLBACK,
};
use coach_state::{
    AnalysisTicket, AppState, BookmarkOutcome, CaptureSession, CaptureState, Completion,
    ProfileChange, Reconciler, SqliteStateStore, StateError, StateStore,
};
use gemini_model::GeminiModel;
use tracing::{info, warn};

use crate::config::CoachConfig;
use crate::error::OrchestratorError;

/// Owns the application state and runs every user action against it.
///
/// This is the complete surface a front end may call: the AI services
/// produce results, and only the reconciler applies them.
pub struct Coach<S: StateStore> {
    reconciler: Reconciler<S>,
    plans: PlanService,
    meals: MealAnalysisService,
    capture: CaptureSession,
}

impl<S: StateStore> Coach<S> {
    /// Create a coach from its parts.
    pub fn new(reconciler: Reconciler<S>, plans: PlanService, meals: MealAnalysisService) -> Self {
        Self {
            reconciler,
            plans,
            meals,
            capture: CaptureSession::new(),
        }
    }

    /// Load state from `store` and build both services on `model`.
    pub async fn with_model(
        store: S,
        model: Arc<dyn GenerativeModel>,
        config: &CoachConfig,
    ) -> Result<Self, OrchestratorError> {
        let reconciler = Reconciler::open(store).await?;
        let client = RequestClient::with_policy(model, config.services.retry_policy());
        let plans = PlanService::new(client.clone(), config.services.plan_model.clone());
        let meals = MealAnalysisService::new(client, config.services.meal_model.clone());
        Ok(Self::new(reconciler, plans, meals))
    }

    pub fn state(&self) -> &AppState {
        self.reconciler.state()
    }

    pub fn profile(&self) -> &UserProfile {
        self.reconciler.profile()
    }

    /// Logged meals, most recent first.
    pub fn journal(&self) -> &[LoggedMeal] {
        self.reconciler.journal()
    }

    pub fn plan(&self) -> Option<&CoachResponse> {
        self.reconciler.plan()
    }

    pub fn capture(&self) -> &CaptureState {
        self.capture.state()
    }

    pub fn store(&self) -> &S {
        self.reconciler.store()
    }

    /// Apply onboarding answers or profile edits.
    pub async fn update_profile<I>(&mut self, changes: I) -> Result<(), OrchestratorError>
    where
        I: IntoIterator<Item = ProfileChange>,
    {
        self.reconciler.update_profile(changes).await?;
        Ok(())
    }

    /// Generate a plan for the current profile and make it the active plan.
    ///
    /// On failure the previous plan, if any, stays in place.
    pub async fn generate_plan(&mut self) -> Result<&CoachResponse, OrchestratorError> {
        let plan = match self.plans.generate(self.reconciler.profile()).await {
            Ok(plan) => plan,
            Err(err) => {
                warn!("Plan generation failed: {}", err);
                return Err(OrchestratorError::plan(err, PLAN_FALLBACK));
            }
        };

        self.reconciler.apply_plan(plan).await?;
        self.reconciler
            .plan()
            .ok_or_else(|| StateError::invalid("plan missing after apply").into())
    }

    /// Bookmark a recognized item.
    pub async fn bookmark(
        &mut self,
        item: &MealItemRecognition,
    ) -> Result<BookmarkOutcome, OrchestratorError> {
        Ok(self.reconciler.bookmark(item).await?)
    }

    /// Remove a bookmark by id. Removing an unknown id is not an error.
    pub async fn remove_bookmark(&mut self, id: &str) -> Result<bool, OrchestratorError> {
        Ok(self.reconciler.remove_bookmark(id).await?)
    }

    /// Analyze a photo without touching the capture flow or any state.
    pub async fn analyze(
        &self,
        photo: &PhotoImage,
    ) -> Result<MealAnalysisResponse, OrchestratorError> {
        self.meals
            .analyze(photo)
            .await
            .map_err(|err| OrchestratorError::meal_analysis(err, MEAL_ANALYSIS_FALLBACK))
    }

    /// Open the capture overlay.
    pub fn open_capture(&mut self) -> Result<(), OrchestratorError> {
        self.capture.open()?;
        Ok(())
    }

    /// Analyze a captured photo and move the capture to review.
    ///
    /// A failed analysis is reported through [`Completion::Failed`] and the
    /// capture waits for another photo. If this future is dropped before
    /// the analysis finishes, the capture goes back to waiting for a photo.
    ///
    /// To keep the coach usable while the analysis runs (for example to
    /// cancel the capture), use [`Coach::begin_photo`] and
    /// [`Coach::complete_photo`] instead.
    pub async fn submit_photo(&mut self, photo: PhotoImage) -> Result<Completion, OrchestratorError> {
        let pending = self.begin_photo(photo)?;
        let mut in_flight = InFlight {
            capture: &mut self.capture,
            ticket: pending.ticket,
            finished: false,
        };

        let outcome = pending.run().await;
        in_flight.finished = true;
        Ok(finish(in_flight.capture, outcome))
    }

    /// Start analyzing a captured photo.
    ///
    /// The returned [`PendingAnalysis`] does not borrow the coach; run it
    /// and hand its outcome to [`Coach::complete_photo`].
    pub fn begin_photo(&mut self, photo: PhotoImage) -> Result<PendingAnalysis, OrchestratorError> {
        let ticket = self.capture.begin_analysis(photo.clone())?;
        Ok(PendingAnalysis {
            ticket,
            photo,
            meals: self.meals.clone(),
        })
    }

    /// Deliver the outcome of an analysis started with [`Coach::begin_photo`].
    ///
    /// Returns [`Completion::Discarded`] when the capture was cancelled or a
    /// newer photo was submitted in the meantime.
    pub fn complete_photo(&mut self, outcome: AnalysisOutcome) -> Completion {
        finish(&mut self.capture, outcome)
    }

    /// Adjust the portion of the meal under review.
    pub fn set_portion(&mut self, portion: f64) -> Result<(), OrchestratorError> {
        self.capture.set_portion(portion)?;
        Ok(())
    }

    /// Close the capture overlay, discarding anything in progress.
    pub fn cancel_capture(&mut self) {
        self.capture.cancel();
    }

    /// Save the meal under review to the journal.
    ///
    /// The review stays open if saving fails.
    pub async fn confirm_meal(&mut self) -> Result<LoggedMeal, OrchestratorError> {
        let review = self.capture.review().ok_or(StateError::InvalidTransition {
            state: self.capture.state().name(),
            action: "confirm a meal",
        })?;

        let meal = self
            .reconciler
            .save_meal(&review.analysis, review.portion, Some(&review.photo))
            .await?;
        self.capture.confirm()?;
        Ok(meal)
    }

    /// Save an analysis directly, without going through the capture flow.
    pub async fn log_meal(
        &mut self,
        analysis: &MealAnalysisResponse,
        portion: f64,
        photo: Option<&PhotoImage>,
    ) -> Result<LoggedMeal, OrchestratorError> {
        Ok(self.reconciler.save_meal(analysis, portion, photo).await?)
    }

    /// Erase every record. Confirmation is the caller's job.
    pub async fn reset(&mut self) -> Result<(), OrchestratorError> {
        self.capture.cancel();
        self.reconciler.reset().await?;
        Ok(())
    }
}

impl Coach<SqliteStateStore> {
    /// Create a coach from environment variables.
    ///
    /// Reads [`CoachConfig::from_env`] for the store and services and
    /// [`GeminiModel::from_env`] for the model.
    pub async fn from_env() -> Result<Self, OrchestratorError> {
        let config = CoachConfig::from_env();
        let model = GeminiModel::from_env()?;
        let store = SqliteStateStore::connect(&config.database_url).await?;

        info!(
            "Coach ready (store: {}, plan model: {}, meal model: {})",
            config.database_url, config.services.plan_model, config.services.meal_model
        );
        Self::with_model(store, Arc::new(model), &config).await
    }
}

/// A meal analysis started by [`Coach::begin_photo`].
#[derive(Debug)]
pub struct PendingAnalysis {
    ticket: AnalysisTicket,
    photo: PhotoImage,
    meals: MealAnalysisService,
}

impl PendingAnalysis {
    pub fn ticket(&self) -> AnalysisTicket {
        self.ticket
    }

    /// Send the photo to the model.
    pub async fn run(self) -> AnalysisOutcome {
        let result = self.meals.analyze(&self.photo).await;
        AnalysisOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

/// The result of a [`PendingAnalysis`], tagged with its ticket.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub ticket: AnalysisTicket,
    pub result: Result<MealAnalysisResponse, CoachError>,
}

fn finish(capture: &mut CaptureSession, outcome: AnalysisOutcome) -> Completion {
    if let Err(ref err) = outcome.result {
        warn!("Meal analysis failed: {}", err);
    }
    capture.complete(outcome.ticket, outcome.result, MEAL_ANALYSIS_FALLBACK)
}

/// Returns the capture to waiting for a photo if the analysis is dropped.
struct InFlight<'a> {
    capture: &'a mut CaptureSession,
    ticket: AnalysisTicket,
    finished: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.capture.abandon(self.ticket);
        }
    }
}
