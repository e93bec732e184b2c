//! The single writer of application state.
//!
//! Every operation builds the next [`AppState`], writes all three slots
//! through to the store, and only then replaces the in-memory state. A
//! failed write therefore leaves both copies as they were.

use chrono::Utc;
use coach_core::{
    CoachResponse, FoodItem, LoggedMeal, MealAnalysisResponse, MealItemRecognition, PhotoImage,
    UserProfile, PORTION_MAX, PORTION_MIN,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, StateError};
use crate::profile::ProfileChange;
use crate::state::AppState;
use crate::store::StateStore;

/// Message shown when bookmarking a name that is already saved.
pub const ALREADY_BOOKMARKED: &str = "Item already in your favorites!";

/// Points awarded per logged meal.
pub const POINTS_PER_MEAL: u32 = 10;

/// Result of a bookmark request.
#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkOutcome {
    /// A new bookmark was stored.
    Added(FoodItem),
    /// A bookmark with the same name exists; nothing changed.
    AlreadySaved,
}

impl BookmarkOutcome {
    /// Message for the user, if any.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            BookmarkOutcome::Added(_) => None,
            BookmarkOutcome::AlreadySaved => Some(ALREADY_BOOKMARKED),
        }
    }
}

/// Applies user actions and AI results to the durable state.
pub struct Reconciler<S: StateStore> {
    store: S,
    state: AppState,
}

impl<S: StateStore> Reconciler<S> {
    /// Load state from `store`.
    pub async fn open(store: S) -> Result<Self> {
        let state = AppState::load(&store).await?;
        info!(
            "State loaded ({} logged meal(s), plan: {})",
            state.journal.len(),
            state.plan.is_some()
        );
        Ok(Self { store, state })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn profile(&self) -> &UserProfile {
        &self.state.profile
    }

    /// Logged meals, most recent first.
    pub fn journal(&self) -> &[LoggedMeal] {
        &self.state.journal
    }

    pub fn plan(&self) -> Option<&CoachResponse> {
        self.state.plan.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn commit(&mut self, next: AppState) -> Result<()> {
        self.store.save(&next.encode()?).await?;
        self.state = next;
        Ok(())
    }

    /// Replace one or more profile fields.
    ///
    /// Either every change is applied or, if one is invalid, none is.
    pub async fn update_profile<I>(&mut self, changes: I) -> Result<()>
    where
        I: IntoIterator<Item = ProfileChange>,
    {
        let changes: Vec<ProfileChange> = changes.into_iter().collect();
        if changes.is_empty() {
            return Ok(());
        }
        for change in &changes {
            change.validate()?;
        }

        let mut next = self.state.clone();
        let count = changes.len();
        for change in changes {
            change.apply(&mut next.profile);
        }

        self.commit(next).await?;
        debug!("Updated {} profile field(s)", count);
        Ok(())
    }

    /// Replace the plan wholesale.
    pub async fn apply_plan(&mut self, plan: CoachResponse) -> Result<()> {
        let mut next = self.state.clone();
        next.plan = Some(plan);
        self.commit(next).await?;
        info!("Applied new plan");
        Ok(())
    }

    /// Bookmark a recognized item unless one with the same name exists.
    ///
    /// The recognition carries no macros, so protein, carbs, fats and score
    /// are stored as zero.
    pub async fn bookmark(&mut self, item: &MealItemRecognition) -> Result<BookmarkOutcome> {
        if self.state.profile.is_bookmarked(&item.name) {
            debug!("Bookmark {} already exists", item.name);
            return Ok(BookmarkOutcome::AlreadySaved);
        }

        let food = FoodItem {
            id: Uuid::new_v4().to_string(),
            name: item.name.clone(),
            calories: item.calories,
            protein: 0.0,
            carbs: 0.0,
            fats: 0.0,
            score: 0.0,
        };

        let mut next = self.state.clone();
        next.profile.bookmarks.push(food.clone());
        self.commit(next).await?;
        info!("Bookmarked {}", food.name);
        Ok(BookmarkOutcome::Added(food))
    }

    /// Remove a bookmark by id. Returns whether one was removed.
    pub async fn remove_bookmark(&mut self, id: &str) -> Result<bool> {
        if !self.state.profile.bookmarks.iter().any(|b| b.id == id) {
            return Ok(false);
        }

        let mut next = self.state.clone();
        next.profile.bookmarks.retain(|b| b.id != id);
        self.commit(next).await?;
        Ok(true)
    }

    /// Log a meal at `portion` and credit the streak and points.
    ///
    /// Every calorie value is scaled by `portion` and rounded half up. The
    /// photo, when given, is kept on the meal as a `data:` URL.
    pub async fn save_meal(
        &mut self,
        analysis: &MealAnalysisResponse,
        portion: f64,
        photo: Option<&PhotoImage>,
    ) -> Result<LoggedMeal> {
        validate_portion(portion)?;

        let meal = LoggedMeal {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            items: analysis.scaled_items(portion),
            total_calories: analysis.scaled_total(portion),
            health_alerts: analysis.health_alerts.clone(),
            coach_verdict: Some(analysis.coach_verdict.clone()),
            photo_url: photo.map(PhotoImage::to_data_url),
            portion,
        };

        let mut next = self.state.clone();
        next.journal.insert(0, meal.clone());
        next.profile.streak = next.profile.streak.saturating_add(1);
        next.profile.points = next.profile.points.saturating_add(POINTS_PER_MEAL);
        self.commit(next).await?;

        info!(
            "Logged meal {} ({} kcal at portion {}), streak {}",
            meal.id, meal.total_calories, portion, self.state.profile.streak
        );
        Ok(meal)
    }

    /// Clear every record and the store.
    pub async fn reset(&mut self) -> Result<()> {
        self.store.clear().await?;
        self.state = AppState::default();
        info!("State reset");
        Ok(())
    }
}

/// Check a portion multiplier against the accepted range.
pub fn validate_portion(portion: f64) -> Result<()> {
    if (PORTION_MIN..=PORTION_MAX).contains(&portion) {
        Ok(())
    } else {
        Err(StateError::invalid(format!(
            "portion {} is outside {}..={}",
            portion, PORTION_MIN, PORTION_MAX
        )))
    }
}
