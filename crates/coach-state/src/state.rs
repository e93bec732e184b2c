//! The application state container.

use coach_core::{CoachResponse, LoggedMeal, UserProfile};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, StateError};
use crate::store::{Slot, StateStore};

/// The three durable records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub profile: UserProfile,
    /// Logged meals, most recent first.
    pub journal: Vec<LoggedMeal>,
    pub plan: Option<CoachResponse>,
}

impl AppState {
    /// Read every slot from `store`.
    ///
    /// An absent slot yields its default. So does a slot whose document
    /// cannot be decoded; that case is logged and the document is left in
    /// place until the next write replaces it.
    pub async fn load<S: StateStore + ?Sized>(store: &S) -> Result<Self> {
        let profile = read_slot(store, Slot::Profile).await?.unwrap_or_default();
        let journal = read_slot(store, Slot::Journal).await?.unwrap_or_default();
        let plan = read_slot::<_, Option<CoachResponse>>(store, Slot::Plan)
            .await?
            .flatten();

        Ok(Self {
            profile,
            journal,
            plan,
        })
    }

    /// Serialize every slot.
    pub fn encode(&self) -> Result<Vec<(Slot, String)>> {
        Ok(vec![
            (Slot::Profile, encode_slot(Slot::Profile, &self.profile)?),
            (Slot::Journal, encode_slot(Slot::Journal, &self.journal)?),
            (Slot::Plan, encode_slot(Slot::Plan, &self.plan)?),
        ])
    }

    /// Total calories of every logged meal.
    pub fn logged_calories(&self) -> f64 {
        self.journal.iter().map(|meal| meal.total_calories).sum()
    }
}

async fn read_slot<S, T>(store: &S, slot: Slot) -> Result<Option<T>>
where
    S: StateStore + ?Sized,
    T: DeserializeOwned,
{
    let Some(payload) = store.load(slot).await? else {
        debug!("Slot {} is empty, using defaults", slot);
        return Ok(None);
    };

    match serde_json::from_str(&payload) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!("Ignoring unreadable {} slot: {}", slot, e);
            Ok(None)
        }
    }
}

fn encode_slot<T: Serialize>(slot: Slot, value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|source| StateError::Encode { slot, source })
}
