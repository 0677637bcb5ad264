//! Saved round drafts - a persistent list of "what if" rounds.
//!
//! Drafts are stored with the preview numbers they had when saved (post-money
//! and equity given away). They are independent of the live session: saving,
//! deleting, or clearing drafts never changes the cap table.

use crate::{
    core::{round::round_terms, validation::validate_round_draft},
    entities::{SavedRound, saved_round},
    errors::{Error, Result},
    models::RoundDraft,
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Saves a draft with its preview numbers computed against
/// `current_total_shares`.
///
/// # Errors
/// Returns `Error::Validation` if the draft has blocking errors, or an error if
/// the insert fails.
pub async fn save_draft(
    db: &DatabaseConnection,
    draft: &RoundDraft,
    current_total_shares: u64,
) -> Result<saved_round::Model> {
    validate_round_draft(draft).into_result()?;
    let terms = round_terms(draft.amount, draft.valuation, current_total_shares).ok_or(
        Error::InvalidAmount {
            amount: draft.amount,
        },
    )?;

    let saved = saved_round::ActiveModel {
        name: Set(draft.name.trim().to_string()),
        amount: Set(draft.amount),
        valuation: Set(draft.valuation),
        post_money: Set(terms.post_money_valuation),
        ownership_percentage: Set(terms.equity_percentage),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(id = saved.id, name = %saved.name, "Saved round draft");
    Ok(saved)
}

/// Lists saved drafts in the order they were saved.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_drafts(db: &DatabaseConnection) -> Result<Vec<saved_round::Model>> {
    SavedRound::find()
        .order_by_asc(saved_round::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a saved draft by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_draft_by_id(
    db: &DatabaseConnection,
    draft_id: i64,
) -> Result<Option<saved_round::Model>> {
    SavedRound::find_by_id(draft_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Deletes one saved draft.
///
/// # Errors
/// Returns `Error::NotFound` if no draft has that id.
pub async fn delete_draft(db: &DatabaseConnection, draft_id: i64) -> Result<()> {
    let result = SavedRound::delete_by_id(draft_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "saved round",
            id: draft_id.to_string(),
        });
    }
    info!(id = draft_id, "Deleted round draft");
    Ok(())
}

/// Deletes every saved draft, returning how many were removed.
///
/// # Errors
/// Returns an error if the delete fails.
pub async fn clear_drafts(db: &DatabaseConnection) -> Result<u64> {
    let result = SavedRound::delete_many().exec(db).await?;
    info!(count = result.rows_affected, "Cleared round drafts");
    Ok(result.rows_affected)
}
