//! Saved round entity - A round draft the user kept for later comparison.
//!
//! Rows are written once and never edited; the cap table engine does not read
//! them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Saved round draft database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "saved_rounds")]
pub struct Model {
    /// Unique identifier, increasing in insertion order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Round name as entered
    pub name: String,
    /// Dollars raised
    pub amount: f64,
    /// Pre-money valuation in dollars
    pub valuation: f64,
    /// Pre-money valuation plus the raise
    pub post_money: f64,
    /// Equity given away, `amount / post_money * 100`
    pub ownership_percentage: f64,
    /// When the draft was saved
    pub created_at: DateTime,
}

/// Saved drafts stand alone and reference no other table
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
