//! Entity module - `SeaORM` entity definitions for the draft store.

pub mod saved_round;

pub use saved_round::{
    Column as SavedRoundColumn, Entity as SavedRound, Model as SavedRoundModel,
};
