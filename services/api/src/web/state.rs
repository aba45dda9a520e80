//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use cookbook_core::ports::{CartSource, RecipeStore};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
///
/// `store` and `cart` are usually the same adapter behind two ports; the
/// shopping-list pipeline only ever sees the narrow `CartSource` view.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecipeStore>,
    pub cart: Arc<dyn CartSource>,
    pub config: Arc<Config>,
}
