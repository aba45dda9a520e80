pub mod cart;
pub mod domain;
pub mod ports;
pub mod report;

pub use cart::{build_shopping_list, AggregationKey, ShoppingListEntry};
pub use domain::{
    AuthSession, Ingredient, IngredientLine, NewIngredientLine, NewRecipe, Recipe, Tag, User,
    UserCredentials,
};
pub use ports::{CartSource, PortError, PortResult, RecipeFilter, RecipeStore};
pub use report::{render_shopping_list, shopping_list_filename};
