pub mod index;
pub mod ingredient;

pub use index::{levenshtein, IngredientSearchIndex, SearchSettings};
pub use ingredient::{InMemoryIngredientRepository, Ingredient, IngredientRepository};
