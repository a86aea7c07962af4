// Classifier module: attribute inference and taxonomy mapping for variants.

pub mod attributes;
pub mod category;

pub use attributes::{classify, BIG_AND_TALL};
pub use category::map_category;
