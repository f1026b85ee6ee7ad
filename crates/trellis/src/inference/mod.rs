//! Inference engine: candidate effect, family, and link generation.

mod effects;
mod family;

pub use effects::{infer_interaction_effects, infer_main_effects, infer_random_effects};
pub use family::{infer_family_functions, infer_link_functions, valid_links, Family, Link};
