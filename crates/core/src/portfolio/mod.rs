//! Portfolio documents and the helpers pages build on them.

mod defaults;
pub mod exchange;
mod footprints;
mod ordering;
mod portfolio_model;

pub use defaults::{default_about_info, placeholder_collections};
pub use footprints::{country_codes, footprint_cities, FootprintCity};
pub use ordering::{next_order_index, reorder_collections, sort_for_display};
pub use portfolio_model::*;
