pub mod facets;
pub mod search;
pub mod transform;
