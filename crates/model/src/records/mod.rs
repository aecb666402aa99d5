pub mod error;
pub mod facet;
pub mod record;
pub mod record_set;
pub mod table;
