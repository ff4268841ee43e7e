//! PubMed query construction
//!
//! [`SearchFilters`] turns the basic-search form into a [`BuiltQuery`];
//! [`manufacturer_query`] builds the per-year count queries of the trend views.

mod builder;
mod manufacturer;

pub use builder::{build, date_range_clause, mesh_clause, BuiltQuery, SearchFilters, SearchType};
pub use manufacturer::{
    company_clause, expand_aliases, manufacturer_query, year_range_clause, NameAlias,
};
