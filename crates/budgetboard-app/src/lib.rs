// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod forms;
pub mod ids;
pub mod model;
pub mod pagination;
pub mod schema;
pub mod search;
pub mod slot;
pub mod state;
pub mod table;
pub mod value;

pub use forms::*;
pub use ids::*;
pub use model::*;
pub use pagination::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS, Pagination};
pub use search::{CompiledQuery, Query, SearchOptions, normalize, search, value_matches};
pub use state::*;
pub use table::*;
pub use value::*;
