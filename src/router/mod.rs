//! Route compilation: materialized tree in, locale-aware route table out.

mod compiler;
mod replacement;
mod specification;
mod table;

pub use compiler::{DEFAULT_MIDDLEWARE, RENDER_MIDDLEWARE, RouteError, compile};
pub use replacement::{ReplacementChain, ReplacementStrategy, SlugReplacement};
pub use specification::{NAME_INHERITANCE, NAME_MAIN, RouteSpecification};
pub use table::{CompiledRoute, RouteTable, main_route_name, variant_route_name};
