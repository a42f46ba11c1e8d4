mod corpus;
mod evaluate;
mod live;
mod record;
mod searcher;

pub use corpus::*;
pub use evaluate::*;
pub use live::*;
pub use record::*;
pub use searcher::*;

pub use search_cancel::{CANCEL_CHECK_INTERVAL, CancellationToken};
pub use track_syntax::{
    Comparison, Criterion, NULL_VALUE, Predicate, Rule, SmartFilter, Token, optimize_tokens,
    tokenize_query,
};
