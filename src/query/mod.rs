// Submodules for separation of concerns
mod eval;
mod matcher;
mod parse;
mod types;

pub use eval::{bson_equal, compare_bson, eval_filter};
pub use matcher::Matcher;
pub use parse::compile_pattern;
pub use types::{CmpOp, Filter};
