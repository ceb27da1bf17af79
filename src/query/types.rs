use bson::Bson;

/// Dotted path segments accepted in one field reference.
pub(crate) const MAX_PATH_DEPTH: usize = 32;
pub(crate) const MAX_PATH_LEN: usize = 1024;
/// Largest `$in` / `$nin` operand array.
pub(crate) const MAX_IN_SET: usize = 1000;
/// `$and` / `$or` / `$nor` / `$not` levels a pattern may stack.
pub(crate) const MAX_NESTING: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Compiled form of a filter pattern.
///
/// An empty pattern compiles to `True`. `$nor` compiles to `Not(Or(..))`. Field equality is
/// `Cmp` with `CmpOp::Eq`; `Ne` and `Nin` also hold for documents lacking the field.
#[derive(Debug, Clone)]
pub enum Filter {
    True,
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Exists { path: String, exists: bool },
    In { path: String, values: Vec<Bson> },
    Nin { path: String, values: Vec<Bson> },
    Cmp { path: String, op: CmpOp, value: Bson },
    #[cfg(feature = "regex")]
    Regex { path: String, re: regex::Regex },
}
