/// One administrative action against an opened executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Insert {
        ns: String,
        json: String,
    },
    // `limit` 0 means no cap; negative returns at most one document.
    Find {
        ns: String,
        filter_json: Option<String>,
        limit: i32,
    },
    Delete {
        ns: String,
        filter_json: String,
        just_one: bool,
    },
    Update {
        ns: String,
        filter_json: String,
        doc_json: String,
        upsert: bool,
    },
    List,
    Info,
}
