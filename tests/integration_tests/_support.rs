use bson::Document as BsonDocument;
use docexec::storage::StorageManager;
use docexec::{Document, MemoryStorage};

pub fn d(b: BsonDocument) -> Document<'static> {
    Document::from_bson(&b).unwrap()
}

pub fn fill(st: &dyn StorageManager, ns: &str, docs: &[BsonDocument]) {
    for b in docs {
        st.insert(ns, &d(b.clone())).unwrap();
    }
}

pub fn memory_with(ns: &str, docs: &[BsonDocument]) -> std::sync::Arc<MemoryStorage> {
    let st = std::sync::Arc::new(MemoryStorage::new());
    fill(&*st, ns, docs);
    st
}

pub fn contents(st: &dyn StorageManager, ns: &str) -> Vec<BsonDocument> {
    let mut cur = st.scan(ns).unwrap();
    let mut out = Vec::new();
    while let Some(doc) = cur.current() {
        out.push(doc.to_bson().unwrap());
        cur.advance();
    }
    out
}
