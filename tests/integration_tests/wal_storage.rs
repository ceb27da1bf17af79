use super::_support::{contents, d, fill};
use bson::doc;
use docexec::storage::StorageManager;
use docexec::{EngineConfig, Executor, UpdateOutcome, WalStorage};
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn executor_mutations_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("db.wal");
    {
        let st = Arc::new(WalStorage::open(&path).unwrap());
        fill(&*st, "app.items", &[doc! {"k": 1}, doc! {"k": 2}, doc! {"k": 3}]);
        let ex = Executor::new(st);
        assert_eq!(ex.delete_objects("app.items", &d(doc! {"k": 2}), false).unwrap(), 1);
        let out = ex.update_objects("app.items", &d(doc! {"k": 30}), &d(doc! {"k": 3}), false).unwrap();
        assert_eq!(out, UpdateOutcome::Updated);
        let out = ex.update_objects("app.items", &d(doc! {"k": 4}), &d(doc! {"k": 4}), true).unwrap();
        assert_eq!(out, UpdateOutcome::Inserted);
    }
    let st = WalStorage::open(&path).unwrap();
    assert_eq!(contents(&st, "app.items"), vec![doc! {"k": 1}, doc! {"k": 30}, doc! {"k": 4}]);
}

#[test]
fn open_from_config_picks_storage() {
    let dir = tempdir().unwrap();
    let cfg = EngineConfig { db_path: Some(dir.path().join("c.wal")), sync_on_write: true, ..EngineConfig::default() };
    let ex = docexec::open(&cfg).unwrap();
    ex.storage().insert("c.n", &d(doc! {"v": 1})).unwrap();
    drop(ex);
    let ex = docexec::open(&cfg).unwrap();
    assert_eq!(ex.run_query("c.n", 0, &d(doc! {})).unwrap().n_returned(), 1);

    let mem = docexec::open(&EngineConfig::default()).unwrap();
    assert!(mem.storage().namespaces().unwrap().is_empty());
}
