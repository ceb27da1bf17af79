use super::_support::{contents, d, memory_with};
use bson::doc;
use docexec::storage::StorageManager;
use docexec::{Executor, UpdateOutcome};

fn users() -> Vec<bson::Document> {
    vec![doc! {"name": "a"}, doc! {"name": "b"}, doc! {"name": "a"}]
}

#[test]
fn scenario_delete_all_matching() {
    let st = memory_with("test.users", &users());
    let ex = Executor::new(st.clone());
    assert_eq!(ex.delete_objects("test.users", &d(doc! {"name": "a"}), false).unwrap(), 2);
    assert_eq!(contents(&*st, "test.users"), vec![doc! {"name": "b"}]);
}

#[test]
fn scenario_delete_first_match() {
    let st = memory_with("test.users", &users());
    let ex = Executor::new(st.clone());
    assert_eq!(ex.delete_objects("test.users", &d(doc! {"name": "a"}), true).unwrap(), 1);
    assert_eq!(contents(&*st, "test.users"), vec![doc! {"name": "b"}, doc! {"name": "a"}]);
}

#[test]
fn scenario_update_first_match() {
    let st = memory_with("test.users", &users());
    let ex = Executor::new(st.clone());
    let out = ex
        .update_objects("test.users", &d(doc! {"name": "a", "age": 1}), &d(doc! {"name": "a"}), false)
        .unwrap();
    assert_eq!(out, UpdateOutcome::Updated);
    assert_eq!(
        contents(&*st, "test.users"),
        vec![doc! {"name": "a", "age": 1}, doc! {"name": "b"}, doc! {"name": "a"}]
    );
}

#[test]
fn scenario_upsert_inserts_once() {
    let st = memory_with("test.users", &users());
    let ex = Executor::new(st.clone());
    let out = ex.update_objects("test.users", &d(doc! {"name": "z"}), &d(doc! {"name": "q"}), true).unwrap();
    assert_eq!(out, UpdateOutcome::Inserted);
    assert_eq!(st.count("test.users").unwrap(), 4);
    assert!(contents(&*st, "test.users").contains(&doc! {"name": "z"}));
}

#[test]
fn scenario_bounded_query() {
    let docs: Vec<_> = (0..5).map(|i| doc! {"seq": i}).collect();
    let st = memory_with("test.five", &docs);
    let ex = Executor::new(st);
    let reply = ex.run_query("test.five", 2, &d(doc! {})).unwrap();
    assert_eq!(reply.header().n_returned, 2);
    let got: Vec<_> = reply.documents().map(|x| x.unwrap().to_bson().unwrap()).collect();
    assert_eq!(got, docs[..2].to_vec());
}

#[test]
fn scenario_system_namespace_untouched() {
    let st = memory_with("system.indexes", &[doc! {"key": 1}, doc! {"key": 2}]);
    let ex = Executor::new(st.clone());
    let err = ex.delete_objects("system.indexes", &d(doc! {}), false).unwrap_err();
    assert!(err.is_permission_denied());
    let err = ex.update_objects("system.indexes", &d(doc! {"x": 1}), &d(doc! {}), true).unwrap_err();
    assert!(err.is_permission_denied());
    assert_eq!(st.count("system.indexes").unwrap(), 2);
    // "system" without the dot is an ordinary namespace.
    let st2 = memory_with("systemd.units", &[doc! {"k": 1}]);
    let ex2 = Executor::new(st2);
    assert_eq!(ex2.delete_objects("systemd.units", &d(doc! {}), false).unwrap(), 1);
}

#[test]
fn operators_in_patterns() {
    let docs: Vec<_> = (0..10).map(|i| doc! {"n": i, "tag": if i % 3 == 0 { "x" } else { "y" }}).collect();
    let st = memory_with("t.ops", &docs);
    let ex = Executor::new(st.clone());
    let r = ex.run_query("t.ops", 0, &d(doc! {"n": {"$gte": 3, "$lt": 7}})).unwrap();
    assert_eq!(r.n_returned(), 4);
    let r = ex.run_query("t.ops", 0, &d(doc! {"$or": [{"tag": "x"}, {"n": 1}]})).unwrap();
    assert_eq!(r.n_returned(), 5);
    let n = ex.delete_objects("t.ops", &d(doc! {"n": {"$in": [2, 4, 6, 100]}}), false).unwrap();
    assert_eq!(n, 3);
    assert_eq!(st.count("t.ops").unwrap(), 7);
}
