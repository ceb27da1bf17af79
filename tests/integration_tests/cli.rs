use docexec::cli::{Command, OutputMode, run, run_with_format};
use docexec::{EngineConfig, Executor};
use tempfile::tempdir;

fn exec_str(ex: &Executor, cmd: Command) -> String {
    let mut out = Vec::new();
    run(ex, cmd, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn cli_round_trip_on_wal() {
    let dir = tempdir().unwrap();
    let cfg = EngineConfig { db_path: Some(dir.path().join("cli.wal")), ..EngineConfig::default() };
    {
        let ex = docexec::open(&cfg).unwrap();
        exec_str(&ex, Command::Insert { ns: "shop.items".into(), json: r#"{"sku":"a1","qty":3}"#.into() });
        exec_str(&ex, Command::Insert { ns: "shop.items".into(), json: r#"{"sku":"b2","qty":0}"#.into() });
        let out = exec_str(
            &ex,
            Command::Update {
                ns: "shop.items".into(),
                filter_json: r#"{"sku":"b2"}"#.into(),
                doc_json: r#"{"sku":"b2","qty":7}"#.into(),
                upsert: false,
            },
        );
        assert_eq!(out.trim(), "outcome=updated");
    }
    let ex = docexec::open(&cfg).unwrap();
    let found = exec_str(&ex, Command::Find { ns: "shop.items".into(), filter_json: Some(r#"{"qty":{"$gt":5}}"#.into()), limit: 0 });
    let v: serde_json::Value = serde_json::from_str(found.trim()).unwrap();
    assert_eq!(v["sku"], "b2");
    assert_eq!(exec_str(&ex, Command::List).trim(), "shop.items 2");
}

#[test]
fn json_mode_and_bad_input() {
    let ex = docexec::open(&EngineConfig::default()).unwrap();
    let mut out = Vec::new();
    run_with_format(
        &ex,
        Command::Delete { ns: "a.b".into(), filter_json: "{}".into(), just_one: false },
        OutputMode::Json,
        &mut out,
    )
    .unwrap();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["deleted"], 0);

    let mut out = Vec::new();
    assert!(run(&ex, Command::Insert { ns: "a.b".into(), json: "not json".into() }, &mut out).is_err());
    let mut out = Vec::new();
    assert!(run(&ex, Command::Insert { ns: "a.b".into(), json: "[1,2]".into() }, &mut out).is_err());
}
