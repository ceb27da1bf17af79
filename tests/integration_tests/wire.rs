use super::_support::{d, memory_with};
use bson::doc;
use docexec::reply::{OP_REPLY, REPLY_HEADER_LEN};
use docexec::{Executor, Reply};

#[test]
fn reply_bytes_parse_back() {
    let st = memory_with("w.r", &[doc! {"a": 1}, doc! {"a": "two"}, doc! {"a": [3]}]);
    let ex = Executor::new(st);
    let reply = ex.run_query("w.r", 0, &d(doc! {})).unwrap();
    let bytes = reply.into_bytes();
    assert_eq!(i32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize, bytes.len());
    assert_eq!(i32::from_le_bytes(bytes[8..12].try_into().unwrap()), OP_REPLY);
    assert_eq!(i64::from_le_bytes(bytes[12..20].try_into().unwrap()), 0);
    assert_eq!(i32::from_le_bytes(bytes[24..28].try_into().unwrap()), 3);

    let parsed = Reply::from_bytes(bytes).unwrap();
    assert_eq!(parsed.n_returned(), 3);
    let docs: Vec<_> = parsed.documents().map(|x| x.unwrap().to_bson().unwrap()).collect();
    assert_eq!(docs, vec![doc! {"a": 1}, doc! {"a": "two"}, doc! {"a": [3]}]);
}

#[test]
fn truncated_reply_is_rejected() {
    let st = memory_with("w.r", &[doc! {"a": 1}]);
    let ex = Executor::new(st);
    let mut bytes = ex.run_query("w.r", 0, &d(doc! {})).unwrap().into_bytes();
    bytes.truncate(bytes.len() - 1);
    assert!(Reply::from_bytes(bytes).is_err());
    assert!(Reply::from_bytes(vec![0u8; REPLY_HEADER_LEN - 1]).is_err());
}
