use docexec::Reply;
use proptest::prelude::*;

proptest! {
    // Arbitrary bytes either parse into a consistent reply or are rejected; never panic.
    #[test]
    fn prop_reply_parse_total(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        if let Ok(r) = Reply::from_bytes(bytes.clone()) {
            prop_assert_eq!(r.len(), bytes.len());
            prop_assert_eq!(r.documents().filter(Result::is_ok).count(), r.n_returned());
        }
    }
}
