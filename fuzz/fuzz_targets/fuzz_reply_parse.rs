#![no_main]
use docexec::Reply;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1 << 16 {
        return;
    }
    if let Ok(reply) = Reply::from_bytes(data.to_vec()) {
        for doc in reply.documents() {
            if doc.is_err() {
                break;
            }
        }
    }
});
