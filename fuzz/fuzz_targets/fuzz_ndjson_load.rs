#![no_main]
use libfuzzer_sys::fuzz_target;
use restlite::Schema;
use restlite::store::MemoryCollection;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    if data.len() > 16384 { return; }
    let col = MemoryCollection::new("fuzz", "_id", Schema::new());
    let _ = col.load_ndjson(Cursor::new(data));
    let mut out = Vec::new();
    let _ = col.write_ndjson(&mut out);
});
