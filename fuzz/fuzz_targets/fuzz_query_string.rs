#![no_main]
use libfuzzer_sys::fuzz_target;
use restlite::RawParams;
use restlite::query::{Coercion, compile_filters, eval_filter, parse_params};

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    let Ok(s) = std::str::from_utf8(data) else { return };
    // a=b&c=d
    let raw: RawParams = s
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .collect();
    let spec = parse_params(&raw);
    for coercion in [Coercion::Lenient, Coercion::Strict] {
        let f = compile_filters(&spec.filters, coercion);
        let _ = eval_filter(&bson::doc! {"a": 1, "b": "x", "c": [1, "2"]}, &f);
    }
});
