#![no_main]

use arbitrary::Arbitrary;
use health_registry::{record, Function, MemoryLedger, Response, Router};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Call {
    function: String,
    args: Vec<String>,
}

#[derive(Arbitrary, Debug)]
struct Input {
    calls: Vec<Call>,
    raw: Vec<u8>,
}

fuzz_target!(|input: Input| {
    // Decoding arbitrary stored bytes must fail cleanly.
    let _ = record::decode(&input.raw);

    let mut router = Router::new(MemoryLedger::new());
    for call in input.calls.iter().take(32) {
        let response = router.invoke(&call.function, &call.args);
        match Function::from_name(&call.function) {
            None => assert!(matches!(response, Response::Failure(_))),
            Some(f) if f.arity() != call.args.len() => {
                assert!(matches!(response, Response::Failure(_)))
            }
            Some(f) if f.registers().is_some() => {
                assert_eq!(response, Response::Success(Vec::new()))
            }
            Some(_) => {}
        }
    }

    // Everything the codec writes is valid JSON, so the scan result is too.
    match router.invoke("queryAllPatient", &[]) {
        Response::Success(payload) => {
            serde_json::from_slice::<serde_json::Value>(&payload)
                .expect("range scan produced invalid JSON");
        }
        Response::Failure(message) => panic!("range scan failed: {message}"),
    }
});
