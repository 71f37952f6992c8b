//! End-to-end tests exercising the evaluator across crate boundaries
//! (resolver + intrinsics + interface binding + interpreter together),
//! rather than one module in isolation: named-property tests in
//! `properties` and full program scenarios in `scenarios`.

mod scenarios;
