//! trybuild compile-time tests for composition_macros

#[test]
fn ui_composition_macros() {
    let t = trybuild::TestCases::new();
    t.pass("tests/trybuild/discoverable_ok.rs");
    t.compile_fail("tests/trybuild/discoverable_unknown_kind.rs");
}
