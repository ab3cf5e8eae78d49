//! Shared helpers for compiler tests.

use compiscript_tac::Tac;

use crate::{Compilation, Error};

/// Compiles expecting no syntax or semantic errors.
pub fn expect_ok(source: &str) -> Compilation {
    match Compilation::compile(source) {
        Ok(compilation) => compilation,
        Err(Error::Parse(diags)) => panic!(
            "unexpected syntax errors:\n{}",
            diags.printer().source(source).render()
        ),
        Err(Error::Analyze(diags)) => panic!(
            "unexpected semantic errors:\n{}",
            diags.printer().source(source).render()
        ),
    }
}

/// Collected semantic error messages; panics on syntax errors and on a
/// clean program.
pub fn semantic_errors(source: &str) -> Vec<String> {
    match Compilation::compile(source) {
        Ok(_) => panic!("expected semantic errors, program was clean"),
        Err(Error::Parse(diags)) => panic!(
            "unexpected syntax errors:\n{}",
            diags.printer().source(source).render()
        ),
        Err(Error::Analyze(diags)) => diags.iter().map(|d| d.message.clone()).collect(),
    }
}

/// Asserts that some semantic error message contains `needle`.
pub fn assert_has_error(source: &str, needle: &str) {
    let errors = semantic_errors(source);
    assert!(
        errors.iter().any(|m| m.contains(needle)),
        "missing {needle:?} among errors:\n{}",
        errors.join("\n")
    );
}

/// Full pipeline up to TAC for a clean program.
pub fn tac_for(source: &str) -> Vec<Tac> {
    expect_ok(source).generate_tac()
}

/// Distinct temporary names (`t<digits>`) appearing anywhere in the TAC text.
pub fn temp_names(code: &[Tac]) -> std::collections::BTreeSet<String> {
    let text = compiscript_tac::render(code);
    let mut names = std::collections::BTreeSet::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b't'
            && (i == 0 || !bytes[i - 1].is_ascii_alphanumeric())
            && i + 1 < bytes.len()
            && bytes[i + 1].is_ascii_digit()
        {
            let start = i;
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            names.insert(text[start..i].to_owned());
        } else {
            i += 1;
        }
    }
    names
}
