use compiscript_core::Ty;

use super::scope::{ScopeStack, VarInfo};

fn binding(name: &str, ty: Ty) -> VarInfo {
    VarInfo::new(name, ty, false, 1, 0)
}

#[test]
fn declare_and_resolve() {
    let mut scopes = ScopeStack::new();
    assert!(scopes.declare("x", binding("x", Ty::Integer)));
    assert_eq!(scopes.resolve("x").unwrap().ty, Ty::Integer);
    assert!(scopes.resolve("y").is_none());
}

#[test]
fn same_scope_collision() {
    let mut scopes = ScopeStack::new();
    assert!(scopes.declare("x", binding("x", Ty::Integer)));
    assert!(!scopes.declare("x", binding("x", Ty::String)));
    // The original binding survives.
    assert_eq!(scopes.resolve("x").unwrap().ty, Ty::Integer);
}

#[test]
fn shadowing_across_levels() {
    let mut scopes = ScopeStack::new();
    scopes.declare("x", binding("x", Ty::Integer));
    scopes.push();
    assert!(scopes.declare("x", binding("x", Ty::String)));
    assert_eq!(scopes.resolve("x").unwrap().ty, Ty::String);
    scopes.pop();
    assert_eq!(scopes.resolve("x").unwrap().ty, Ty::Integer);
}

#[test]
fn pop_destroys_bindings() {
    let mut scopes = ScopeStack::new();
    scopes.push();
    scopes.declare("local", binding("local", Ty::Boolean));
    scopes.pop();
    assert!(scopes.resolve("local").is_none());
}

#[test]
fn global_frame_survives_stray_pop() {
    let mut scopes = ScopeStack::new();
    scopes.declare("g", binding("g", Ty::Integer));
    scopes.pop();
    assert_eq!(scopes.level(), 0);
    assert!(scopes.resolve("g").is_some());
}

#[test]
fn declared_in_current_ignores_outer_frames() {
    let mut scopes = ScopeStack::new();
    scopes.declare("x", binding("x", Ty::Integer));
    scopes.push();
    assert!(!scopes.declared_in_current("x"));
    scopes.declare("x", binding("x", Ty::Integer));
    assert!(scopes.declared_in_current("x"));
}

#[test]
fn levels_track_depth() {
    let mut scopes = ScopeStack::new();
    assert_eq!(scopes.level(), 0);
    scopes.push();
    assert_eq!(scopes.level(), 1);
    scopes.push();
    assert_eq!(scopes.level(), 2);
    scopes.pop();
    assert_eq!(scopes.level(), 1);
}

#[test]
fn resolve_mut_allows_inference() {
    let mut scopes = ScopeStack::new();
    scopes.declare("x", binding("x", Ty::Unknown));
    scopes.resolve_mut("x").unwrap().ty = Ty::Integer;
    assert_eq!(scopes.resolve("x").unwrap().ty, Ty::Integer);
}
