use compiscript_core::Ty;

use super::scope::VarInfo;
use super::symbol_table::{FrameLayout, FuncKey, FunctionInfo, SymbolTable};

fn func(name: &str, params: Vec<VarInfo>, ret: Ty) -> FunctionInfo {
    FunctionInfo::new(name, params, ret, false, false, None)
}

fn binding(name: &str, ty: Ty) -> VarInfo {
    VarInfo::new(name, ty, false, 1, 0)
}

#[test]
fn frame_layout_fixed_offsets() {
    assert_eq!(super::symbol_table::STATIC_LINK_OFFSET, -8);
    assert_eq!(super::symbol_table::DYNAMIC_LINK_OFFSET, 0);
    assert_eq!(super::symbol_table::RETURN_ADDR_OFFSET, 8);
}

#[test]
fn locals_grow_upward_from_16() {
    let mut layout = FrameLayout::new();
    assert_eq!(layout.alloc_local("a", 4), 16);
    assert_eq!(layout.alloc_local("b", 4), 20);
    assert_eq!(layout.alloc_local("c", 8), 24);
    assert_eq!(layout.frame_size(), 32);
}

#[test]
fn params_grow_downward_from_minus_16() {
    let mut layout = FrameLayout::new();
    assert_eq!(layout.alloc_param("x", 4), -16);
    assert_eq!(layout.alloc_param("y", 8), -20);
    assert_eq!(layout.alloc_param("z", 4), -28);
}

#[test]
fn byte_sized_locals_pack() {
    let mut layout = FrameLayout::new();
    assert_eq!(layout.alloc_local("flag", 1), 16);
    assert_eq!(layout.alloc_local("next", 4), 17);
}

#[test]
fn declare_func_rejects_duplicate_key() {
    let mut table = SymbolTable::new();
    assert!(table.declare_func(func("f", vec![], Ty::Void)));
    assert!(!table.declare_func(func("f", vec![], Ty::Integer)));
}

#[test]
fn same_name_in_different_classes_coexists() {
    let mut table = SymbolTable::new();
    let mut m1 = func("m", vec![], Ty::Void);
    m1.owning_class = Some("A".to_owned());
    let mut m2 = func("m", vec![], Ty::Void);
    m2.owning_class = Some("B".to_owned());
    assert!(table.declare_func(m1));
    assert!(table.declare_func(m2));
}

#[test]
fn enter_function_assigns_param_offsets() {
    let mut table = SymbolTable::new();
    let params = vec![binding("a", Ty::Integer), binding("b", Ty::Integer)];
    table.declare_func(func("sum", params, Ty::Integer));
    let key: FuncKey = (None, "sum".to_owned());
    table.enter_function(&key);

    let a = table.resolve_var("a").unwrap();
    assert!(a.is_parameter);
    assert_eq!(a.frame_offset, Some(-16));
    let b = table.resolve_var("b").unwrap();
    assert_eq!(b.frame_offset, Some(-20));

    table.leave_function();
    assert!(table.resolve_var("a").is_none());
}

#[test]
fn leave_function_freezes_stack_size() {
    let mut table = SymbolTable::new();
    table.declare_func(func("f", vec![], Ty::Void));
    let key: FuncKey = (None, "f".to_owned());
    table.enter_function(&key);
    let mut local = binding("x", Ty::Integer);
    table.allocate_local(&mut local);
    assert_eq!(local.frame_offset, Some(16));
    table.leave_function();
    assert_eq!(table.resolve_func(&key).unwrap().stack_size, 20);
}

#[test]
fn allocate_local_records_binding() {
    let mut table = SymbolTable::new();
    table.declare_func(func("f", vec![], Ty::Void));
    let key: FuncKey = (None, "f".to_owned());
    table.enter_function(&key);
    let mut local = binding("x", Ty::Float);
    table.allocate_local(&mut local);
    table.leave_function();

    let finfo = table.resolve_func(&key).unwrap();
    assert_eq!(finfo.local_vars.len(), 1);
    assert_eq!(finfo.local_vars[0].name, "x");
    assert_eq!(finfo.frame.locals.get("x"), Some(&16));
}

#[test]
fn memory_addresses_follow_declaration_order() {
    let mut table = SymbolTable::new();
    table.declare_var("first", binding("first", Ty::Integer));
    table.declare_var("second", binding("second", Ty::Integer));
    table.declare_var("third", binding("third", Ty::String));
    table.assign_memory_addresses();

    assert_eq!(
        table.resolve_var("first").unwrap().memory_address.as_deref(),
        Some("mem_0")
    );
    assert_eq!(
        table.resolve_var("second").unwrap().memory_address.as_deref(),
        Some("mem_1")
    );
    assert_eq!(
        table.resolve_var("third").unwrap().memory_address.as_deref(),
        Some("mem_2")
    );
}

#[test]
fn address_assignment_is_idempotent() {
    let mut table = SymbolTable::new();
    table.declare_var("g", binding("g", Ty::Integer));
    table.assign_memory_addresses();
    table.declare_var("h", binding("h", Ty::Integer));
    table.assign_memory_addresses();
    assert_eq!(
        table.resolve_var("g").unwrap().memory_address.as_deref(),
        Some("mem_0")
    );
    assert_eq!(
        table.resolve_var("h").unwrap().memory_address.as_deref(),
        Some("mem_1")
    );
}

#[test]
fn function_labels() {
    let mut table = SymbolTable::new();
    table.declare_func(func("foo", vec![], Ty::Void));
    table.assign_function_labels();
    let key: FuncKey = (None, "foo".to_owned());
    assert_eq!(
        table.resolve_func(&key).unwrap().label.as_deref(),
        Some("func_foo")
    );
}

#[test]
fn generate_label_is_monotonic() {
    let mut table = SymbolTable::new();
    assert_eq!(table.generate_label("L"), "L0");
    assert_eq!(table.generate_label("L"), "L1");
    assert_eq!(table.generate_label("case_"), "case_2");
}

#[test]
fn address_of_globals_and_locals() {
    let mut table = SymbolTable::new();
    table.declare_var("g", binding("g", Ty::Integer));
    table.assign_memory_addresses();
    assert_eq!(table.address_of("g"), (0, None));

    table.declare_func(func("f", vec![], Ty::Void));
    let key: FuncKey = (None, "f".to_owned());
    table.enter_function(&key);
    let mut local = binding("x", Ty::Integer);
    table.allocate_local(&mut local);
    table.scopes.declare("x", local);
    assert_eq!(table.address_of("x"), (1, Some(16)));
    table.leave_function();
}

#[test]
fn dump_lists_variables_functions_and_classes() {
    let mut table = SymbolTable::new();
    table.declare_var("a", binding("a", Ty::Integer));
    table.declare_func(func("foo", vec![binding("x", Ty::Integer)], Ty::Integer));
    table.assign_memory_addresses();
    table.assign_function_labels();

    let dump = table.dump();
    assert!(dump.contains("--- Symbol Table ---"));
    assert!(dump.contains("addr=mem_"));
    assert!(dump.contains("label=func_foo"));
    assert!(dump.contains("Classes:"));
}
