use super::regalloc::{AllocError, RegisterAllocator, VarLocation};

#[test]
fn same_variable_keeps_its_register() {
    let mut alloc = RegisterAllocator::new();
    let r1 = alloc.get_reg("x");
    let r2 = alloc.get_reg("x");
    assert_eq!(r1, r2);
}

#[test]
fn temporaries_hand_out_in_order() {
    let mut alloc = RegisterAllocator::new();
    assert_eq!(alloc.get_reg("a"), "$t0");
    assert_eq!(alloc.get_reg("b"), "$t1");
    assert_eq!(alloc.get_reg("c"), "$t2");
}

#[test]
fn exhaustion_spills_the_oldest_register() {
    let mut alloc = RegisterAllocator::new();
    for i in 0..10 {
        alloc.get_reg(&format!("v{i}"));
    }
    // All ten $t registers are taken; the next request evicts $t0.
    let reg = alloc.get_reg("fresh");
    assert_eq!(reg, "$t0");
    assert_eq!(
        alloc.location_of("v0"),
        Some(&VarLocation::Stack(-4))
    );
    let spill_code = alloc.take_spill_code();
    assert_eq!(spill_code.len(), 1);
    assert!(spill_code[0].starts_with("sw $t0, -4($sp)"));
}

#[test]
fn successive_spills_descend_the_stack() {
    let mut alloc = RegisterAllocator::new();
    for i in 0..10 {
        alloc.get_reg(&format!("v{i}"));
    }
    alloc.get_reg("a");
    alloc.get_reg("b");
    assert_eq!(alloc.location_of("v0"), Some(&VarLocation::Stack(-4)));
    assert_eq!(alloc.location_of("v1"), Some(&VarLocation::Stack(-8)));
}

#[test]
fn free_reg_returns_to_pool() {
    let mut alloc = RegisterAllocator::new();
    let reg = alloc.get_reg("x");
    assert!(alloc.free_reg(&reg));
    assert!(alloc.location_of("x").is_none());
    // The freed register is available again.
    for i in 0..10 {
        alloc.get_reg(&format!("v{i}"));
    }
    assert!(alloc.take_spill_code().is_empty());
}

#[test]
fn freeing_a_free_register_is_a_no_op() {
    let mut alloc = RegisterAllocator::new();
    assert!(!alloc.free_reg("$t5"));
}

#[test]
fn load_from_stack_requires_a_stack_resident() {
    let mut alloc = RegisterAllocator::new();
    assert_eq!(
        alloc.load_from_stack("ghost"),
        Err(AllocError::NotOnStack("ghost".to_owned()))
    );
    let reg = alloc.get_reg("x");
    // In a register, not on the stack.
    assert!(alloc.load_from_stack("x").is_err());
    let _ = reg;
}

#[test]
fn load_from_stack_emits_lw_and_reassigns() {
    let mut alloc = RegisterAllocator::new();
    for i in 0..10 {
        alloc.get_reg(&format!("v{i}"));
    }
    alloc.get_reg("extra"); // spills v0 to -4($sp)
    alloc.take_spill_code();

    let reg = alloc.load_from_stack("v0").unwrap();
    assert_eq!(alloc.location_of("v0"), Some(&VarLocation::Reg(reg.clone())));
    let code = alloc.take_spill_code();
    // Reloading may spill another victim first, then loads v0.
    let load_line = code.last().unwrap();
    assert!(load_line.starts_with(&format!("lw {reg}, -4($sp)")));
}
