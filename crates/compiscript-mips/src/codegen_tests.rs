use indoc::indoc;

use super::codegen::MipsGen;

fn translate(tac: &str) -> String {
    MipsGen::new(tac).translate()
}

const MNEMONICS: &[&str] = &[
    "addiu", "sw", "lw", "jr", "j", "jal", "beq", "li", "la", "move", "add", "sub", "mul", "div",
    "mflo", "mfhi", "slt", "sgt", "sle", "sge", "seq", "sne", "and", "or", "syscall",
];

#[test]
fn every_instruction_is_whitelisted() {
    let asm = translate(indoc! {"
        foo:
        BeginFunc
        t0 = a + b
        t1 = a / b
        t2 = a % b
        t3 = a < b
        if_false t3 goto L0
        L0:
        return t0
        EndFunc
        x = 1
        param x
        t4 = call foo, 1
    "});
    for line in asm.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('.') {
            continue;
        }
        let first = trimmed.split_whitespace().next().unwrap();
        if first.ends_with(':') {
            continue;
        }
        assert!(
            MNEMONICS.contains(&first),
            "unexpected mnemonic {first:?} in line {line:?}"
        );
    }
}

#[test]
fn frame_adjustments_balance_per_function() {
    let asm = translate(indoc! {"
        foo:
        BeginFunc
        x = 1
        return x
        EndFunc
    "});
    let entries: Vec<i32> = asm
        .lines()
        .filter_map(|l| l.trim().strip_prefix("addiu $sp, $sp, -"))
        .map(|n| n.parse().unwrap())
        .collect();
    let exits: Vec<i32> = asm
        .lines()
        .filter_map(|l| l.trim().strip_prefix("addiu $sp, $sp, "))
        .filter(|n| !n.starts_with('-'))
        .map(|n| n.parse().unwrap())
        .collect();
    // Synthetic main's frame plus foo's frame.
    assert_eq!(entries.len(), 2);
    let mut sorted_entries = entries.clone();
    let mut sorted_exits = exits.clone();
    sorted_entries.sort_unstable();
    sorted_exits.sort_unstable();
    assert_eq!(sorted_entries, sorted_exits);
}

#[test]
fn synthetic_main_appears_exactly_once() {
    let asm = translate("x = 1\ny = 2");
    let mains = asm
        .lines()
        .filter(|l| l.trim() == "main:")
        .count();
    assert_eq!(mains, 1);
    assert!(asm.contains(".globl main"));
    assert!(asm.contains("li $v0, 10"));
}

#[test]
fn user_main_is_renamed_and_called() {
    let asm = translate(indoc! {"
        main:
        BeginFunc
        x = 1
        EndFunc
    "});
    assert!(asm.contains("user_main:"));
    assert!(asm.contains("jal user_main"));
    assert_eq!(asm.lines().filter(|l| l.trim() == "main:").count(), 1);
}

#[test]
fn recursive_call_emits_jal() {
    let asm = translate(indoc! {"
        fact:
        BeginFunc
        param n
        t0 = call fact, 1
        return t0
        EndFunc
    "});
    assert!(asm.contains("jal fact"));
}

#[test]
fn binary_op_uses_scratch_registers() {
    let asm = translate("t0 = 1 + 2");
    assert!(asm.contains("li $t8, 1"));
    assert!(asm.contains("li $t9, 2"));
    assert!(asm.contains("add $t8, $t8, $t9"));
    assert!(asm.contains("move $t0, $t8"));
}

#[test]
fn division_reads_lo_and_modulo_reads_hi() {
    let asm = translate("t0 = a / b\nt1 = a % b");
    assert!(asm.contains("div $t8, $t8, $t9"));
    assert!(asm.contains("mflo $t8"));
    assert!(asm.contains("mfhi $t8"));
}

#[test]
fn if_false_lowers_to_beq_zero() {
    let asm = translate("t0 = a < b\nif_false t0 goto L2\nL2:");
    assert!(asm.contains("beq $t0, $zero, L2"));
    assert!(asm.contains("L2:"));
}

#[test]
fn goto_lowers_to_j() {
    let asm = translate("L0:\ngoto L0");
    assert!(asm.contains("  j L0"));
}

#[test]
fn call_loads_first_four_args_into_a_registers() {
    let asm = translate(indoc! {"
        param 1
        param 2
        param 3
        t0 = call foo, 3
    "});
    assert!(asm.contains("li $a0, 1"));
    assert!(asm.contains("li $a1, 2"));
    assert!(asm.contains("li $a2, 3"));
    assert!(asm.contains("jal foo"));
    assert!(asm.contains("move $t0, $v0"));
}

#[test]
fn extra_args_ride_on_the_stack() {
    let asm = translate(indoc! {"
        param 1
        param 2
        param 3
        param 4
        param 5
        param 6
        t0 = call foo, 6
    "});
    assert!(asm.contains("li $a3, 4"));
    let pushes = asm
        .lines()
        .filter(|l| l.trim() == "addiu $sp, $sp, -4")
        .count();
    assert_eq!(pushes, 2);
    assert!(asm.contains("sw $t8, 0($sp)"));
    // One adjustment pops both pushed words after the call.
    assert!(asm.contains("addiu $sp, $sp, 8"));
}

#[test]
fn copy_of_literal_uses_li() {
    let asm = translate("x = 7");
    assert!(asm.contains("li $s0, 7"));
}

#[test]
fn bool_and_null_literals_become_immediates() {
    let asm = translate("x = true\ny = false\nz = null");
    assert!(asm.contains("li $s0, 1"));
    assert!(asm.contains("li $s1, 0"));
    assert!(asm.contains("li $s2, 0"));
}

#[test]
fn variables_spill_after_s_registers_run_out() {
    let tac: String = (0..10)
        .map(|i| format!("v{i} = {i}\n"))
        .collect();
    let asm = translate(&tac);
    // v8 is the ninth distinct name; it lands in the first spill slot.
    assert!(asm.contains("li $s7, 7"));
    assert!(asm.contains("sw $t8, -4($sp)"));
    assert!(asm.contains("sw $t8, -8($sp)"));
}

#[test]
fn return_value_goes_through_v0() {
    let asm = translate(indoc! {"
        foo:
        BeginFunc
        return 5
        EndFunc
    "});
    assert!(asm.contains("li $v0, 5"));
    assert!(asm.contains("j .epilogue_foo"));
    assert!(asm.contains(".epilogue_foo:"));
    assert!(asm.contains("jr $ra"));
}

#[test]
fn unhandled_lines_become_comments_and_are_counted() {
    let mut generator = MipsGen::new("p.x = 1\nt0 = obj . \"f\"\nx = 1");
    let asm = generator.translate();
    assert_eq!(generator.unhandled_count(), 2);
    assert!(asm.contains("# unhandled: p.x = 1"));
    assert!(asm.contains("# unhandled: t0 = obj . \"f\""));
}

#[test]
fn data_segment_declares_newline_and_print_helper_exists() {
    let asm = translate("x = 1");
    assert!(asm.contains(".data"));
    assert!(asm.contains("newline: .asciiz \"\\n\""));
    assert!(asm.contains("print:"));
    assert!(asm.contains("la $a0, newline"));
}

#[test]
fn accepts_the_rendered_form_of_typed_tac() {
    use compiscript_tac::{BinOp, Operand, Tac, render};
    let code = vec![
        Tac::Label { name: "foo".into() },
        Tac::BeginFunc,
        Tac::BinaryOp {
            target: "t0".into(),
            left: Operand::Int(1),
            op: BinOp::Add,
            right: Operand::Int(2),
        },
        Tac::Return {
            value: Some(Operand::name("t0")),
        },
        Tac::EndFunc,
    ];
    let asm = translate(&render(&code));
    assert!(asm.contains("add $t8, $t8, $t9"));
    assert!(asm.contains("move $v0, $t0"));
    assert!(asm.contains(".epilogue_foo:"));
}

#[test]
fn temporaries_map_directly_onto_t_registers() {
    let asm = translate("t3 = 1 + 2\nt7 = 3 + 4");
    assert!(asm.contains("move $t3, $t8"));
    assert!(asm.contains("move $t7, $t8"));
}

#[test]
fn high_numbered_temporaries_fall_back_to_the_general_pool() {
    let asm = translate("t9 = 1 + 2");
    assert!(asm.contains("move $s0, $t8"));
}
