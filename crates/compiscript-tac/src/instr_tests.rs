use super::instr::*;

#[test]
fn operand_forms() {
    assert_eq!(Operand::name("x").to_string(), "x");
    assert_eq!(Operand::Int(-3).to_string(), "-3");
    assert_eq!(Operand::Str("hi".into()).to_string(), "\"hi\"");
    assert_eq!(Operand::Bool(true).to_string(), "true");
    assert_eq!(Operand::Null.to_string(), "null");
    assert_eq!(Operand::EmptyArray.to_string(), "[]");
}

#[test]
fn temp_detection() {
    assert!(Operand::name("t0").is_temp());
    assert!(Operand::name("t17").is_temp());
    assert!(!Operand::name("x").is_temp());
    assert!(!Operand::Int(7).is_temp());
}

#[test]
fn instruction_lines() {
    assert_eq!(
        Tac::Assign {
            target: "x".into(),
            source: Operand::Int(1)
        }
        .to_string(),
        "x = 1"
    );
    assert_eq!(
        Tac::BinaryOp {
            target: "t0".into(),
            left: Operand::Int(1),
            op: BinOp::Add,
            right: Operand::Int(2)
        }
        .to_string(),
        "t0 = 1 + 2"
    );
    assert_eq!(
        Tac::UnaryOp {
            target: "t0".into(),
            op: UnOp::Neg,
            source: Operand::name("x")
        }
        .to_string(),
        "t0 = - x"
    );
    assert_eq!(
        Tac::CondJump {
            condition: Operand::name("t1"),
            target: "L3".into()
        }
        .to_string(),
        "if_false t1 goto L3"
    );
    assert_eq!(Tac::Jump { target: "L0".into() }.to_string(), "goto L0");
    assert_eq!(Tac::Label { name: "L0".into() }.to_string(), "L0:");
}

#[test]
fn call_with_and_without_target() {
    assert_eq!(
        Tac::Call {
            target: Some("t0".into()),
            name: "sum".into(),
            num_params: 2
        }
        .to_string(),
        "t0 = call sum, 2"
    );
    assert_eq!(
        Tac::Call {
            target: None,
            name: "print".into(),
            num_params: 1
        }
        .to_string(),
        "call print, 1"
    );
}

#[test]
fn return_forms() {
    assert_eq!(
        Tac::Return {
            value: Some(Operand::name("t0"))
        }
        .to_string(),
        "return t0"
    );
    assert_eq!(Tac::Return { value: None }.to_string(), "return");
}

#[test]
fn store_forms() {
    assert_eq!(
        Tac::SetField {
            object: Operand::name("p"),
            field: "x".into(),
            value: Operand::Int(1)
        }
        .to_string(),
        "p.x = 1"
    );
    assert_eq!(
        Tac::SetIndex {
            array: Operand::name("a"),
            index: Operand::Int(0),
            value: Operand::name("t0")
        }
        .to_string(),
        "a[0] = t0"
    );
}

#[test]
fn member_read_quotes_the_field() {
    let i = Tac::BinaryOp {
        target: "t0".into(),
        left: Operand::name("obj"),
        op: BinOp::FieldGet,
        right: Operand::Str("size".into()),
    };
    assert_eq!(i.to_string(), "t0 = obj . \"size\"");
}

#[test]
fn render_is_one_instruction_per_line() {
    let code = vec![
        Tac::Label { name: "f".into() },
        Tac::BeginFunc,
        Tac::Return { value: None },
        Tac::EndFunc,
    ];
    assert_eq!(render(&code), "f:\nBeginFunc\nreturn\nEndFunc\n");
}
