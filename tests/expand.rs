use pretty_assertions::assert_eq;

use tinycpu::expand::{expand, resolve, SkipTest, JUMPS, MAX_JUMP_TARGET};
use tinycpu::instructions::by_mnemonic;
use tinycpu::interm::{build, IntermInstr};
use tinycpu::labels::LabelTable;
use tinycpu::token::{SourceLine, Token};
use tinycpu::{AsmError, Opcode, OperandKind};

fn op(m: &str) -> Opcode {
    *by_mnemonic(m).unwrap()
}

fn imm(addr: usize, m: &str, v: u8) -> IntermInstr {
    IntermInstr::new(addr, op(m), Some(Token::imm(v)), 0)
}

fn expand_lines(lines: &[SourceLine]) -> Result<Vec<IntermInstr>, AsmError> {
    let (instrs, labels) = build(lines)?;
    expand(&instrs, &labels)
}

#[test]
fn forward_jump_lowers_to_test_lo_hi() {
    let mut lines = vec![SourceLine::instr(1, "jmp", Some(Token::label("L")))];
    for n in 0..5 {
        lines.push(SourceLine::instr(2 + n, "inc", Some(Token::imm(1))));
    }
    lines.push(SourceLine::label(7, "L"));
    lines.push(SourceLine::instr(8, "halt", None));

    let out = expand_lines(&lines).unwrap();
    let mut expected = vec![imm(0, "sjfn", 7), imm(1, "jmplo", 0), imm(2, "jmphi", 1)];
    for n in 0..5 {
        expected.push(imm(3 + n, "inc", 1));
    }
    expected.push(IntermInstr::new(8, op("halt"), None, 0));
    assert_eq!(out, expected);
}

#[test]
fn backward_jump_resolves() {
    let lines = vec![
        SourceLine::instr(1, "li", Some(Token::imm(0))),
        SourceLine::label(2, "loop"),
        SourceLine::instr(3, "dec", Some(Token::imm(1))),
        SourceLine::instr(4, "jnz", Some(Token::label("loop"))),
    ];
    let out = expand_lines(&lines).unwrap();
    assert_eq!(
        out[2..].to_vec(),
        vec![imm(2, "sjf", 0), imm(3, "jmplo", 1), imm(4, "jmphi", 0)]
    );
}

#[test]
fn condition_polarity_per_pseudo() {
    let cases = [
        ("jz", "sjfn", 0),
        ("jnz", "sjf", 0),
        ("jo", "sjfn", 1),
        ("jno", "sjf", 1),
        ("jmp", "sjfn", 7),
    ];
    for (pseudo, test, flag) in cases {
        let lines = vec![
            SourceLine::label(1, "here"),
            SourceLine::instr(1, pseudo, Some(Token::label("here"))),
        ];
        let out = expand_lines(&lines).unwrap();
        assert_eq!(
            out,
            vec![imm(0, test, flag), imm(1, "jmplo", 0), imm(2, "jmphi", 0)],
            "{pseudo}"
        );
    }
}

#[test]
fn jump_table_is_invertible() {
    for &(mn, test) in JUMPS {
        assert_eq!(SkipTest::for_jump(mn), Some(test));
        assert_eq!(test.jump_mnemonic(), Some(mn));
    }
    assert_eq!(SkipTest::IfSet(3).jump_mnemonic(), None);
}

#[test]
fn expansion_emits_width_words_at_original_addresses() {
    let lines = vec![
        SourceLine::label(1, "top"),
        SourceLine::instr(2, "jo", Some(Token::label("top"))),
        SourceLine::instr(3, "jno", Some(Token::label("top"))),
        SourceLine::instr(4, "halt", None),
    ];
    let (instrs, labels) = build(&lines).unwrap();
    let out = expand(&instrs, &labels).unwrap();
    assert_eq!(out.len(), 7);
    for (i, w) in out.iter().enumerate() {
        assert_eq!(w.addr, i);
        assert!(!w.op.pseudo);
    }
    for src in instrs.iter().filter(|i| i.op.pseudo) {
        let lowered: Vec<_> = out.iter().filter(|o| o.line == src.line).collect();
        assert_eq!(lowered.len(), src.op.expansion_width());
        assert_eq!(lowered[0].addr, src.addr);
    }
}

#[test]
fn largest_target_fits_and_next_does_not() {
    let mut labels = LabelTable::new();
    labels.define("edge", MAX_JUMP_TARGET, 1).unwrap();
    labels.define("past", MAX_JUMP_TARGET + 1, 2).unwrap();

    let ok = [IntermInstr::new(0, op("jmp"), Some(Token::label("edge")), 3)];
    let out = expand(&ok, &labels).unwrap();
    assert_eq!(out[1..].to_vec(), vec![imm(1, "jmplo", 7), imm(2, "jmphi", 7)]);

    let bad = [IntermInstr::new(0, op("jmp"), Some(Token::label("past")), 4)];
    let err = expand(&bad, &labels).unwrap_err();
    assert_eq!(
        err,
        AsmError::AddressOutOfRange {
            line: 4,
            name: "past".into(),
            addr: 64,
            bits: 6
        }
    );
}

#[test]
fn undefined_label() {
    let lines = vec![SourceLine::instr(9, "jz", Some(Token::label("nowhere")))];
    let err = expand_lines(&lines).unwrap_err();
    assert_eq!(
        err,
        AsmError::UndefinedLabel {
            line: 9,
            name: "nowhere".into()
        }
    );
}

#[test]
fn resolve_register_and_immediate_params() {
    let labels = LabelTable::new();
    let instrs = [
        IntermInstr::new(0, op("add"), Some(Token::reg("R3")), 1),
        IntermInstr::new(1, op("li"), Some(Token::imm(7)), 2),
        IntermInstr::new(2, op("shli"), Some(Token::imm("0b101")), 3),
        IntermInstr::new(3, op("halt"), None, 4),
    ];
    let words = resolve(&instrs, &labels).unwrap();
    let params: Vec<u8> = words.iter().map(|w| w.param).collect();
    assert_eq!(params, vec![3, 7, 5, 0]);
}

#[test]
fn immediate_range_is_three_bits() {
    let labels = LabelTable::new();
    let malformed = ["0x+7", "0b+111", "0o-0", "-0x-7", "+7", "--3", "0x"];
    for bad in ["8", "-1", "0x10", "seven", ""].into_iter().chain(malformed) {
        let instrs = [IntermInstr::new(0, op("inc"), Some(Token::imm(bad)), 5)];
        let err = resolve(&instrs, &labels).unwrap_err();
        assert!(matches!(err, AsmError::InvalidImmediate { line: 5, .. }), "{bad}");
    }
    let instrs = [IntermInstr::new(0, op("inc"), Some(Token::imm(7)), 5)];
    assert_eq!(resolve(&instrs, &labels).unwrap()[0].param, 7);
}

#[test]
fn unknown_register() {
    let labels = LabelTable::new();
    let instrs = [IntermInstr::new(0, op("st"), Some(Token::reg("r8")), 2)];
    let err = resolve(&instrs, &labels).unwrap_err();
    assert_eq!(
        err,
        AsmError::UnknownRegister {
            line: 2,
            name: "r8".into()
        }
    );
}

#[test]
fn label_operand_on_real_opcode_fits_three_bits() {
    let lbl = Opcode {
        code: 0x13,
        mnemonic: "lbl",
        operand: OperandKind::Label,
        pseudo: false,
        width: 1,
    };
    let mut labels = LabelTable::new();
    labels.define("near", 7, 1).unwrap();
    labels.define("far", 8, 2).unwrap();

    let ok = [IntermInstr::new(0, lbl, Some(Token::label("near")), 3)];
    let words = resolve(&ok, &labels).unwrap();
    assert_eq!(words[0].param, 7);
    assert_eq!(words[0].encode(), 0x13 << 3 | 7);

    let bad = [IntermInstr::new(0, lbl, Some(Token::label("far")), 4)];
    assert_eq!(
        resolve(&bad, &labels).unwrap_err(),
        AsmError::AddressOutOfRange {
            line: 4,
            name: "far".into(),
            addr: 8,
            bits: 3
        }
    );
}
