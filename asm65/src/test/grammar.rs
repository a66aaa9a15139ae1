#![allow(clippy::cognitive_complexity)]

use crate::{AsmParser, Rule};
use ::pest::*;

#[test]
fn comment() {
    parses_to! {
        parser: AsmParser,
        input: "; anything at all 'x' !byte \"",
        rule: Rule::COMMENT,
        tokens: []
    };
}

#[test]
fn numbers() {
    parses_to! {
        parser: AsmParser,
        input: "$c0de",
        rule: Rule::hex_lit,
        tokens: [hex_lit(0, 5)]
    };
    parses_to! {
        parser: AsmParser,
        input: "%1010",
        rule: Rule::bin_lit,
        tokens: [bin_lit(0, 5)]
    };
    parses_to! {
        parser: AsmParser,
        input: "123",
        rule: Rule::dec_lit,
        tokens: [dec_lit(0, 3)]
    };
    parses_to! {
        parser: AsmParser,
        input: "3.25",
        rule: Rule::float_lit,
        tokens: [float_lit(0, 4)]
    };
    parses_to! {
        parser: AsmParser,
        input: "'x'",
        rule: Rule::char_lit,
        tokens: [char_lit(0, 3)]
    };
}

#[test]
fn strings() {
    parses_to! {
        parser: AsmParser,
        input: "\"hello\"",
        rule: Rule::string,
        tokens: [string(0, 7)]
    };
    parses_to! {
        parser: AsmParser,
        input: "\"a\\\"b\"",
        rule: Rule::string,
        tokens: [string(0, 6)]
    };
    assert!(AsmParser::parse(Rule::string, "\"unterminated").is_err());
}

#[test]
fn symbols_and_mnemonics() {
    parses_to! {
        parser: AsmParser,
        input: ".local",
        rule: Rule::symbol,
        tokens: [symbol(0, 6)]
    };
    parses_to! {
        parser: AsmParser,
        input: "@cheap",
        rule: Rule::symbol,
        tokens: [symbol(0, 6)]
    };
    // Mnemonics are reserved words...
    assert!(AsmParser::parse(Rule::symbol, "lda").is_err());
    // ...but only up to the word boundary.
    parses_to! {
        parser: AsmParser,
        input: "ldax",
        rule: Rule::symbol,
        tokens: [symbol(0, 4)]
    };
}

fn operand_rule(src: &str) -> Rule {
    let pair = AsmParser::parse(Rule::instruction, src)
        .unwrap()
        .next()
        .unwrap();
    pair.into_inner().nth(1).unwrap().as_rule()
}

#[test]
fn operand_disambiguation() {
    assert_eq!(operand_rule("lda #$10"), Rule::op_imm);
    assert_eq!(operand_rule("lda ($10,x)"), Rule::op_ind_x);
    assert_eq!(operand_rule("lda ($10),y"), Rule::op_ind_y);
    assert_eq!(operand_rule("jmp ($10)"), Rule::op_ind);
    // Trailing arithmetic demotes parentheses to a plain expression.
    assert_eq!(operand_rule("lda ($10)+2"), Rule::op_plain);
    assert_eq!(operand_rule("lda $10,x"), Rule::op_idx);
    assert_eq!(operand_rule("lda table,y"), Rule::op_idx);
    assert_eq!(operand_rule("bbr0 $10, target"), Rule::op_two);
    assert_eq!(operand_rule("asl a"), Rule::op_acc);
    assert_eq!(operand_rule("lda acc_value"), Rule::op_plain);
}

#[test]
fn width_suffix_sticks_to_the_mnemonic() {
    let pair = AsmParser::parse(Rule::instruction, "lda+2 $10")
        .unwrap()
        .next()
        .unwrap();
    let insn = pair.into_inner().next().unwrap();
    assert_eq!(insn.as_rule(), Rule::insn);
    assert_eq!(insn.as_str(), "lda+2");
}

#[test]
fn statement_separators() {
    assert!(AsmParser::parse(Rule::program, "* = 0 : nop : nop").is_ok());
    assert!(AsmParser::parse(Rule::program, "* = 0\nnop\n\nnop\n").is_ok());
    // Two statements need a separator.
    assert!(AsmParser::parse(Rule::program, "nop nop").is_err());
}

#[test]
fn labels() {
    assert!(AsmParser::parse(Rule::program, "start: lda #1").is_ok());
    assert!(AsmParser::parse(Rule::program, "start lda #1").is_ok());
    assert!(AsmParser::parse(Rule::program, "- dex\nbne -").is_ok());
    assert!(AsmParser::parse(Rule::program, "--: is not valid").is_err());
}

#[test]
fn blocks_nest() {
    assert!(AsmParser::parse(
        Rule::program,
        "!if 1 { !if 2 { nop } else { nop } }"
    )
    .is_ok());
    assert!(AsmParser::parse(Rule::program, "!if 1 { nop").is_err());
}

#[test]
fn loop_syntax() {
    assert!(AsmParser::parse(Rule::program, "!for i = 0 to 7 { nop }").is_ok());
    assert!(AsmParser::parse(Rule::program, "!for i = 0 to 7 step 2 { nop }").is_ok());
    assert!(AsmParser::parse(Rule::program, "!do { nop } !until x == 2").is_ok());
    // A dangling !until has no statement form of its own.
    assert!(AsmParser::parse(Rule::program, "!until 1").is_err());
}

#[test]
fn macro_syntax() {
    assert!(AsmParser::parse(Rule::program, "!macro m { nop }").is_ok());
    assert!(AsmParser::parse(Rule::program, "!macro m (a, b=2) { nop }").is_ok());
    assert!(AsmParser::parse(Rule::program, "!macro m a, b=2 { nop }").is_ok());
    assert!(AsmParser::parse(Rule::program, "+m 1, \"two\", 3+4").is_ok());
}

#[test]
fn pc_star_is_positional() {
    // Statement position: assignment to the program counter.
    assert!(AsmParser::parse(Rule::program, "* = $c000").is_ok());
    // Expression position: multiplication and the PC value.
    assert!(AsmParser::parse(Rule::program, "* = $c000\n!word * * 2").is_ok());
}

#[test]
fn directive_keywords_take_word_boundaries() {
    // "!iffy" must not parse as "!if" followed by garbage.
    assert!(AsmParser::parse(Rule::program, "!iffy 1 { nop }").is_err());
    assert!(AsmParser::parse(Rule::program, "!ifdef x { nop }").is_ok());
}
