use crate::state::Severity;
use crate::{assemble, assemble_with, Assembly, Options};

mod grammar;

pub fn assemble_ok(src: &str) -> Assembly {
    let assembly = assemble(src).unwrap();
    let errors: Vec<String> = assembly
        .diagnostics
        .iter()
        .filter(|d| d.severity != Severity::Warning)
        .map(|d| d.to_string())
        .collect();
    assert!(errors.is_empty(), "unexpected diagnostics: {:#?}", errors);
    assembly
}

pub fn assemble_bytes(src: &str) -> Vec<u8> {
    assemble_ok(src).image.to_plain()
}

/// Assembles `!byte <expr>` and returns the single emitted byte.
fn expr_byte(expr: &str) -> u8 {
    let bytes = assemble_bytes(&format!("* = $1000\n!byte {}", expr));
    assert_eq!(bytes.len(), 1);
    bytes[0]
}

fn has_errors(src: &str) -> bool {
    match assemble(src) {
        Ok(assembly) => assembly.has_errors(),
        Err(_) => true,
    }
}

// ----- small end-to-end programs -------------------------------------------

#[test]
fn minimal_instruction() {
    let bytes = assemble_bytes(
        "* = $c000
start: lda #$42
       rts",
    );
    assert_eq!(bytes, vec![0xa9, 0x42, 0x60]);
}

#[test]
fn forward_absolute() {
    let bytes = assemble_bytes(
        "* = $1000
  jmp target
target: rts",
    );
    assert_eq!(bytes, vec![0x4c, 0x03, 0x10, 0x60]);
}

#[test]
fn relative_branch_back() {
    let bytes = assemble_bytes(
        "* = $0800
loop: dex
      bne loop",
    );
    assert_eq!(bytes, vec![0xca, 0xd0, 0xfd]);
}

#[test]
fn expression_and_data() {
    let bytes = assemble_bytes(
        "* = $0000
!byte 1+2*3, $ff & %1010, <($1234), >($1234)",
    );
    assert_eq!(bytes, vec![0x07, 0x0a, 0x34, 0x12]);
}

#[test]
fn macro_expansion() {
    let bytes = assemble_bytes(
        "!macro poke addr, val { lda #val : sta addr }
* = $c000
  +poke $d020, 0",
    );
    assert_eq!(bytes, vec![0xa9, 0x00, 0x8d, 0x20, 0xd0]);
}

#[test]
fn conditional_skipping() {
    let bytes = assemble_bytes(
        "DEBUG = 0
* = $c000
!if DEBUG { lda #$ff } else { lda #$00 }",
    );
    assert_eq!(bytes, vec![0xa9, 0x00]);
}

// ----- expressions ---------------------------------------------------------

#[test]
fn operator_precedence() {
    assert_eq!(expr_byte("1+2*3"), 7);
    assert_eq!(expr_byte("(1+2)*3"), 9);
    assert_eq!(expr_byte("16/5"), 3);
    assert_eq!(expr_byte("1 << 4"), 16);
    assert_eq!(expr_byte("$ff >> 4"), 15);
    assert_eq!(expr_byte("2**3"), 8);
    assert_eq!(expr_byte("2 + 2 ** 3"), 10);
    assert_eq!(expr_byte("$0f | $30 & $10"), 0x1f);
    assert_eq!(expr_byte("1 | 2 ^ 2"), 1);
}

#[test]
fn comparisons_yield_zero_or_one() {
    assert_eq!(expr_byte("2 < 3"), 1);
    assert_eq!(expr_byte("2 > 3"), 0);
    assert_eq!(expr_byte("3 <= 3"), 1);
    assert_eq!(expr_byte("5 == 5"), 1);
    assert_eq!(expr_byte("5 != 5"), 0);
    assert_eq!(expr_byte("5 <> 3"), 1);
    assert_eq!(expr_byte("1 && 0"), 0);
    assert_eq!(expr_byte("1 || 0"), 1);
    assert_eq!(expr_byte("!0"), 1);
}

#[test]
fn unary_operators() {
    assert_eq!(expr_byte("-1 & $ff"), 0xff);
    assert_eq!(expr_byte("~0 & $ff"), 0xff);
    assert_eq!(expr_byte("<($1234)"), 0x34);
    assert_eq!(expr_byte(">($1234)"), 0x12);
    // Unary operators bind tighter than any infix operator.
    assert_eq!(expr_byte("<$1234 + 1"), 0x35);
    assert_eq!(expr_byte("int(-2 ** 2)"), 4);
}

#[test]
fn integer_float_promotion() {
    assert_eq!(expr_byte("3.9"), 3);
    assert_eq!(expr_byte("1.5 + 1.5"), 3);
    assert_eq!(expr_byte("int(2.5 * 2)"), 5);
    assert_eq!(expr_byte("int(float(65))"), 65);
    assert_eq!(expr_byte("7 % 3"), 1);
}

#[test]
fn builtin_functions() {
    assert_eq!(expr_byte("int(sin(0)) + 1"), 1);
    assert_eq!(expr_byte("len(\"abc\")"), 3);
    assert_eq!(expr_byte("len([5, 6, 7])"), 3);
    assert_eq!(expr_byte("is_string(\"x\")"), 1);
    assert_eq!(expr_byte("is_list([1])"), 1);
    assert_eq!(expr_byte("is_number(2.5)"), 1);
    assert_eq!(expr_byte("is_number(\"x\")"), 0);
}

#[test]
fn char_literals() {
    assert_eq!(expr_byte("'A'"), 65);
    assert_eq!(expr_byte("'0' + 1"), 0x31);
}

#[test]
fn pc_in_expressions() {
    let bytes = assemble_bytes("* = $1000\n!word *");
    assert_eq!(bytes, vec![0x00, 0x10]);
}

#[test]
fn division_by_zero_is_an_error() {
    assert!(has_errors("* = 0\n!byte 1/0"));
    assert!(has_errors("* = 0\n!byte 1.0 / 0.0"));
}

#[test]
fn bitwise_on_float_is_an_error() {
    assert!(has_errors("* = 0\n!byte 1.5 & 2"));
    assert!(has_errors("* = 0\n!byte ~1.5"));
}

#[test]
fn arcsin_domain_error() {
    assert!(has_errors("* = 0\n!byte int(arcsin(2))"));
}

// ----- addressing width ----------------------------------------------------

#[test]
fn backward_reference_uses_zero_page() {
    let bytes = assemble_bytes("value = $10\n* = $1000\nlda value\nrts");
    assert_eq!(bytes, vec![0xa5, 0x10, 0x60]);
}

#[test]
fn forward_reference_reserves_absolute() {
    // The value would fit in zero page, but it is not known in pass 1.
    let bytes = assemble_bytes("* = $1000\nlda value\nrts\nvalue = $10");
    assert_eq!(bytes, vec![0xad, 0x10, 0x00, 0x60]);
}

#[test]
fn width_suffix_forces_encoding() {
    let bytes = assemble_bytes("* = $1000\nlda+2 $10");
    assert_eq!(bytes, vec![0xad, 0x10, 0x00]);
    let bytes = assemble_bytes("* = $1000\nlda+1 target\ntarget = $20");
    assert_eq!(bytes, vec![0xa5, 0x20]);
    assert!(has_errors("* = $1000\nlda+1 $1234"));
}

#[test]
fn indexed_modes() {
    let bytes = assemble_bytes("* = 0\nlda $10,x\nlda $1234,x\nldx $10,y\nsta $1234,y");
    assert_eq!(
        bytes,
        vec![0xb5, 0x10, 0xbd, 0x34, 0x12, 0xb6, 0x10, 0x99, 0x34, 0x12]
    );
}

#[test]
fn indirect_modes() {
    let bytes = assemble_bytes("* = 0\njmp ($1234)\nlda ($20,x)\nlda ($20),y");
    assert_eq!(bytes, vec![0x6c, 0x34, 0x12, 0xa1, 0x20, 0xb1, 0x20]);
}

#[test]
fn parenthesized_operand_is_not_indirect() {
    // Trailing arithmetic turns the operand into a plain expression.
    let bytes = assemble_bytes("* = 0\nlda ($20)+2");
    assert_eq!(bytes, vec![0xa5, 0x22]);
}

#[test]
fn accumulator_shifts() {
    let bytes = assemble_bytes("* = 0\nasl\nlsr a\nrol");
    assert_eq!(bytes, vec![0x0a, 0x4a, 0x2a]);
}

#[test]
fn branch_out_of_range() {
    assert!(has_errors("* = $0800\nbne far\n!fill 200\nfar: rts"));
}

#[test]
fn immediate_lo_hi_of_label() {
    let bytes = assemble_bytes(
        "* = $c000
lda #<target
ldx #>target
target: rts",
    );
    assert_eq!(bytes, vec![0xa9, 0x04, 0xa2, 0xc0, 0x60]);
}

// ----- CPU variants --------------------------------------------------------

#[test]
fn cmos_gated_by_cpu() {
    assert!(has_errors("* = 0\nbra *"));
    let bytes = assemble_bytes("!cpu 65c02\n* = 0\nbra *");
    assert_eq!(bytes, vec![0x80, 0xfe]);
    let bytes = assemble_bytes("!cpu 65c02\n* = 0\nlda ($12)\nphx\nstz $30");
    assert_eq!(bytes, vec![0xb2, 0x12, 0xda, 0x64, 0x30]);
    assert!(has_errors("* = 0\nlda ($12)"));
}

#[test]
fn wdc_extensions() {
    let bytes = assemble_bytes("!cpu w65c02\n* = 0\nwai\nstp\nrmb3 $45\nsmb0 $46");
    assert_eq!(bytes, vec![0xcb, 0xdb, 0x37, 0x45, 0x87, 0x46]);
    let bytes = assemble_bytes("!cpu w65c02\n* = 0\nbbr0 $12, *");
    assert_eq!(bytes, vec![0x0f, 0x12, 0xfd]);
    assert!(has_errors("!cpu 65c02\n* = 0\nwai"));
}

#[test]
fn nmos_undocumented_opcodes() {
    let bytes = assemble_bytes("!cpu nmos6502\n* = 0\nlax $10\nslo $20\nanc #$12");
    assert_eq!(bytes, vec![0xa7, 0x10, 0x07, 0x20, 0x0b, 0x12]);
    assert!(has_errors("* = 0\nlax $10"));
}

#[test]
fn cpu_block_restores_variant() {
    let bytes = assemble_bytes("* = 0\n!cpu 65c02 { phx }\nnop");
    assert_eq!(bytes, vec![0xda, 0xea]);
    assert!(has_errors("* = 0\n!cpu 65c02 { phx }\nphx"));
}

#[test]
fn jmp_absolute_indexed_indirect() {
    let bytes = assemble_bytes("!cpu 65c02\n* = 0\njmp ($1000,x)");
    assert_eq!(bytes, vec![0x7c, 0x00, 0x10]);
}

// ----- symbols, zones and anonymous labels ---------------------------------

#[test]
fn zone_locals_do_not_collide() {
    let bytes = assemble_bytes(
        "* = $c000
!zone first {
.loop: dex
       bne .loop
}
!zone second {
.loop: dey
       bne .loop
}",
    );
    assert_eq!(bytes, vec![0xca, 0xd0, 0xfd, 0x88, 0xd0, 0xfd]);
}

#[test]
fn cheap_locals_rescope_at_global_labels() {
    let bytes = assemble_bytes(
        "* = $c000
one: @wait: dex
     bne @wait
two: @wait: dey
     bne @wait",
    );
    assert_eq!(bytes, vec![0xca, 0xd0, 0xfd, 0x88, 0xd0, 0xfd]);
}

#[test]
fn bare_lookup_cascades_into_zone() {
    let bytes = assemble_bytes(
        "* = $c000
!zone z {
.val = $22
 lda #val
}",
    );
    assert_eq!(bytes, vec![0xa9, 0x22]);
}

#[test]
fn anonymous_backward() {
    let bytes = assemble_bytes("* = $c000\n- dex\n  bne -");
    assert_eq!(bytes, vec![0xca, 0xd0, 0xfd]);
}

#[test]
fn anonymous_forward() {
    let bytes = assemble_bytes("* = $c000\n  jmp +\n  nop\n+ rts");
    assert_eq!(bytes, vec![0x4c, 0x04, 0xc0, 0xea, 0x60]);
}

#[test]
fn anonymous_depth() {
    let bytes = assemble_bytes("* = 0\n-- dex\n- dey\n bne --");
    assert_eq!(bytes, vec![0xca, 0x88, 0xd0, 0xfc]);
}

#[test]
fn redefinition_is_an_error() {
    assert!(has_errors("a = 1\na = 2"));
    assert!(has_errors("* = 0\nlabel: nop\nlabel: nop"));
}

#[test]
fn set_allows_reassignment() {
    let bytes = assemble_bytes("!set v = 1\n!set v = 2\n* = 0\n!byte v");
    assert_eq!(bytes, vec![0x02]);
}

#[test]
fn undefined_symbol_is_an_error() {
    assert!(has_errors("* = 0\n!byte nothing"));
}

#[test]
fn ifdef_divergence_is_a_phase_error() {
    // Pass 1 skips the block (the symbol is not defined yet), pass 2 would
    // take it; the label moves and the assembler must refuse.
    let result = assemble("* = $c000\n!ifdef later { nop }\nlater: rts");
    assert!(result.is_err());
}

#[test]
fn symbol_export() {
    let assembly = assemble_ok("* = $c000\nstart: rts\nvalue = $0123");
    assert!(assembly
        .symbols
        .iter()
        .any(|(name, addr)| name == "start" && *addr == 0xc000));
    assert!(assembly
        .symbols
        .iter()
        .any(|(name, addr)| name == "value" && *addr == 0x0123));
}

// ----- data and text directives --------------------------------------------

#[test]
fn word_endianness() {
    assert_eq!(
        assemble_bytes("* = 0\n!word $1234, $5678"),
        vec![0x34, 0x12, 0x78, 0x56]
    );
    assert_eq!(assemble_bytes("* = 0\n!16be $1234"), vec![0x12, 0x34]);
    assert_eq!(
        assemble_bytes("* = 0\n!24 $123456"),
        vec![0x56, 0x34, 0x12]
    );
    assert_eq!(
        assemble_bytes("* = 0\n!24be $123456"),
        vec![0x12, 0x34, 0x56]
    );
    assert_eq!(
        assemble_bytes("* = 0\n!32 $01020304"),
        vec![0x04, 0x03, 0x02, 0x01]
    );
    assert_eq!(
        assemble_bytes("* = 0\n!32be 1"),
        vec![0x00, 0x00, 0x00, 0x01]
    );
}

#[test]
fn data_overflow_warns_but_emits() {
    let assembly = assemble("* = 0\n!byte 256").unwrap();
    assert!(!assembly.has_errors());
    assert!(assembly
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Warning));
    assert_eq!(assembly.image.to_plain(), vec![0x00]);
}

#[test]
fn hex_directive() {
    assert_eq!(
        assemble_bytes("* = 0\n!hex \"deadBEEF\""),
        vec![0xde, 0xad, 0xbe, 0xef]
    );
    assert_eq!(
        assemble_bytes("* = 0\n!hex \"01 02 03\""),
        vec![0x01, 0x02, 0x03]
    );
    assert!(has_errors("* = 0\n!hex \"abc\""));
    assert!(has_errors("* = 0\n!hex \"zz\""));
}

#[test]
fn fill_and_skip() {
    assert_eq!(
        assemble_bytes("* = 0\n!fill 3, $aa"),
        vec![0xaa, 0xaa, 0xaa]
    );
    assert_eq!(assemble_bytes("* = 0\n!fill 2"), vec![0x00, 0x00]);
    assert_eq!(
        assemble_bytes("* = $1000\n!byte 1\n!skip 2\n!byte 2"),
        vec![0x01, 0x00, 0x00, 0x02]
    );
}

#[test]
fn initmem_governs_gaps() {
    assert_eq!(
        assemble_bytes("!initmem $ff\n* = $1000\n!byte 1\n!skip 1\n!byte 2"),
        vec![0x01, 0xff, 0x02]
    );
    assert!(has_errors("* = 0\n!byte 1\n!initmem $ff"));
}

#[test]
fn align_pads_to_boundary() {
    let bytes = assemble_bytes("* = $1001\n!align 3, 0, $ea\n!byte 1");
    assert_eq!(bytes, vec![0xea, 0xea, 0xea, 0x01]);
    // Already aligned: no padding.
    let bytes = assemble_bytes("* = $1000\n!align 3, 0, $ea\n!byte 1");
    assert_eq!(bytes, vec![0x01]);
}

#[test]
fn text_conversions() {
    assert_eq!(assemble_bytes("* = 0\n!raw \"A\""), vec![0x41]);
    assert_eq!(assemble_bytes("* = 0\n!scr \"abc\""), vec![0x01, 0x02, 0x03]);
    assert_eq!(assemble_bytes("* = 0\n!pet \"Ab\""), vec![0xc1, 0x42]);
    // Numeric items bypass the table.
    assert_eq!(assemble_bytes("* = 0\n!scr \"a\", 13"), vec![0x01, 0x0d]);
}

#[test]
fn convtab_selects_active_table() {
    assert_eq!(assemble_bytes("* = 0\n!text \"a\""), vec![0x61]);
    assert_eq!(
        assemble_bytes("!convtab scr\n* = 0\n!text \"a\""),
        vec![0x01]
    );
    // The block form restores the outer table.
    assert_eq!(
        assemble_bytes("* = 0\n!ct scr { !text \"a\" }\n!text \"a\""),
        vec![0x01, 0x61]
    );
}

#[test]
fn scrxor_applies_after_conversion() {
    assert_eq!(assemble_bytes("* = 0\n!scrxor $80, \"a\""), vec![0x81]);
}

// ----- PC, segments and output state ---------------------------------------

#[test]
fn pseudopc_remaps_labels_only() {
    let assembly = assemble_ok(
        "* = $c000
!pseudopc $0400 {
start: lda #<start
}
after: rts",
    );
    assert_eq!(assembly.image.to_plain(), vec![0xa9, 0x00, 0x60]);
    assert_eq!(assembly.image.range(), Some((0xc000, 0xc002)));
    assert!(assembly
        .symbols
        .iter()
        .any(|(name, addr)| name == "start" && *addr == 0x0400));
    assert!(assembly
        .symbols
        .iter()
        .any(|(name, addr)| name == "after" && *addr == 0xc002));
}

#[test]
fn realpc_cancels_pseudo_offset() {
    let assembly = assemble_ok(
        "* = $c000
!pseudopc $0400 {
a1: !realpc
a2: nop
}",
    );
    assert!(assembly
        .symbols
        .iter()
        .any(|(name, addr)| name == "a1" && *addr == 0x0400));
    assert!(assembly
        .symbols
        .iter()
        .any(|(name, addr)| name == "a2" && *addr == 0xc000));
}

#[test]
fn xor_masks_output_only() {
    let bytes = assemble_bytes("* = 0\n!xor $ff { !byte $0f }\n!byte $0f");
    assert_eq!(bytes, vec![0xf0, 0x0f]);
}

#[test]
fn overlapping_writes_warn() {
    let assembly = assemble("* = 0\n!byte 1\n* = 0\n!byte 2").unwrap();
    assert!(!assembly.has_errors());
    assert!(assembly
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Warning));
    assert_eq!(assembly.image.to_plain(), vec![0x02]);
}

#[test]
fn colon_separates_statements() {
    assert_eq!(
        assemble_bytes("* = 0 : !byte 1 : !byte 2"),
        vec![0x01, 0x02]
    );
}

#[test]
fn comments_are_ignored() {
    assert_eq!(
        assemble_bytes("; header\n* = 0 ; origin\n!byte 1 ; data"),
        vec![0x01]
    );
}

// ----- conditionals, loops and macros --------------------------------------

#[test]
fn if_else_chain() {
    let bytes = assemble_bytes(
        "mode = 2
* = 0
!if mode == 1 { !byte 1 } else !if mode == 2 { !byte 2 } else { !byte 3 }",
    );
    assert_eq!(bytes, vec![0x02]);
}

#[test]
fn ifndef_takes_undefined_branch() {
    let bytes = assemble_bytes("* = 0\n!ifndef missing { !byte 7 }");
    assert_eq!(bytes, vec![0x07]);
}

#[test]
fn undefined_condition_is_fatal() {
    assert!(assemble("!if later { nop }\nlater = 1").is_err());
}

#[test]
fn for_loop_inclusive() {
    assert_eq!(
        assemble_bytes("* = 0\n!for i = 1 to 3 { !byte i }"),
        vec![0x01, 0x02, 0x03]
    );
    assert_eq!(
        assemble_bytes("* = 0\n!for i = 6 to 2 step -2 { !byte i }"),
        vec![0x06, 0x04, 0x02]
    );
    // Empty range.
    assert_eq!(assemble_bytes("* = 0\n!byte 9\n!for i = 3 to 1 { !byte i }"), vec![0x09]);
}

#[test]
fn while_loop() {
    let bytes = assemble_bytes(
        "!set n = 0
* = 0
!while n < 3 { !byte n : !set n = n + 1 }",
    );
    assert_eq!(bytes, vec![0x00, 0x01, 0x02]);
}

#[test]
fn do_until_runs_at_least_once() {
    assert_eq!(assemble_bytes("* = 0\n!do { !byte 9 } !until 1"), vec![0x09]);
    let bytes = assemble_bytes(
        "!set n = 0
* = 0
!do { !byte n : !set n = n + 1 } !until n == 2",
    );
    assert_eq!(bytes, vec![0x00, 0x01]);
}

#[test]
fn break_and_continue() {
    assert_eq!(
        assemble_bytes("* = 0\n!for i = 0 to 9 { !if i == 3 { !break } : !byte i }"),
        vec![0x00, 0x01, 0x02]
    );
    assert_eq!(
        assemble_bytes("* = 0\n!for i = 0 to 4 { !if i % 2 { !continue } : !byte i }"),
        vec![0x00, 0x02, 0x04]
    );
    assert!(has_errors("* = 0\n!break"));
}

#[test]
fn macro_defaults_fill_the_tail() {
    let bytes = assemble_bytes(
        "!macro emit value = $55 { !byte value }
* = 0
+emit
+emit $66",
    );
    assert_eq!(bytes, vec![0x55, 0x66]);
}

#[test]
fn macro_arity_errors() {
    assert!(has_errors(
        "!macro emit value { !byte value }\n* = 0\n+emit 1, 2"
    ));
    assert!(has_errors("!macro emit value { !byte value }\n* = 0\n+emit"));
    assert!(has_errors("* = 0\n+missing 1"));
}

#[test]
fn macro_locals_are_fresh_per_invocation() {
    let bytes = assemble_bytes(
        "!macro delay { .l: dex : bne .l }
* = $c000
+delay
+delay",
    );
    assert_eq!(bytes, vec![0xca, 0xd0, 0xfd, 0xca, 0xd0, 0xfd]);
}

#[test]
fn macro_forward_argument_keeps_absolute_width() {
    // The argument is a forward reference at the call site; the macro body
    // must reserve the absolute form in both passes.
    let bytes = assemble_bytes(
        "!macro load addr { lda addr }
* = $1000
+load value
rts
value = $10",
    );
    assert_eq!(bytes, vec![0xad, 0x10, 0x00, 0x60]);
}

#[test]
fn macro_recursion_is_bounded() {
    assert!(assemble("!macro forever { +forever }\n* = 0\n+forever").is_err());
}

#[test]
fn user_diagnostics() {
    let assembly = assemble("* = 0\n!warn \"careful: \", 42\nnop").unwrap();
    assert!(!assembly.has_errors());
    assert!(assembly
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Warning && d.to_string().contains("careful: 42")));
    assert!(has_errors("* = 0\n!error \"bad\""));
    assert!(assemble("* = 0\n!serious \"stop\"").is_err());
}

#[test]
fn error_recording_continues_assembly() {
    // Two distinct errors in one run.
    let assembly = assemble("* = 0\n!byte missing1\n!byte missing2").unwrap();
    let errors = assembly
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    assert_eq!(errors, 2);
}

// ----- file inclusion ------------------------------------------------------

#[test]
fn source_inclusion() {
    let path = std::env::temp_dir().join("asm65_include_test.a");
    std::fs::write(&path, "!byte 2\n").unwrap();
    let src = format!("* = 0\n!byte 1\n!source \"{}\"\n!byte 3", path.display());
    assert_eq!(assemble_bytes(&src), vec![0x01, 0x02, 0x03]);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn binary_inclusion() {
    let path = std::env::temp_dir().join("asm65_binary_test.bin");
    std::fs::write(&path, [0x10u8, 0x20, 0x30, 0x40]).unwrap();
    let src = format!("* = 0\n!binary \"{}\", 2, 1", path.display());
    assert_eq!(assemble_bytes(&src), vec![0x20, 0x30]);
    let src = format!("* = 0\n!binary \"{}\"", path.display());
    assert_eq!(assemble_bytes(&src), vec![0x10, 0x20, 0x30, 0x40]);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn missing_include_is_fatal() {
    assert!(assemble("* = 0\n!source \"no_such_file_anywhere.a\"").is_err());
}

// ----- listing and re-assembly ---------------------------------------------

#[test]
fn listing_records_emitting_statements() {
    let options = Options {
        listing: true,
        ..Options::default()
    };
    let assembly = assemble_with("* = $c000\nlda #1\nrts", options).unwrap();
    assert_eq!(assembly.listing.len(), 2);
    assert_eq!(assembly.listing[0].pc, 0xc000);
    assert_eq!(assembly.listing[0].bytes, vec![0xa9, 0x01]);
    assert_eq!(assembly.listing[0].line, 2);
    assert_eq!(assembly.listing[1].pc, 0xc002);
    assert_eq!(assembly.listing[1].bytes, vec![0x60]);
}

#[test]
fn reassembly_is_idempotent() {
    let src = "* = $c000
!for i = 0 to 15 { !byte i * 3 }
start: lda #<start
       jmp start";
    assert_eq!(assemble_bytes(src), assemble_bytes(src));
}
