use pio_asm::{ErrorKind, assemble};

const STEPPER: &str = "
.program stepper
    pull
    mov isr, osr
    pull
    mov y, isr
outer:
    mov osr, isr
    set x, 6
inner:
    out pins, 4 [1]
    jmp x-- inner
    out pins, 4
    jmp y-- outer
";

const WS2812: &str = "
.program ws2812
.side_set 1

.wrap_target
bitloop:
    out x, 1       side 0 [2] ; Side-set still takes place when instruction stalls
    jmp !x do_zero side 1 [1] ; Branch on the bit we shifted out. Positive pulse
do_one:
    jmp  bitloop   side 1 [4] ; Continue driving high, for a long pulse
do_zero:
    nop            side 0 [4] ; Or drive low, for a short pulse
.wrap
";

#[test]
fn assembles_stepper() {
    let program = assemble(STEPPER).unwrap();
    assert_eq!(program.name.as_deref(), Some("stepper"));
    assert_eq!(
        program.code,
        vec![
            0x80A0, 0xA0C7, 0x80A0, 0xA046, 0xA0E6, 0xE026, 0x6104, 0x0046, 0x6004, 0x0084,
        ]
    );
}

#[test]
fn assembles_ws2812_with_side_set() {
    let program = assemble(WS2812).unwrap();
    assert_eq!(program.side_set, 1);
    assert_eq!(program.code, vec![0x6221, 0x1123, 0x1400, 0xA442]);
}

#[test]
fn wrap_target_after_instructions_is_rejected() {
    let source = format!("{STEPPER}.wrap_target\n    out pins, 4\n.wrap\n");
    let err = assemble(&source).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnsupportedWrap);
    assert_eq!(err.text, ".wrap_target");
}

#[test]
fn error_reports_source_line() {
    let err = assemble(".program p\n\n  set x, 99 ; too big\n").unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(err.text, "set x, 99");
    assert_eq!(
        err.to_string(),
        "line 3: set value 99 out of range (0..=31) ('set x, 99')"
    );
}
