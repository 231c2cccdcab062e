// compat_rexp.rs - Matching behavior of hand-assembled programs.
//
// Each program is what a regex compiler emits for the pattern named in the
// comment above it. Results are checked through both the literal fast path
// and the general dispatch loop where the two could differ.

use rexmatch::prelude::*;

fn prog(ops: Vec<Op>) -> Program {
    Program::new(ops, vec![])
}

fn digit_prog(ops: Vec<Op>) -> Program {
    Program::new(ops, vec![ByteClass::from_range(b'0', b'9')])
}

const DIGIT: ClassId = ClassId(0);

fn x(p: &Program, text: &str, expected: bool) {
    let mut m = Matcher::new();
    assert_eq!(
        m.is_match(p, text.as_bytes()),
        Ok(expected),
        "text {:?} against\n{}",
        text,
        p
    );
}

fn general() -> Matcher {
    Matcher::builder().literal_fast_path(false).build()
}

fn steps(p: &Program, text: &[u8]) -> u64 {
    let mut m = general();
    m.is_match(p, text).unwrap();
    m.last_stats().steps
}

fn str_end(lit: &[u8]) -> Op {
    Op::Str {
        lit: lit.into(),
        end: true,
    }
}

// === Literals ===

#[test]
fn literal_anywhere() {
    let p = prog(vec![Op::str(b"ab"), Op::Accept]);
    x(&p, "xxabxx", true);
    x(&p, "xxaxbxx", false);
    x(&p, "ab", true);
    x(&p, "", false);
}

#[test]
fn literal_fast_and_general_paths_agree() {
    let texts: &[&[u8]] = &[
        b"",
        b"a",
        b"ab",
        b"aab",
        b"abc",
        b"xxabcxx",
        b"needle in a haystack",
        b"needl",
        b"\x00ab\xff",
    ];
    let mut fast = Matcher::new();
    let mut slow = general();
    for lit in [&b"a"[..], b"ab", b"abc", b"needle", b"\xff"] {
        let p = prog(vec![Op::str(lit), Op::Accept]);
        for &text in texts {
            let f = fast.is_match(&p, text).unwrap();
            assert!(fast.last_stats().fast_path);
            let s = slow.is_match(&p, text).unwrap();
            assert!(!slow.last_stats().fast_path);
            assert_eq!(f, s, "literal {:?} text {:?}", lit, text);
        }
    }
}

// ab$
#[test]
fn literal_then_end_retries_later_occurrences() {
    let p = prog(vec![Op::str(b"ab"), Op::End, Op::Accept]);
    x(&p, "abxab", true);
    x(&p, "ab", true);
    x(&p, "abxabx", false);
    x(&p, "a", false);
}

// ^ab
#[test]
fn anchored_literal() {
    let p = prog(vec![Op::Start { end: false }, Op::str(b"ab"), Op::Accept]);
    x(&p, "abx", true);
    x(&p, "ab", true);
    x(&p, "xab", false);
    x(&p, "", false);
}

// a^
#[test]
fn start_after_consumed_input() {
    let p = prog(vec![Op::str(b"a"), Op::Start { end: false }, Op::Accept]);
    x(&p, "a", false);
    x(&p, "aaa", false);
}

// ^$
#[test]
fn start_with_end_flag() {
    let p = prog(vec![Op::Start { end: true }, Op::Accept]);
    x(&p, "", true);
    x(&p, "a", false);
}

// ab$ with the end flag folded into the literal
#[test]
fn literal_with_end_flag() {
    let p = prog(vec![str_end(b"ab"), Op::Accept]);
    assert_eq!(p.literal_fast_path(), None);
    x(&p, "xxab", true);
    x(&p, "ab", true);
    x(&p, "abx", false);
    x(&p, "b", false);

    // ^ab$
    let p = prog(vec![Op::Start { end: false }, str_end(b"ab"), Op::Accept]);
    x(&p, "ab", true);
    x(&p, "abx", false);
    x(&p, "xab", false);

    // abc$ split across two literals
    let p = prog(vec![Op::str(b"a"), str_end(b"bc"), Op::Accept]);
    x(&p, "abc", true);
    x(&p, "abcabc", true);
    x(&p, "abcx", false);
}

// === Classes and any-byte ===

// [0-9]x
#[test]
fn class_scan_retries_later_members() {
    let p = digit_prog(vec![
        Op::Class {
            class: DIGIT,
            end: false,
        },
        Op::str(b"x"),
        Op::Accept,
    ]);
    x(&p, "1a2x", true);
    x(&p, "1a2b", false);
    x(&p, "9x", true);
    x(&p, "x", false);
}

#[test]
fn class_with_end_flag() {
    // [0-9]$
    let p = digit_prog(vec![
        Op::Class {
            class: DIGIT,
            end: true,
        },
        Op::Accept,
    ]);
    x(&p, "abc1", true);
    x(&p, "1a", false);
    x(&p, "", false);

    // ^[0-9]$
    let p = digit_prog(vec![
        Op::Start { end: false },
        Op::Class {
            class: DIGIT,
            end: true,
        },
        Op::Accept,
    ]);
    x(&p, "1", true);
    x(&p, "12", false);
    x(&p, "", false);

    // a[0-9]$
    let p = digit_prog(vec![
        Op::str(b"a"),
        Op::Class {
            class: DIGIT,
            end: true,
        },
        Op::Accept,
    ]);
    x(&p, "xa1", true);
    x(&p, "a12", false);
    x(&p, "a1a5", true);
}

#[test]
fn negated_class() {
    // [^0-9]
    let p = Program::new(
        vec![
            Op::Class {
                class: DIGIT,
                end: false,
            },
            Op::Accept,
        ],
        vec![ByteClass::from_range(b'0', b'9').negated()],
    );
    x(&p, "123a", true);
    x(&p, "123", false);
}

// .b
#[test]
fn any_byte() {
    let p = prog(vec![Op::Any { end: false }, Op::str(b"b"), Op::Accept]);
    x(&p, "ab", true);
    x(&p, "xxab", true);
    x(&p, "b", false);
    x(&p, "", false);
}

#[test]
fn any_with_end_flag() {
    // .$
    let p = prog(vec![Op::Any { end: true }, Op::Accept]);
    x(&p, "abc", true);
    x(&p, "", false);

    // ^.$
    let p = prog(vec![Op::Start { end: false }, Op::Any { end: true }, Op::Accept]);
    x(&p, "a", true);
    x(&p, "ab", false);
    x(&p, "", false);

    // a.$
    let p = prog(vec![Op::str(b"a"), Op::Any { end: true }, Op::Accept]);
    x(&p, "ab", true);
    x(&p, "abc", false);
    x(&p, "abac", true);
}

// === Unanchored gaps ===

// a.*b
#[test]
fn unanchor_between_literals() {
    let p = prog(vec![Op::str(b"a"), Op::Unanchor, Op::str(b"b"), Op::Accept]);
    x(&p, "axxb", true);
    x(&p, "ab", true);
    x(&p, "ba", false);
}

#[test]
fn unanchored_tokens_with_end_flag() {
    // ^a.*[0-9]$
    let p = digit_prog(vec![
        Op::Start { end: false },
        Op::str(b"a"),
        Op::Unanchor,
        Op::Class {
            class: DIGIT,
            end: true,
        },
        Op::Accept,
    ]);
    x(&p, "axx9", true);
    x(&p, "a9", true);
    x(&p, "a", false);
    x(&p, "a9x", false);

    // ^a.*.$
    let p = prog(vec![
        Op::Start { end: false },
        Op::str(b"a"),
        Op::Unanchor,
        Op::Any { end: true },
        Op::Accept,
    ]);
    x(&p, "a", false);
    x(&p, "ab", true);
    x(&p, "abc", true);

    // ^a.*z$
    let p = prog(vec![
        Op::Start { end: false },
        Op::str(b"a"),
        Op::Unanchor,
        str_end(b"z"),
        Op::Accept,
    ]);
    x(&p, "az", true);
    x(&p, "abz", true);
    x(&p, "abzx", false);

    // ^a.*a$ needs two distinct a's
    let p = prog(vec![
        Op::Start { end: false },
        Op::str(b"a"),
        Op::Unanchor,
        str_end(b"a"),
        Op::Accept,
    ]);
    x(&p, "a", false);
    x(&p, "aa", true);
}

#[test]
fn start_in_unanchored_mode() {
    let p = prog(vec![
        Op::Unanchor,
        Op::Start { end: false },
        Op::str(b"a"),
        Op::Accept,
    ]);
    x(&p, "ab", true);
    x(&p, "ba", false);
}

// .+$
#[test]
fn unanchored_end_skips_to_end_of_input() {
    let p = prog(vec![
        Op::Any { end: false },
        Op::Unanchor,
        Op::End,
        Op::Accept,
    ]);
    for n in [1, 10, 1000, 100_000] {
        let text = vec![b'q'; n];
        assert_eq!(steps(&p, &text), 4, "n = {}", n);
    }
    x(&p, "", false);

    // ^.+$ walks every byte
    let walk = prog(vec![
        Op::Start { end: false },
        Op::SavePos,
        Op::Any { end: false },
        Op::JumpIfAdvanced(-2),
        Op::End,
        Op::Accept,
    ]);
    let text = vec![b'q'; 1000];
    assert!(steps(&walk, &text) > 1000);
}

// === Repetition ===

// ^[0-9]+$
#[test]
fn digit_run() {
    let p = digit_prog(vec![
        Op::Start { end: false },
        Op::SavePos,
        Op::Class {
            class: DIGIT,
            end: false,
        },
        Op::JumpIfAdvanced(-2),
        Op::End,
        Op::Accept,
    ]);
    x(&p, "123", true);
    x(&p, "7", true);
    x(&p, "12a", false);
    x(&p, "a12", false);
    x(&p, "", false);
}

// ^(b?)*$
fn zero_width_star() -> Program {
    let mut b = Program::builder();
    b.start();
    let skip = b.branch_first(0);
    let top = b.save_pos();
    let opt = b.branch_first(0);
    b.literal(b"b");
    let check = b.jump_if_advanced_to(top);
    b.patch(opt, check);
    let tail = b.end();
    b.patch(skip, tail);
    b.accept();
    b.build().unwrap()
}

#[test]
fn zero_width_iteration_terminates() {
    let p = zero_width_star();
    assert_eq!(p.op(1), Some(&Op::BranchFirst(5)));
    assert_eq!(p.op(3), Some(&Op::BranchFirst(2)));
    assert_eq!(p.op(5), Some(&Op::JumpIfAdvanced(-3)));
    x(&p, "", true);
    x(&p, "b", true);
    x(&p, "bb", true);
    x(&p, "bbc", false);
    x(&p, "cb", false);
    let long = vec![b'b'; 500];
    assert!(steps(&p, &long) < 10 * 500);
}

// ^((b?)*)*$
#[test]
fn nested_zero_width_iteration_terminates() {
    let p = prog(vec![
        Op::Start { end: false },
        Op::BranchFirst(8),
        Op::SavePos,
        Op::BranchFirst(5),
        Op::SavePos,
        Op::BranchFirst(2),
        Op::str(b"b"),
        Op::JumpIfAdvanced(-3),
        Op::JumpIfAdvanced(-6),
        Op::End,
        Op::Accept,
    ]);
    p.validate().unwrap();
    let single = zero_width_star();
    let mut m = general();
    for text in ["", "b", "bb", "bbb", "bbc", "cb", "c"] {
        let nested = m.is_match(&p, text.as_bytes()).unwrap();
        assert!(m.last_stats().steps < 1000, "text {:?}", text);
        let flat = m.is_match(&single, text.as_bytes()).unwrap();
        assert_eq!(nested, flat, "text {:?}", text);
    }
}

// === Alternation ===

// (ab|cd)$ with branch-first and with jump-first
#[test]
fn alternation_forms_agree() {
    let branch = prog(vec![
        Op::BranchFirst(3),
        Op::str(b"ab"),
        Op::Jump(2),
        Op::str(b"cd"),
        Op::End,
        Op::Accept,
    ]);
    let jump = prog(vec![
        Op::JumpFirst(3),
        Op::str(b"cd"),
        Op::Jump(2),
        Op::str(b"ab"),
        Op::End,
        Op::Accept,
    ]);
    branch.validate().unwrap();
    jump.validate().unwrap();

    let mut m = Matcher::new();
    let texts = [
        "", "ab", "cd", "abcd", "cdab", "abxcd", "cdxab", "abx", "cdx", "acbd", "xxcd",
    ];
    for text in texts {
        let t = text.as_bytes();
        let a = m.is_match(&branch, t).unwrap();
        let b = m.is_match(&jump, t).unwrap();
        assert_eq!(a, b, "text {:?}", text);
        assert_eq!(a, t.ends_with(b"ab") || t.ends_with(b"cd"), "text {:?}", text);
    }
}

#[test]
fn queued_accept_short_circuits() {
    // ^(zz)? with the empty branch first
    let p = prog(vec![
        Op::Start { end: false },
        Op::BranchFirst(2),
        Op::str(b"zz"),
        Op::Accept,
    ]);
    let mut m = general();
    assert_eq!(m.is_match(&p, b""), Ok(true));
    assert_eq!(m.last_stats().steps, 2);
    assert_eq!(m.last_stats().max_frames, 0);

    let p = prog(vec![
        Op::Start { end: false },
        Op::JumpFirst(2),
        Op::Accept,
        Op::str(b"zz"),
        Op::Jump(-2),
    ]);
    p.validate().unwrap();
    assert_eq!(m.is_match(&p, b"q"), Ok(true));
    assert_eq!(m.last_stats().steps, 2);
}

// === Errors ===

#[test]
fn corrupt_programs() {
    let cases = vec![
        (prog(vec![Op::JumpFirst(7), Op::Accept]), 0),
        (prog(vec![Op::Any { end: false }, Op::BranchFirst(-5), Op::Accept]), 1),
        (prog(vec![Op::str(b"a")]), 1),
        (
            digit_prog(vec![
                Op::Class {
                    class: ClassId(3),
                    end: false,
                },
                Op::Accept,
            ]),
            0,
        ),
        (
            prog(vec![
                Op::Start { end: false },
                Op::JumpIfAdvanced(1),
                Op::Accept,
            ]),
            1,
        ),
    ];
    let mut m = general();
    for (p, at) in cases {
        match m.is_match(&p, b"a") {
            Err(MatchError::CorruptProgram { pc, .. }) => assert_eq!(pc, at, "\n{}", p),
            other => panic!("expected CorruptProgram, got {:?}\n{}", other, p),
        }
        // still usable
        assert_eq!(m.is_match(&prog(vec![Op::str(b"a"), Op::Accept]), b"ba"), Ok(true));
    }
}

#[test]
fn stack_limit_over_then_reuse() {
    let p = digit_prog(vec![
        Op::Start { end: false },
        Op::SavePos,
        Op::Class {
            class: DIGIT,
            end: false,
        },
        Op::JumpIfAdvanced(-2),
        Op::End,
        Op::Accept,
    ]);
    let mut m = Matcher::builder().stack_limit(4).build();
    let err = m.is_match(&p, b"0123456789").unwrap_err();
    assert_eq!(err, MatchError::MatchStackLimitOver);
    assert_eq!(err.code(), rexmatch::error::REXERR_MATCH_STACK_LIMIT_OVER);
    assert_eq!(m.is_match(&p, b"12"), Ok(true));
    assert_eq!(m.is_match(&p, b"1x"), Ok(false));
}
