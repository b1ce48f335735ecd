#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::util::*;

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
}

#[test]
fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 5), "hell…");
}

#[test]
fn test_truncate_empty() {
    assert_eq!(truncate("", 5), "");
}

#[test]
fn test_truncate_zero_max() {
    assert_eq!(truncate("hello", 0), "");
}

#[test]
fn test_truncate_unicode() {
    // Japanese characters are multi-byte UTF-8
    assert_eq!(truncate("日本語テスト", 4), "日本語…");
}

#[test]
fn test_truncate_one_char() {
    assert_eq!(truncate("hello", 1), "…");
}

#[test]
fn test_truncate_mixed_unicode() {
    assert_eq!(truncate("café résumé", 5), "café…");
}

#[test]
fn test_truncate_max_one_with_long_string() {
    // max=1 should always produce "…" for strings longer than 1
    assert_eq!(truncate("ab", 1), "…");
    assert_eq!(truncate("abc", 1), "…");
}

// ── format_amount ──────────────────────────────────────────

#[test]
fn test_format_amount_euro() {
    assert_eq!(format_amount(dec!(1234.56)), "€1,234.56");
    assert_eq!(format_amount(dec!(999.99)), "€999.99");
}

#[test]
fn test_format_amount_zero() {
    assert_eq!(format_amount(dec!(0)), "€0.00");
}

#[test]
fn test_format_amount_negative() {
    assert_eq!(format_amount(dec!(-42.50)), "-€42.50");
}

#[test]
fn test_format_amount_large() {
    assert_eq!(format_amount(dec!(1234567.89)), "€1,234,567.89");
}

#[test]
fn test_format_amount_pads_to_two_decimals() {
    assert_eq!(format_amount(dec!(2.5)), "€2.50");
    assert_eq!(format_amount(dec!(5)), "€5.00");
}

// ── percent_of ─────────────────────────────────────────────

#[test]
fn test_percent_of_whole_shares() {
    assert_eq!(percent_of(dec!(25), dec!(100)), 25);
    assert_eq!(percent_of(dec!(1), dec!(3)), 33);
    assert_eq!(percent_of(dec!(2), dec!(3)), 67);
    assert_eq!(percent_of(dec!(10), dec!(10)), 100);
}

#[test]
fn test_percent_of_empty_total() {
    assert_eq!(percent_of(dec!(5), Decimal::ZERO), 0);
    assert_eq!(percent_of(Decimal::ZERO, Decimal::ZERO), 0);
}

// ── scrolling ──────────────────────────────────────────────

#[test]
fn test_scroll_down_keeps_cursor_visible() {
    let (mut index, mut scroll) = (0, 0);
    for _ in 0..5 {
        scroll_down(&mut index, &mut scroll, 10, 3);
    }
    assert_eq!(index, 5);
    assert_eq!(scroll, 3);
}

#[test]
fn test_scroll_down_stops_at_end() {
    let (mut index, mut scroll) = (2, 0);
    scroll_down(&mut index, &mut scroll, 3, 10);
    assert_eq!(index, 2);
}

#[test]
fn test_scroll_up_pulls_scroll_back() {
    let (mut index, mut scroll) = (3, 3);
    scroll_up(&mut index, &mut scroll);
    assert_eq!((index, scroll), (2, 2));
    let (mut index, mut scroll) = (0, 0);
    scroll_up(&mut index, &mut scroll);
    assert_eq!((index, scroll), (0, 0));
}

#[test]
fn test_scroll_to_ends() {
    let (mut index, mut scroll) = (4, 2);
    scroll_to_bottom(&mut index, &mut scroll, 20, 5);
    assert_eq!((index, scroll), (19, 15));
    scroll_to_top(&mut index, &mut scroll);
    assert_eq!((index, scroll), (0, 0));
}
