use core_render::Compositor;
use core_text::StyleClass;

#[test]
fn rows_and_cols_match_construction() {
    let c = Compositor::new(24, 80);
    assert_eq!(c.rows(), 24);
    assert_eq!(c.cols(), 80);
}

#[test]
fn out_of_range_set_is_ignored() {
    let mut c = Compositor::new(3, 3);
    c.set(10, 10, b'x', (StyleClass::Normal, false));
    assert!(!c.update());
}

#[test]
fn touching_multiple_rows_only_diffs_touched_ones() {
    let mut c = Compositor::new(5, 5);
    c.set(0, 0, b'a', (StyleClass::Normal, false));
    c.set(4, 4, b'b', (StyleClass::Normal, false));
    assert!(c.update());
    assert!(!c.update());
}

#[test]
fn star_bit_change_alone_triggers_reemission() {
    let mut c = Compositor::new(2, 2);
    c.set(0, 0, b'x', (StyleClass::Normal, false));
    c.update();
    c.set(0, 0, b'x', (StyleClass::Normal, true));
    assert!(c.update());
}
