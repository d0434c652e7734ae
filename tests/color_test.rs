use board_flow::color::LabelColor;

#[test]
fn parse_hex_6_digit() {
    let c = LabelColor::parse("#c0caf5", "feature").unwrap();
    assert_eq!(c, LabelColor::new(0xc0, 0xca, 0xf5));
}

#[test]
fn parse_without_hash() {
    let c = LabelColor::parse("FF00AA", "feature").unwrap();
    assert_eq!(c.to_string(), "ff00aa");
}

#[test]
fn parse_hex_3_digit() {
    // f0a -> ff00aa
    let c = LabelColor::parse("#f0a", "feature").unwrap();
    assert_eq!(c, LabelColor::new(0xff, 0x00, 0xaa));
}

#[test]
fn parse_error_names_the_label() {
    let err = LabelColor::parse("#12345", "priority: high").unwrap_err();
    assert!(err.to_string().contains("priority: high"));
    assert!(LabelColor::parse("zzzzzz", "x").is_err());
    assert!(LabelColor::parse("", "x").is_err());
}

#[test]
fn gradient_endpoints_and_midpoint() {
    assert_eq!(LabelColor::progress_gradient(0).to_string(), "ff0000");
    assert_eq!(LabelColor::progress_gradient(50).to_string(), "ffff00");
    assert_eq!(LabelColor::progress_gradient(100).to_string(), "00ff00");
}

#[test]
fn gradient_is_monotonic() {
    let mut last = LabelColor::progress_gradient(0);
    for pct in (5..=50).step_by(5) {
        let c = LabelColor::progress_gradient(pct);
        assert!(c.g >= last.g, "green rises up to 50%");
        assert_eq!(c.r, 0xff);
        last = c;
    }
    for pct in (55..=100).step_by(5) {
        let c = LabelColor::progress_gradient(pct);
        assert!(c.r <= last.r, "red falls after 50%");
        assert_eq!(c.g, 0xff);
        last = c;
    }
}
