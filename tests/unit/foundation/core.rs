use super::*;

#[test]
fn compat_rule_rounds_short_delays_only() {
    for d in [0, 5, 10] {
        assert_eq!(compat_delay(d, true), 100, "delay {d}");
    }
    for d in [11, 16, 1000] {
        assert_eq!(compat_delay(d, true), d, "delay {d}");
    }
    for d in [0, 5, 10, 11, 16, 1000] {
        assert_eq!(compat_delay(d, false), d, "delay {d}");
    }
}

#[test]
fn rect_clip_and_emptiness() {
    let r = IntRect::new(-5, -5, 5, 5);
    assert_eq!(r.clip_to(4, 4), Some(IntRect::new(0, 0, 4, 4)));

    assert!(IntRect::new(10, 10, 20, 20).clip_to(4, 4).is_none());
    assert!(IntRect::new(2, 2, 2, 9).is_empty());
    assert_eq!(IntRect::from_xywh(1, 2, 3, 4), IntRect::new(1, 2, 4, 6));
    assert_eq!(IntRect::new(5, 5, 1, 1).width(), 0);
}

#[test]
fn rgb565_packs_little_endian() {
    assert_eq!(Rgba8::new(255, 255, 255, 255).to_rgb565_le(), [0xff, 0xff]);
    assert_eq!(Rgba8::new(255, 0, 0, 255).to_rgb565_le(), [0x00, 0xf8]);
    assert_eq!(Rgba8::new(0, 0, 255, 255).to_rgb565_le(), [0x1f, 0x00]);
}

#[test]
fn blit_rejects_zero_ratio() {
    assert!(Blit::full(4, 4).validate().is_ok());
    assert!(Blit::full(4, 4).with_ratio(0).validate().is_err());
}

#[test]
fn format_names_are_lowercase() {
    assert_eq!(ImageFormat::Gif.to_string(), "gif");
    assert_eq!(
        serde_json::to_string(&ImageFormat::Jpeg).unwrap(),
        "\"jpeg\""
    );
}
