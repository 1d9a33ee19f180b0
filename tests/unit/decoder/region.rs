use super::*;
use crate::foundation::core::Rgba8;
use crate::pixels::surface::PixelConfig;
use crate::testutil::{gradient, png_bytes};

fn decoder() -> RegionDecoder {
    RegionDecoder::new(&png_bytes(&gradient(10, 8))).unwrap()
}

#[test]
fn exposes_source_metadata() {
    let d = decoder();
    assert_eq!((d.width(), d.height()), (10, 8));
    assert_eq!(d.format(), ImageFormat::Png);
    assert!(!d.is_opaque());
    assert!(!d.is_recycled());
}

#[test]
fn sub_rect_is_copied_from_its_origin() {
    let s = decoder()
        .decode_region(Some(IntRect::new(2, 3, 6, 5)), PixelRequest::Auto, 1)
        .unwrap();
    assert_eq!((s.width(), s.height(), s.config()), (4, 2, PixelConfig::Rgba8888));
    assert_eq!(s.pixel(0, 0), Some(Rgba8::new(20, 30, 0, 255)));
    assert_eq!(s.pixel(3, 1), Some(Rgba8::new(50, 40, 0, 255)));
}

#[test]
fn full_image_for_none_and_ratio() {
    let s = decoder().decode_region(None, PixelRequest::Rgb565, 2).unwrap();
    assert_eq!((s.width(), s.height(), s.config()), (5, 4, PixelConfig::Rgb565));
}

#[test]
fn partial_overlap_is_clipped() {
    let s = decoder()
        .decode_region(Some(IntRect::new(-4, 6, 3, 20)), PixelRequest::Auto, 1)
        .unwrap();
    assert_eq!((s.width(), s.height()), (3, 2));
    assert_eq!(s.pixel(0, 0), Some(Rgba8::new(0, 60, 0, 255)));
}

#[test]
fn outside_or_empty_rect_is_absent() {
    let d = decoder();
    for rect in [
        IntRect::new(10, 0, 20, 8),
        IntRect::new(-5, -5, 0, 0),
        IntRect::new(0, 8, 10, 12),
        IntRect::new(3, 3, 3, 6),
        IntRect::new(6, 6, 2, 2),
    ] {
        assert!(d.decode_region(Some(rect), PixelRequest::Auto, 1).is_none(), "{rect:?}");
    }
}

#[test]
fn recycled_decoder_returns_nothing() {
    let d = decoder();
    d.recycle();
    d.recycle();
    assert!(d.is_recycled());
    assert!(d.decode_region(None, PixelRequest::Auto, 1).is_none());
}
