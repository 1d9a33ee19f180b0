use super::*;
use crate::codec::StillPixels;
use crate::decoder::DecodeOpts;
use crate::foundation::core::ImageFormat;
use crate::pixels::surface::PixelConfig;
use crate::testutil::{BLUE, FakeFrames, GREEN, RED};

fn animated(source: FakeFrames, partial: bool) -> ImageResource {
    let opts = DecodeOpts {
        partial,
        ..DecodeOpts::default()
    };
    ImageResource::from_frame_source(Box::new(source), ImageFormat::Gif, &opts).unwrap()
}

fn three_frames() -> ImageResource {
    animated(
        FakeFrames::solid(2, 2, &[RED, GREEN, BLUE], &[10, 20, 30]),
        false,
    )
}

fn still() -> ImageResource {
    let pixels = StillPixels {
        width: 2,
        height: 2,
        rgba: [RED, GREEN, BLUE, RED].concat(),
    };
    ImageResource::from_still(ImageFormat::Bmp, pixels, true, &DecodeOpts::default())
}

fn top_left(r: &mut FrameRenderer) -> Rgba8 {
    let mut s = Surface::new(2, 2, PixelConfig::Rgba8888).unwrap();
    r.render(&mut s, Blit::full(2, 2), None).unwrap();
    s.pixel(0, 0).unwrap()
}

#[test]
fn advance_cycles_and_wraps() {
    let res = three_frames();
    let mut r = res.create_renderer().unwrap();
    assert_eq!(r.current_frame_index().unwrap(), 0);

    let mut seen = Vec::new();
    for _ in 0..5 {
        r.advance().unwrap();
        seen.push(r.current_frame_index().unwrap());
    }
    assert_eq!(seen, vec![1, 2, 0, 1, 2]);
    assert_eq!(top_left(&mut r), Rgba8::new(0, 0, 255, 255));
    assert_eq!(r.current_delay().unwrap(), 30);

    r.reset().unwrap();
    assert_eq!(r.current_frame_index().unwrap(), 0);
    assert_eq!(top_left(&mut r), Rgba8::new(255, 0, 0, 255));
}

#[test]
fn advance_requires_completion_but_reset_does_not() {
    let res = animated(
        FakeFrames::solid(2, 2, &[RED, GREEN], &[10, 20]).partial(1),
        true,
    );
    let mut r = res.create_renderer().unwrap();
    assert!(r.advance().unwrap_err().is_misuse());
    r.reset().unwrap();
    assert_eq!(top_left(&mut r), Rgba8::new(255, 0, 0, 255));

    res.complete().unwrap();
    r.advance().unwrap();
    assert_eq!(r.current_frame_index().unwrap(), 1);
}

#[test]
fn static_cursor_never_moves() {
    let res = still();
    let mut r = res.create_renderer().unwrap();
    for _ in 0..3 {
        r.advance().unwrap();
        r.reset().unwrap();
        assert_eq!(r.current_frame_index().unwrap(), 0);
    }
    assert_eq!(r.current_delay().unwrap(), DELAY_FOREVER);
    assert_eq!(top_left(&mut r), Rgba8::new(255, 0, 0, 255));

    r.recycle().unwrap();
    r.advance().unwrap();
    r.reset().unwrap();
    assert!(r.current_frame_index().unwrap_err().is_misuse());
    assert!(r.current_delay().unwrap_err().is_misuse());
}

#[test]
fn recycled_renderer_rejects_work() {
    let res = three_frames();
    res.set_automatic_disposal(false).unwrap();
    let mut r = res.create_renderer().unwrap();
    r.recycle().unwrap();
    assert!(r.is_recycled());

    let mut s = Surface::new(2, 2, PixelConfig::Rgba8888).unwrap();
    assert!(r.render(&mut s, Blit::full(2, 2), None).unwrap_err().is_misuse());
    assert!(r.advance().unwrap_err().is_misuse());
    assert!(r.reset().unwrap_err().is_misuse());
    assert!(r.current_delay().unwrap_err().is_misuse());
    assert!(r.current_frame_index().unwrap_err().is_misuse());
    r.recycle().unwrap();
    assert_eq!(res.reference_count(), 0);
    assert!(!res.is_released());
}

#[test]
fn render_with_fill_and_ratio() {
    let res = still();
    let mut r = res.create_renderer().unwrap();
    let mut s = Surface::new(3, 3, PixelConfig::Rgba8888).unwrap();
    let fill = Rgba8::new(9, 9, 9, 9);
    r.render(&mut s, Blit::full(2, 2).with_ratio(2), Some(fill))
        .unwrap();
    // Average of red, green, blue, red.
    assert_eq!(s.pixel(0, 0), Some(Rgba8::new(127, 63, 63, 255)));
    assert_eq!(s.pixel(1, 0), Some(fill));
    assert_eq!(s.pixel(2, 2), Some(fill));

    assert!(r.render(&mut s, Blit::full(2, 2).with_ratio(0), None).is_err());
}

#[test]
fn texture_render_goes_through_the_pool() {
    let res = three_frames();
    let mut r = res.create_renderer().unwrap();
    let pool = ScratchPool::new();
    let mut tex = Surface::new(1, 1, PixelConfig::Rgba8888).unwrap();

    let err = r
        .render_to_texture(&pool, &mut tex, true, 4, 4, Blit::full(2, 2))
        .unwrap_err();
    assert!(err.is_misuse());

    pool.create_buffer(8);
    assert!(r
        .render_to_texture(&pool, &mut tex, true, 4, 4, Blit::full(2, 2))
        .unwrap_err()
        .is_misuse());

    pool.destroy_buffer();
    pool.create_buffer(16);
    r.render_to_texture(&pool, &mut tex, true, 4, 4, Blit::full(2, 2))
        .unwrap();
    assert_eq!((tex.width(), tex.height()), (4, 4));
    assert_eq!(tex.pixel(1, 1), Some(Rgba8::new(255, 0, 0, 255)));
    assert_eq!(tex.pixel(3, 3), Some(Rgba8::TRANSPARENT));

    r.advance().unwrap();
    let blit = Blit {
        dst_x: 2,
        dst_y: 2,
        ..Blit::full(2, 2)
    };
    r.render_to_texture(&pool, &mut tex, false, 4, 4, blit).unwrap();
    assert_eq!(tex.pixel(3, 3), Some(Rgba8::new(0, 255, 0, 255)));
    assert_eq!(tex.pixel(0, 0), Some(Rgba8::new(255, 0, 0, 255)));
}
