use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::codec::StillPixels;
use crate::decoder::DecodeOpts;
use crate::foundation::core::{ImageFormat, Rgba8};
use crate::testutil::{BLUE, FakeFrames, GREEN, RED};

fn animated() -> ImageResource {
    let source = FakeFrames::solid(2, 2, &[RED, GREEN, BLUE], &[10, 20, 30]).partial(1);
    let opts = DecodeOpts {
        partial: true,
        ..DecodeOpts::default()
    };
    ImageResource::from_frame_source(Box::new(source), ImageFormat::Gif, &opts).unwrap()
}

#[test]
fn animated_bitmap_ticks_through_frames() {
    let res = animated();
    let bitmap = AnimatedBitmap::new(&res).unwrap();
    assert!(res.is_completed());
    assert!(bitmap.is_animated());
    assert_eq!(res.reference_count(), 1);

    let frames = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&frames);
    let id = bitmap.subscribe(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(bitmap.start().unwrap(), Some(Duration::from_millis(10)));
    assert!(bitmap.start().unwrap().is_none());
    assert!(bitmap.is_running());

    assert_eq!(bitmap.tick().unwrap(), Some(Duration::from_millis(20)));
    assert_eq!(
        bitmap.with_surface(|s| s.pixel(0, 0)).flatten(),
        Some(Rgba8::new(0, 255, 0, 255))
    );
    assert_eq!(bitmap.tick().unwrap(), Some(Duration::from_millis(30)));
    assert_eq!(frames.load(Ordering::SeqCst), 2);

    assert!(bitmap.unsubscribe(id));
    assert!(!bitmap.unsubscribe(id));
    assert_eq!(bitmap.tick().unwrap(), None);
    assert!(!bitmap.is_running());
}

#[test]
fn stop_ends_the_loop_after_current_tick() {
    let bitmap = AnimatedBitmap::new(&animated()).unwrap();
    bitmap.subscribe(|_| {});
    bitmap.start().unwrap();
    bitmap.stop();
    assert_eq!(bitmap.tick().unwrap(), None);
}

#[test]
fn static_bitmap_drops_its_renderer() {
    let pixels = StillPixels {
        width: 1,
        height: 1,
        rgba: RED.to_vec(),
    };
    let res = ImageResource::from_still(ImageFormat::Png, pixels, true, &DecodeOpts::default());
    let bitmap = AnimatedBitmap::new(&res).unwrap();
    assert!(!bitmap.is_animated());
    assert!(bitmap.is_opaque());
    assert!(res.is_released());
    assert!(bitmap.start().unwrap().is_none());
    assert_eq!(
        bitmap.with_surface(|s| s.pixel(0, 0)).flatten(),
        Some(Rgba8::new(255, 0, 0, 255))
    );
}

#[test]
fn last_release_frees_everything() {
    let res = animated();
    let bitmap = AnimatedBitmap::new(&res).unwrap();
    assert!(bitmap.obtain());
    assert!(bitmap.obtain());
    bitmap.release();
    assert!(!bitmap.is_released());
    bitmap.release();
    assert!(bitmap.is_released());
    assert!(res.is_released());

    assert!(!bitmap.obtain());
    assert!(bitmap.with_surface(|_| ()).is_none());
    assert_eq!(bitmap.tick().unwrap(), None);
}
