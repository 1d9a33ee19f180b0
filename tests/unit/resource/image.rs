use super::*;
use crate::testutil::{BLUE, FakeFrames, GREEN, RED};

fn still(opts: &DecodeOpts) -> ImageResource {
    let pixels = StillPixels {
        width: 2,
        height: 2,
        rgba: vec![1; 16],
    };
    ImageResource::from_still(ImageFormat::Png, pixels, true, opts)
}

fn animated(delays: &[u32], opts: &DecodeOpts) -> ImageResource {
    let colors = [RED, GREEN, BLUE].repeat(delays.len().div_ceil(3));
    let source = FakeFrames::solid(2, 2, &colors[..delays.len()], delays);
    ImageResource::from_frame_source(Box::new(source), ImageFormat::Gif, opts).unwrap()
}

#[test]
fn automatic_disposal_fires_on_last_reference() {
    let res = still(&DecodeOpts::default());
    res.add_reference().unwrap();
    res.add_reference().unwrap();
    res.remove_reference().unwrap();
    assert!(!res.is_released());
    res.remove_reference().unwrap();
    assert!(res.is_released());

    // Everything but state and immutable metadata is misuse now.
    assert!(res.add_reference().unwrap_err().is_misuse());
    assert!(res.remove_reference().unwrap_err().is_misuse());
    assert!(res.frame_count().unwrap_err().is_misuse());
    assert!(res.create_renderer().unwrap_err().is_misuse());
    assert!(res.complete().unwrap_err().is_misuse());
    assert_eq!(res.width(), 2);
    res.recycle().unwrap();
}

#[test]
fn disabled_disposal_keeps_handle_until_recycle() {
    let res = still(&DecodeOpts {
        automatic_disposal: false,
        ..DecodeOpts::default()
    });
    res.add_reference().unwrap();
    assert!(res.recycle().unwrap_err().is_misuse());
    res.remove_reference().unwrap();
    assert!(!res.is_released());
    assert!(!res.is_referenced());

    res.recycle().unwrap();
    assert!(res.is_released());
    res.recycle().unwrap();
}

#[test]
fn policy_can_change_at_runtime() {
    let res = still(&DecodeOpts::default());
    res.set_automatic_disposal(false).unwrap();
    res.add_reference().unwrap();
    res.remove_reference().unwrap();
    assert!(!res.is_released());
}

#[test]
fn removing_from_zero_is_rejected() {
    let res = still(&DecodeOpts::default());
    assert!(res.remove_reference().unwrap_err().is_misuse());
    assert_eq!(res.reference_count(), 0);
    assert!(!res.is_released());
}

#[test]
fn compat_rule_applies_per_resource() {
    let res = animated(&[0, 5, 10, 11, 16, 1000], &DecodeOpts::default());
    assert!(!res.display_compat());
    assert_eq!(
        (0..6).map(|i| res.delay(i).unwrap()).collect::<Vec<_>>(),
        vec![0, 5, 10, 11, 16, 1000]
    );

    res.set_display_compat(true).unwrap();
    assert_eq!(
        (0..6).map(|i| res.delay(i).unwrap()).collect::<Vec<_>>(),
        vec![100, 100, 100, 11, 16, 1000]
    );
    assert!(res.delay(6).unwrap_err().is_misuse());
}

#[test]
fn static_resource_ignores_compat_toggle() {
    let res = still(&DecodeOpts::default());
    res.set_display_compat(false).unwrap();
    assert!(res.display_compat());
    assert_eq!(res.delay(0).unwrap(), DELAY_FOREVER);
    res.complete().unwrap();
}

#[test]
fn static_delay_is_forever_at_any_index() {
    let res = still(&DecodeOpts::default());
    assert_eq!(res.frame_count().unwrap(), 1);
    for frame in [1, 5, usize::MAX] {
        assert_eq!(res.delay(frame).unwrap(), DELAY_FOREVER);
    }

    res.recycle().unwrap();
    assert!(res.delay(5).unwrap_err().is_misuse());
}

#[test]
fn completion_publishes_metadata() {
    let source = FakeFrames::solid(2, 1, &[RED, GREEN, BLUE], &[10, 20, 30]).partial(1);
    let opts = DecodeOpts {
        partial: true,
        ..DecodeOpts::default()
    };
    let res = ImageResource::from_frame_source(Box::new(source), ImageFormat::Gif, &opts).unwrap();
    assert!(!res.is_completed());
    assert!(res.delay(0).unwrap_err().is_misuse());

    res.complete().unwrap();
    assert!(res.is_completed());
    assert_eq!(res.frame_count().unwrap(), 3);
    assert_eq!(res.byte_count().unwrap(), 3 * 2 * 4);
    res.complete().unwrap();
}

#[test]
fn renderer_holds_one_reference() {
    let res = animated(&[10, 10, 10], &DecodeOpts::default());
    let mut r1 = res.create_renderer().unwrap();
    let r2 = res.create_renderer().unwrap();
    assert_eq!(res.reference_count(), 2);

    r1.recycle().unwrap();
    r1.recycle().unwrap();
    assert_eq!(res.reference_count(), 1);

    drop(r2);
    assert!(res.is_released());
}
