use super::*;

fn gradient(w: u32, h: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            out.extend_from_slice(&[(x * 10) as u8, (y * 10) as u8, 0, 255]);
        }
    }
    out
}

fn px(data: &[u8], w: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * w + x) * 4) as usize;
    [data[i], data[i + 1], data[i + 2], data[i + 3]]
}

#[test]
fn ratio_one_copies_region_with_offsets() {
    let src = gradient(4, 4);
    let mut dst = vec![0u8; 4 * 4 * 4];
    let blit = Blit {
        dst_x: 1,
        dst_y: 1,
        src_x: 2,
        src_y: 0,
        width: 2,
        height: 2,
        ratio: 1,
    };
    let copied = blit_pixels(
        DstPixels {
            data: &mut dst,
            width: 4,
            height: 4,
            config: PixelConfig::Rgba8888,
        },
        SrcPixels {
            data: &src,
            width: 4,
            height: 4,
        },
        blit,
        None,
    );
    assert!(copied);
    assert_eq!(px(&dst, 4, 1, 1), [20, 0, 0, 255]);
    assert_eq!(px(&dst, 4, 2, 2), [30, 10, 0, 255]);
    assert_eq!(px(&dst, 4, 0, 0), [0, 0, 0, 0]);
}

#[test]
fn ratio_two_averages_each_cell() {
    let src = gradient(4, 4);
    let mut dst = vec![0u8; 2 * 2 * 4];
    assert!(blit_pixels(
        DstPixels {
            data: &mut dst,
            width: 2,
            height: 2,
            config: PixelConfig::Rgba8888,
        },
        SrcPixels {
            data: &src,
            width: 4,
            height: 4,
        },
        Blit::full(4, 4).with_ratio(2),
        None,
    ));
    // Cell (1, 0) covers x in {20, 30}, y in {0, 10}.
    assert_eq!(px(&dst, 2, 1, 0), [25, 5, 0, 255]);
    assert_eq!(px(&dst, 2, 0, 1), [5, 25, 0, 255]);
}

#[test]
fn odd_ratio_samples_inside_cell() {
    let src = gradient(6, 6);
    let c = clip_blit(Blit::full(6, 6).with_ratio(3), 6, 6, 2, 2).unwrap();
    assert_eq!((c.out_w, c.out_h, c.ratio), (2, 2, 3));

    let mut dst = vec![0u8; 2 * 2 * 4];
    blit_pixels(
        DstPixels {
            data: &mut dst,
            width: 2,
            height: 2,
            config: PixelConfig::Rgba8888,
        },
        SrcPixels {
            data: &src,
            width: 6,
            height: 6,
        },
        Blit::full(6, 6).with_ratio(3),
        None,
    );
    // skip = 0, so the cell at x=3 averages columns 3 and 4.
    assert_eq!(px(&dst, 2, 1, 0), [35, 5, 0, 255]);
}

#[test]
fn negative_offsets_are_clipped() {
    let c = clip_blit(
        Blit {
            dst_x: -1,
            dst_y: 0,
            src_x: -2,
            src_y: 0,
            width: 4,
            height: 2,
            ratio: 1,
        },
        4,
        4,
        4,
        4,
    )
    .unwrap();
    // src_x=-2 shifts dst_x to 1; nothing left for the dst_x<0 step.
    assert_eq!((c.dst_x, c.src_x, c.out_w), (1, 0, 2));
}

#[test]
fn undershoot_is_filled_when_requested() {
    let src = vec![9u8; 2 * 2 * 4];
    let mut dst = vec![0u8; 3 * 3 * 4];
    let fill = Rgba8::new(1, 2, 3, 4);
    blit_pixels(
        DstPixels {
            data: &mut dst,
            width: 3,
            height: 3,
            config: PixelConfig::Rgba8888,
        },
        SrcPixels {
            data: &src,
            width: 2,
            height: 2,
        },
        Blit::full(3, 3),
        Some(fill),
    );
    assert_eq!(px(&dst, 3, 0, 0), [9, 9, 9, 9]);
    assert_eq!(px(&dst, 3, 1, 1), [9, 9, 9, 9]);
    assert_eq!(px(&dst, 3, 2, 0), [1, 2, 3, 4]);
    assert_eq!(px(&dst, 3, 0, 2), [1, 2, 3, 4]);
    assert_eq!(px(&dst, 3, 2, 2), [1, 2, 3, 4]);
}

#[test]
fn nothing_copyable_fills_everything() {
    let src = vec![9u8; 2 * 2 * 4];
    let mut dst = vec![0u8; 2 * 2 * 4];
    let copied = blit_pixels(
        DstPixels {
            data: &mut dst,
            width: 2,
            height: 2,
            config: PixelConfig::Rgba8888,
        },
        SrcPixels {
            data: &src,
            width: 2,
            height: 2,
        },
        Blit {
            src_x: 10,
            ..Blit::full(2, 2)
        },
        Some(Rgba8::new(5, 5, 5, 5)),
    );
    assert!(!copied);
    assert!(dst.iter().all(|&b| b == 5));
}

#[test]
fn rgb565_destination_packs_pixels() {
    let src = vec![255, 0, 0, 255];
    let mut dst = vec![0u8; 2];
    blit_pixels(
        DstPixels {
            data: &mut dst,
            width: 1,
            height: 1,
            config: PixelConfig::Rgb565,
        },
        SrcPixels {
            data: &src,
            width: 1,
            height: 1,
        },
        Blit::full(1, 1),
        None,
    );
    assert_eq!(dst, vec![0x00, 0xf8]);
}

#[test]
fn ratio_larger_than_region_copies_nothing() {
    assert!(clip_blit(Blit::full(2, 2).with_ratio(4), 2, 2, 2, 2).is_none());
}
