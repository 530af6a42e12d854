use fastscaling::*;

fn gradient(ctx: &mut Context, width: u32, height: u32, format: PixelFormat) -> BitmapBgra {
    let mut bitmap = ctx.create_bitmap_bgra(width, height, true, format).unwrap();
    let bpp = format.bytes_per_pixel();
    for y in 0..height {
        for (x, px) in bitmap.row_mut(y).chunks_exact_mut(bpp).enumerate() {
            for (c, v) in px.iter_mut().enumerate() {
                *v = (x as u32 * 37 + y * 11 + c as u32 * 53) as u8;
            }
            if bpp == 4 {
                px[3] = 255;
            }
        }
    }
    bitmap
}

fn render(
    ctx: &mut Context,
    source: &BitmapBgra,
    width: u32,
    height: u32,
    details: RenderDetails,
) -> BitmapBgra {
    let mut canvas = ctx
        .create_bitmap_bgra(width, height, true, source.format())
        .unwrap();
    Renderer::new(source, &mut canvas, details)
        .perform_render(ctx)
        .unwrap();
    canvas
}

fn with_filter(filter: Filter) -> RenderDetails {
    RenderDetails {
        interpolation: InterpolationDetails::create(filter),
        ..RenderDetails::new()
    }
}

#[test]
fn identity_resize_is_lossless() {
    let mut ctx = Context::new();
    for format in [PixelFormat::Bgr24, PixelFormat::Bgra32, PixelFormat::Bgr32] {
        let source = gradient(&mut ctx, 9, 7, format);
        for filter in [Filter::CatmullRom, Filter::Triangle, Filter::Lanczos] {
            let canvas = render(&mut ctx, &source, 9, 7, with_filter(filter));
            assert_eq!(canvas.pixels(), source.pixels(), "{format:?} {filter:?}");
        }
    }
    assert!(!ctx.has_error());
}

#[test]
fn srgb_space_identity_is_lossless() {
    let mut ctx = Context::new();
    let source = gradient(&mut ctx, 5, 5, PixelFormat::Bgr24);
    let details = RenderDetails {
        colorspace: ColorSpace::Srgb,
        ..with_filter(Filter::CatmullRom)
    };
    let canvas = render(&mut ctx, &source, 5, 5, details);
    assert_eq!(canvas.pixels(), source.pixels());
}

#[test]
fn uniform_image_stays_uniform_through_every_stage() {
    let mut ctx = Context::new();
    let mut source = ctx
        .create_bitmap_bgra(64, 48, true, PixelFormat::Bgra32)
        .unwrap();
    source.fill(&[12, 200, 99, 255]);
    let details = RenderDetails {
        interpolation: InterpolationDetails::create(Filter::Robidoux),
        halving_divisor: 4,
        sharpen_percent_goal: 80.0,
        post_flip_x: true,
        post_flip_y: true,
        post_transpose: true,
        ..RenderDetails::new()
    };
    let canvas = render(&mut ctx, &source, 5, 7, details);
    assert_eq!((canvas.width(), canvas.height()), (5, 7));
    for px in canvas.pixels().chunks_exact(4) {
        assert!(px[0].abs_diff(12) <= 1, "{px:?}");
        assert!(px[1].abs_diff(200) <= 1, "{px:?}");
        assert!(px[2].abs_diff(99) <= 1, "{px:?}");
        assert_eq!(px[3], 255);
    }
}

#[test]
fn halving_alone_matches_box_average() {
    let mut ctx = Context::new();
    let mut source = ctx
        .create_bitmap_bgra(4, 2, true, PixelFormat::Gray8)
        .unwrap();
    source.row_mut(0).copy_from_slice(&[0, 0, 255, 255]);
    source.row_mut(1).copy_from_slice(&[0, 0, 255, 255]);
    let details = RenderDetails {
        halving_divisor: 2,
        ..with_filter(Filter::CatmullRom)
    };
    let canvas = render(&mut ctx, &source, 2, 1, details);
    assert_eq!(canvas.pixels(), &[0, 255]);
}

#[test]
fn flips_mirror_the_output() {
    let mut ctx = Context::new();
    let source = gradient(&mut ctx, 6, 4, PixelFormat::Bgra32);
    let plain = render(&mut ctx, &source, 6, 4, with_filter(Filter::CatmullRom));

    let details = RenderDetails {
        post_flip_x: true,
        ..with_filter(Filter::CatmullRom)
    };
    let flipped = render(&mut ctx, &source, 6, 4, details);
    for y in 0..4 {
        for x in 0..6 {
            assert_eq!(flipped.pixel(x, y), plain.pixel(5 - x, y));
        }
    }

    let details = RenderDetails {
        post_flip_y: true,
        ..with_filter(Filter::CatmullRom)
    };
    let flipped = render(&mut ctx, &source, 6, 4, details);
    for y in 0..4 {
        assert_eq!(flipped.row(y), plain.row(3 - y));
    }
}

#[test]
fn transpose_fills_a_rotated_canvas() {
    let mut ctx = Context::new();
    let source = gradient(&mut ctx, 6, 4, PixelFormat::Bgr24);
    let details = RenderDetails {
        post_transpose: true,
        ..with_filter(Filter::CatmullRom)
    };
    let canvas = render(&mut ctx, &source, 4, 6, details);
    assert_eq!((canvas.width(), canvas.height()), (4, 6));
    for y in 0..6 {
        for x in 0..4 {
            assert_eq!(canvas.pixel(x, y), source.pixel(y, x));
        }
    }
}

#[test]
fn transforms_compose_in_documented_order() {
    let mut ctx = Context::new();
    let source = gradient(&mut ctx, 5, 3, PixelFormat::Bgra32);
    let details = RenderDetails {
        post_transpose: true,
        post_flip_x: true,
        post_flip_y: true,
        ..with_filter(Filter::Triangle)
    };
    let canvas = render(&mut ctx, &source, 3, 5, details);

    // Transpose, then mirror both axes: output (x, y) comes from
    // transposed (2 - x, 4 - y), which is source (4 - y, 2 - x).
    for y in 0..5 {
        for x in 0..3 {
            assert_eq!(canvas.pixel(x, y), source.pixel(4 - y, 2 - x));
        }
    }

    let mut manual = render(&mut ctx, &source, 5, 3, with_filter(Filter::Triangle));
    for step in PostTransform::ORDER {
        step.apply(&mut manual);
    }
    assert_eq!(manual.pixels(), canvas.pixels());
}

#[test]
fn zero_sharpen_changes_nothing() {
    let mut ctx = Context::new();
    let source = gradient(&mut ctx, 8, 8, PixelFormat::Bgr24);
    let base = render(&mut ctx, &source, 5, 5, RenderDetails::new());
    let details = RenderDetails {
        sharpen_percent_goal: 0.0,
        ..RenderDetails::new()
    };
    assert_eq!(render(&mut ctx, &source, 5, 5, details).pixels(), base.pixels());

    let details = RenderDetails {
        sharpen_percent_goal: 100.0,
        ..RenderDetails::new()
    };
    assert_ne!(render(&mut ctx, &source, 5, 5, details).pixels(), base.pixels());
}

#[test]
fn extreme_sharpening_stays_in_range() {
    let mut ctx = Context::new();
    let source = gradient(&mut ctx, 16, 16, PixelFormat::Bgra32);
    let details = RenderDetails {
        sharpen_percent_goal: 1000.0,
        ..with_filter(Filter::Lanczos)
    };
    let canvas = render(&mut ctx, &source, 7, 9, details);
    assert_eq!(canvas.pixels().len(), 7 * 9 * 4);
    assert!(!ctx.has_error());
}

#[test]
fn ignored_alpha_renders_opaque() {
    let mut ctx = Context::new();
    let mut source = ctx
        .create_bitmap_bgra(4, 4, true, PixelFormat::Bgra32)
        .unwrap();
    source.fill(&[50, 60, 70, 0]);
    source.set_alpha_meaningful(false);
    let canvas = render(&mut ctx, &source, 2, 2, RenderDetails::new());
    for px in canvas.pixels().chunks_exact(4) {
        assert_eq!(px[3], 255);
        assert!(px[0].abs_diff(50) <= 1);
    }
}

#[test]
fn gray_canvas_receives_luma() {
    let mut ctx = Context::new();
    let mut source = ctx
        .create_bitmap_bgra(3, 3, true, PixelFormat::Bgr24)
        .unwrap();
    source.fill(&[128, 128, 128]);
    let mut canvas = ctx
        .create_bitmap_bgra(3, 3, true, PixelFormat::Gray8)
        .unwrap();
    Renderer::new(&source, &mut canvas, with_filter(Filter::CatmullRom))
        .perform_render(&mut ctx)
        .unwrap();
    assert!(canvas.pixels().iter().all(|&v| v == 128));
}

#[test]
fn renderer_exposes_details_and_canvas() {
    let mut ctx = Context::new();
    let source = gradient(&mut ctx, 4, 4, PixelFormat::Bgr24);
    let mut canvas = ctx
        .create_bitmap_bgra(2, 2, true, PixelFormat::Bgr24)
        .unwrap();
    let mut renderer = Renderer::new(&source, &mut canvas, RenderDetails::new());
    renderer.details_mut().halving_divisor = 2;
    assert_eq!(renderer.details().halving_divisor, 2);
    renderer.perform_render(&mut ctx).unwrap();
    assert_eq!(renderer.canvas().width(), 2);
}

#[cfg(feature = "imgref")]
#[test]
fn canvas_as_imgref() {
    let mut ctx = Context::new();
    let source = gradient(&mut ctx, 4, 4, PixelFormat::Bgra32);
    let canvas = render(&mut ctx, &source, 4, 4, with_filter(Filter::CatmullRom));
    let img = canvas.as_imgref::<rgb::alt::BGRA<u8>>().unwrap();
    assert_eq!((img.width(), img.height()), (4, 4));
    assert_eq!(img.buf()[0].b, source.pixel(0, 0)[0]);

    let err = canvas.as_pixels::<rgb::alt::BGR<u8>>().unwrap_err();
    assert_eq!(err.reason(), ErrorReason::UnsupportedPixelFormat);
}
