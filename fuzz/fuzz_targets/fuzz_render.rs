#![no_main]
use fastscaling::*;
use libfuzzer_sys::fuzz_target;

const FORMATS: [PixelFormat; 5] = [
    PixelFormat::Gray8,
    PixelFormat::GrayAlpha8,
    PixelFormat::Bgr24,
    PixelFormat::Bgra32,
    PixelFormat::Bgr32,
];

const FILTERS: [Filter; 8] = [
    Filter::Robidoux,
    Filter::RobidouxSharp,
    Filter::Lanczos,
    Filter::CubicFast,
    Filter::CatmullRom,
    Filter::Triangle,
    Filter::Box,
    Filter::Fastest,
];

fuzz_target!(|data: &[u8]| {
    // Header: src w, src h, dst w, dst h, formats, filter, divisor, sharpen, flags
    let Some((header, pixels)) = data.split_first_chunk::<9>() else {
        return;
    };
    let src_w = u32::from(header[0] % 64);
    let src_h = u32::from(header[1] % 64);
    let dst_w = u32::from(header[2] % 64);
    let dst_h = u32::from(header[3] % 64);
    let src_format = FORMATS[usize::from(header[4] % 5)];
    let dst_format = FORMATS[usize::from(header[4] / 5 % 5)];

    let mut ctx = Context::new();
    // Zero dimensions must surface as errors, never panics.
    let Ok(mut source) = ctx.create_bitmap_bgra(src_w, src_h, true, src_format) else {
        assert!(ctx.has_error());
        return;
    };
    for (dst, &src) in source.pixels_mut().iter_mut().zip(pixels.iter().cycle()) {
        *dst = src;
    }
    source.set_alpha_meaningful(header[8] & 8 != 0);

    let Ok(mut canvas) = ctx.create_bitmap_bgra(dst_w, dst_h, true, dst_format) else {
        assert!(ctx.has_error());
        return;
    };

    let details = RenderDetails {
        interpolation: InterpolationDetails::create(FILTERS[usize::from(header[5] % 8)]),
        halving_divisor: u32::from(header[6] % 18),
        sharpen_percent_goal: f32::from(header[7]) - 20.0,
        post_flip_x: header[8] & 1 != 0,
        post_flip_y: header[8] & 2 != 0,
        post_transpose: header[8] & 4 != 0,
        colorspace: if header[8] & 16 != 0 {
            ColorSpace::Srgb
        } else {
            ColorSpace::Linear
        },
    };

    let result = Renderer::new(&source, &mut canvas, details).perform_render(&mut ctx);
    assert_eq!(result.is_err(), ctx.has_error());
    assert_eq!((canvas.width(), canvas.height()), (dst_w, dst_h));
});
