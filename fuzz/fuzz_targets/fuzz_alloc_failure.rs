#![no_main]
use std::sync::Arc;

use fastscaling::*;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fail the n-th allocation of a fixed render; every failure must be recorded.
    let Some(&[w, h, n, divisor]) = data.first_chunk::<4>() else {
        return;
    };
    let faults = Arc::new(FaultInjectingAllocator::new());
    let mut ctx = Context::with_allocator(faults.clone());
    let Ok(source) = ctx.create_bitmap_bgra(u32::from(w % 48) + 1, u32::from(h % 48) + 1, true, PixelFormat::Bgra32) else {
        return;
    };
    let Ok(mut canvas) = ctx.create_bitmap_bgra(7, 5, true, PixelFormat::Bgra32) else {
        return;
    };

    faults.fail_after(u32::from(n % 16));
    let details = RenderDetails {
        halving_divisor: u32::from(divisor % 4) + 1,
        sharpen_percent_goal: 30.0,
        ..RenderDetails::new()
    };
    match Renderer::new(&source, &mut canvas, details).perform_render(&mut ctx) {
        Ok(()) => assert!(!ctx.has_error()),
        Err(err) => {
            assert!(ctx.has_error());
            assert_eq!(ctx.error(), Some(&err));
        }
    }
});
