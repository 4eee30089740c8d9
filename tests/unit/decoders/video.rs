use super::*;
use crate::foundation::platform::StdFs;

#[test]
fn probe_timing_math() {
    let probe = VideoProbe {
        width: 4,
        height: 4,
        fps_num: 30000,
        fps_den: 1001,
        frames: 10,
        has_alpha: false,
    };
    assert_eq!(probe.frame_rate(), 29);
    assert_eq!(probe.frame_delay_ms(), 33);
    assert!((probe.frame_time_sec(30) - 1.001).abs() < 1e-9);

    let zero = VideoProbe {
        fps_num: 0,
        fps_den: 0,
        ..probe
    };
    assert_eq!(zero.frame_rate(), 0);
    assert_eq!(zero.frame_delay_ms(), 0);
    assert_eq!(zero.frame_time_sec(5), 0.0);
}

#[test]
fn declines_non_file_sources() {
    let dec = VideoDecoder::new(Arc::new(StdFs::new()));
    assert!(dec.accept(&ImageSource::buffer(vec![0u8; 8])).is_none());
    assert!(dec.accept(&ImageSource::symbol("x").unwrap()).is_none());
}

#[cfg(not(feature = "media-ffmpeg"))]
#[test]
fn probe_requires_feature() {
    let err = probe_video(Path::new("clip.mp4")).unwrap_err();
    assert!(err.to_string().contains("media-ffmpeg"));
}

#[cfg(feature = "media-ffmpeg")]
#[test]
fn ff_ratio_parsing() {
    assert_eq!(parse_ff_ratio("30000/1001"), Some((30000, 1001)));
    assert_eq!(parse_ff_ratio("25/0"), None);
    assert_eq!(parse_ff_ratio("abc"), None);
}

#[cfg(feature = "media-ffmpeg")]
#[test]
fn alpha_pixel_formats() {
    for fmt in ["yuva420p", "rgba", "bgra", "argb", "gbrap10le", "ya8"] {
        assert!(pix_fmt_has_alpha(fmt), "{fmt}");
    }
    for fmt in ["yuv420p", "rgb24", "gbrp", "nv12", "gray"] {
        assert!(!pix_fmt_has_alpha(fmt), "{fmt}");
    }
}
