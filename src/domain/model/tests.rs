// Unit tests for domain models

use super::*;

#[test]
fn test_time_interval_from_seconds() {
    let t = TimeInterval::from_seconds(3661.5);
    assert_eq!(t.as_seconds(), 3661.5);
}

#[test]
fn test_time_interval_saturates_at_zero() {
    let t = TimeInterval::from_seconds(-4.0);
    assert_eq!(t.as_seconds(), 0.0);

    let a = TimeInterval::from_seconds(2.0);
    let b = TimeInterval::from_seconds(5.0);
    assert_eq!(a.saturating_sub(b).as_seconds(), 0.0);
    assert_eq!(b.saturating_sub(a).as_seconds(), 3.0);
}

#[test]
fn test_time_interval_parse_seconds() {
    let t = TimeInterval::parse("123.456").unwrap();
    assert_eq!(t.as_seconds(), 123.456);
}

#[test]
fn test_time_interval_parse_mm_ss() {
    let t = TimeInterval::parse("01:30.5").unwrap();
    assert_eq!(t.as_seconds(), 90.5);
}

#[test]
fn test_time_interval_parse_hh_mm_ss() {
    let t = TimeInterval::parse("01:02:03.456").unwrap();
    assert!((t.as_seconds() - 3723.456).abs() < 1e-9);
}

#[test]
fn test_time_interval_parse_invalid() {
    assert!(TimeInterval::parse("invalid").is_err());
    assert!(TimeInterval::parse("00:61.0").is_err()); // Seconds overflow
    assert!(TimeInterval::parse("1:60:00").is_err()); // Minutes overflow
    assert!(TimeInterval::parse("-10").is_err()); // Negative time
}

#[test]
fn test_time_interval_display() {
    let t = TimeInterval::from_seconds(3723.456);
    assert_eq!(format!("{}", t), "1:02:03.456");

    let short = TimeInterval::from_seconds(123.456);
    assert_eq!(format!("{}", short), "2:03.456");
}

#[test]
fn test_time_interval_display_carries_rounded_millis() {
    let t = TimeInterval::from_seconds(59.9996);
    assert_eq!(format!("{}", t), "1:00.000");

    let t = TimeInterval::from_seconds(3599.9996);
    assert_eq!(format!("{}", t), "1:00:00.000");
}

#[test]
fn test_time_range_creation() {
    let range = TimeRange::new(
        TimeInterval::from_seconds(10.0),
        TimeInterval::from_seconds(20.0),
    )
    .unwrap();
    assert_eq!(range.duration().as_seconds(), 10.0);
    assert_eq!(range.mid().as_seconds(), 15.0);
}

#[test]
fn test_time_range_invalid() {
    let start = TimeInterval::from_seconds(10.0);
    let end = TimeInterval::from_seconds(5.0);
    assert!(TimeRange::new(start, end).is_err());
    assert!(TimeRange::new(start, start).is_err()); // Zero width
}

#[test]
fn test_ratio_clamping() {
    assert_eq!(Ratio(1.5).clamped_unit().value(), 1.0);
    assert_eq!(Ratio(-0.2).clamped_unit().value(), 0.0);
    assert_eq!(Ratio(0.7).clamped(0.0, 0.5).value(), 0.5);
    assert_eq!(Ratio(f64::NAN).clamped_unit().value(), 0.0);
}

#[test]
fn test_timeline_limits_conversion() {
    let limits = TimelineLimits::new(
        TimeInterval::ZERO,
        TimeInterval::from_seconds(100.0),
    );
    assert_eq!(limits.time_at(Ratio(0.25)).as_seconds(), 25.0);
    assert_eq!(limits.ratio_of(TimeInterval::from_seconds(50.0)).value(), 0.5);
}

#[test]
fn test_timeline_limits_zero_width() {
    let limits = TimelineLimits::new(TimeInterval::ZERO, TimeInterval::ZERO);
    assert_eq!(limits.ratio_of(TimeInterval::from_seconds(5.0)).value(), 0.0);
}

#[test]
fn test_trim_range_invariant() {
    let mut trim = TrimRange::full();
    trim.set_end(Ratio(0.5));
    trim.set_start(Ratio(0.8)); // Clamped to end
    assert_eq!(trim.start_ratio().value(), 0.5);
    assert_eq!(trim.end_ratio().value(), 0.5);

    let mut trim = TrimRange::new(Ratio(0.2), Ratio(0.6));
    trim.set_end(Ratio(0.1)); // Clamped to start
    assert_eq!(trim.end_ratio().value(), 0.2);
}

#[test]
fn test_trim_range_shift_preserves_interval() {
    let mut trim = TrimRange::new(Ratio(0.2), Ratio(0.5));
    trim.shift(0.9); // Clamped so the end stays at 1.0
    assert_eq!(trim.start_ratio().value(), 0.7);
    assert_eq!(trim.end_ratio().value(), 1.0);
    assert!((trim.interval() - 0.3).abs() < 1e-12);

    trim.shift(-2.0);
    assert_eq!(trim.start_ratio().value(), 0.0);
    assert!((trim.interval() - 0.3).abs() < 1e-12);
}

#[test]
fn test_clip_from_trim() {
    let limits = TimelineLimits::new(
        TimeInterval::ZERO,
        TimeInterval::from_seconds(100.0),
    );
    let trim = TrimRange::new(Ratio(0.1), Ratio(0.5));
    let clip = Clip::from_trim(&trim, &limits).unwrap();
    assert_eq!(clip.start().as_seconds(), 10.0);
    assert_eq!(clip.end().as_seconds(), 50.0);
    assert_eq!(clip.duration().as_seconds(), 40.0);
}

#[test]
fn test_clip_zero_width_rejected() {
    let limits = TimelineLimits::new(TimeInterval::ZERO, TimeInterval::from_seconds(100.0));
    let trim = TrimRange::new(Ratio(0.3), Ratio(0.3));
    assert!(Clip::from_trim(&trim, &limits).is_err());
}

#[test]
fn test_track_descriptor_disabled_sentinel() {
    let disabled = TrackDescriptor::disabled();
    assert_eq!(disabled.stream_id, -1);
    assert!(!disabled.is_enabled());
}

#[test]
fn test_resolution_equality_ignores_label() {
    let a = ResolutionSpec {
        width: 1920,
        height: 1080,
        label: Some("1080p".to_string()),
    };
    let b = ResolutionSpec::new(1920, 1080);
    assert_eq!(a, b);
    assert!(ResolutionSpec::CUSTOM.is_custom());
    assert!(!a.is_custom());
}

#[test]
fn test_container_audio_support() {
    assert!(ContainerFormat::Mp4.supports_audio());
    assert!(ContainerFormat::Mkv.supports_audio());
    assert!(!ContainerFormat::Gif.supports_audio());
    assert!(ContainerFormat::parse("MP4").is_ok());
    assert!(ContainerFormat::parse("wmv").is_err());
}

#[test]
fn test_export_spec_rejects_bad_speed() {
    let source = MediaSource::new("input.mp4", TimeInterval::from_seconds(60.0));
    let result = ExportSpec::new(
        source,
        vec![],
        0.0,
        None,
        None,
        None,
        None,
        None,
        vec![],
        "out.mp4",
        ContainerFormat::Mp4,
    );
    assert!(result.is_err());
}

#[test]
fn test_export_spec_custom_resolution_requires_dimensions() {
    let source = MediaSource::new("input.mp4", TimeInterval::from_seconds(60.0));
    let result = ExportSpec::new(
        source.clone(),
        vec![],
        1.0,
        Some(ResolutionSpec::CUSTOM),
        None,
        None,
        None,
        None,
        vec![],
        "out.mp4",
        ContainerFormat::Mp4,
    );
    assert!(result.is_err());

    let spec = ExportSpec::new(
        source,
        vec![],
        1.0,
        Some(ResolutionSpec::CUSTOM),
        Some((1280, 544)),
        None,
        None,
        None,
        vec![],
        "out.mp4",
        ContainerFormat::Mp4,
    )
    .unwrap();
    assert_eq!(spec.resolved_dimensions(), Some((1280, 544)));
}

#[test]
fn test_export_spec_whole_range_fallback() {
    let source = MediaSource::new("input.mp4", TimeInterval::from_seconds(60.0));
    let spec = ExportSpec::new(
        source,
        vec![],
        1.0,
        None,
        None,
        None,
        None,
        None,
        vec![],
        "out.mp4",
        ContainerFormat::Mp4,
    )
    .unwrap();
    let clips = spec.effective_clips();
    assert_eq!(clips.len(), 1);
    assert_eq!(clips[0].duration().as_seconds(), 60.0);
}

#[test]
fn test_export_spec_speed_scales_total_duration() {
    let source = MediaSource::new("input.mp4", TimeInterval::from_seconds(60.0));
    let clip = Clip::new(
        TimeInterval::from_seconds(5.0),
        TimeInterval::from_seconds(45.0),
    )
    .unwrap();
    let spec = ExportSpec::new(
        source,
        vec![clip],
        0.5,
        None,
        None,
        None,
        None,
        None,
        vec![],
        "out.mp4",
        ContainerFormat::Mp4,
    )
    .unwrap();
    // 40s of material at half speed plays for 80s
    assert!((spec.total_output_seconds() - 80.0).abs() < 1e-9);
}

#[test]
fn test_export_spec_filters_disabled_tracks() {
    let source = MediaSource::new("input.mp4", TimeInterval::from_seconds(60.0));
    let spec = ExportSpec::new(
        source,
        vec![],
        1.0,
        None,
        None,
        None,
        None,
        None,
        vec![TrackDescriptor::disabled()],
        "out.mp4",
        ContainerFormat::Mp4,
    )
    .unwrap();
    assert!(spec.audio_tracks.is_empty());
}
