use super::*;

fn temp_path(tag: &str, ext: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "vinylcast_trim_{tag}_{}_{}.{ext}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ))
}

#[test]
fn fit_pads_with_silence_and_truncates() {
    let mut seg = AudioSegment {
        sample_rate: 10,
        channels: 2,
        interleaved: vec![0.5; 6],
    };
    assert_eq!(seg.frames(), 3);
    seg.fit_to_frames(5);
    assert_eq!(seg.interleaved.len(), 10);
    assert_eq!(&seg.interleaved[6..], &[0.0; 4]);
    seg.fit_to_frames(2);
    assert_eq!(seg.interleaved, vec![0.5; 4]);
    assert!((seg.duration_secs() - 0.2).abs() < 1e-12);
}

#[test]
fn expected_frames_rounds_duration() {
    let r = TimeRange::new(1.0, 2.5).unwrap();
    assert_eq!(expected_frames(r, 48_000), 72_000);
    let r = TimeRange::new(0.0, 0.00001).unwrap();
    assert_eq!(expected_frames(r, 48_000), 0);
}

#[test]
fn f32le_file_round_trips() {
    let seg = AudioSegment {
        sample_rate: 48_000,
        channels: 2,
        interleaved: vec![0.25, -0.5, 1.0, 0.0],
    };
    let p = temp_path("pcm", "f32le");
    seg.write_f32le(&p).unwrap();
    let bytes = std::fs::read(&p).unwrap();
    let _ = std::fs::remove_file(&p);
    assert_eq!(bytes.len(), 16);
    assert_eq!(pcm_from_f32le(&p, &bytes).unwrap(), seg.interleaved);
}

#[test]
fn misaligned_pcm_is_rejected() {
    let err = pcm_from_f32le(Path::new("x.wav"), &[0, 0, 0]).unwrap_err();
    assert!(matches!(err, VinylcastError::AudioDecode { .. }));
}

#[test]
fn trims_exact_length_with_ffmpeg() {
    if !crate::encode::ffmpeg::is_ffmpeg_on_path() {
        eprintln!("ffmpeg not on PATH; skipping");
        return;
    }
    let src = temp_path("src", "wav");
    let status = std::process::Command::new("ffmpeg")
        .args(["-y", "-v", "error", "-f", "lavfi", "-i", "sine=frequency=440:duration=3"])
        .arg(&src)
        .status()
        .unwrap();
    assert!(status.success());

    let range = TimeRange::new(0.5, 1.75).unwrap();
    let seg = trim_audio(&src, range, 48_000).unwrap();
    let _ = std::fs::remove_file(&src);
    assert_eq!(seg.channels, 2);
    assert_eq!(seg.frames(), 60_000);
    assert!(seg.interleaved.iter().any(|s| s.abs() > 0.01));
}
