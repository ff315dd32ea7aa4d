use super::*;

const SAMPLE: &str = r#"{
    "streams": [
        {"codec_type": "video", "width": 10, "height": 10},
        {"codec_type": "audio", "sample_rate": "44100", "channels": 1, "duration": "29.9"},
        {"codec_type": "audio", "sample_rate": "48000", "channels": 2, "duration": "30.1"}
    ],
    "format": {"duration": "30.000000"}
}"#;

#[test]
fn format_duration_wins() {
    let info = parse_probe_output(Path::new("song.mp3"), SAMPLE.as_bytes()).unwrap();
    assert_eq!(info.duration, 30.0);
    assert_eq!(info.sample_rate, 44_100);
    assert_eq!(info.channels, 1);
    assert_eq!(info.path, PathBuf::from("song.mp3"));
}

#[test]
fn falls_back_to_longest_audio_stream() {
    let json = r#"{
        "streams": [
            {"codec_type": "audio", "sample_rate": "48000", "channels": 2, "duration": "12.5"},
            {"codec_type": "audio", "sample_rate": "48000", "duration": "12.75"}
        ],
        "format": {"duration": "N/A"}
    }"#;
    let info = parse_probe_output(Path::new("a.wav"), json.as_bytes()).unwrap();
    assert_eq!(info.duration, 12.75);
    assert_eq!(info.channels, 2);
}

#[test]
fn missing_audio_stream_is_a_decode_error() {
    let json = r#"{"streams": [{"codec_type": "video"}], "format": {"duration": "3.0"}}"#;
    let err = parse_probe_output(Path::new("clip.mp4"), json.as_bytes()).unwrap_err();
    match err {
        VinylcastError::AudioDecode { path, detail } => {
            assert_eq!(path, PathBuf::from("clip.mp4"));
            assert!(detail.contains("no audio stream"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn garbage_output_is_a_decode_error() {
    let err = parse_probe_output(Path::new("x.mp3"), b"not json").unwrap_err();
    assert!(matches!(err, VinylcastError::AudioDecode { .. }));

    let no_duration = r#"{"streams": [{"codec_type": "audio", "sample_rate": "48000"}]}"#;
    let err = parse_probe_output(Path::new("x.mp3"), no_duration.as_bytes()).unwrap_err();
    assert!(matches!(err, VinylcastError::AudioDecode { .. }));
}

#[test]
fn missing_file_reports_path() {
    let p = Path::new("/definitely/missing/song.mp3");
    let err = probe_audio(p).unwrap_err();
    match err {
        VinylcastError::AudioDecode { path, .. } => assert_eq!(path, p),
        other => panic!("unexpected error: {other}"),
    }
}
