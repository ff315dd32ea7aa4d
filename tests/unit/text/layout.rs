use super::*;
use crate::text::fonts::BuiltinFontResolver;

fn builtin_pair() -> FontPair {
    resolve_pair(&BuiltinFontResolver, "Helvetica", BASE_FONT_SIZE)
}

#[test]
fn wrap_packs_words_greedily() {
    let mut shaper = TextShaper::new();
    let font = ResolvedFont::builtin(60.0);
    // 48px per character at this size; "aa bb" is 232px wide.
    let lines = wrap_text(&mut shaper, &font, "aa bb  cc", 240).unwrap();
    let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, ["aa bb", "cc"]);
    assert_eq!(lines[0].width, 232);
    assert_eq!(lines[0].height, 64);
}

#[test]
fn wrapped_lines_respect_max_width() {
    let mut shaper = TextShaper::new();
    let font = ResolvedFont::builtin(60.0);
    let text = "the quick brown fox jumps over the lazy dog again and again";
    for max in [200, 300, 500, 940] {
        let lines = wrap_text(&mut shaper, &font, text, max).unwrap();
        for l in &lines {
            let single_word = !l.text.contains(' ');
            assert!(l.width <= max || single_word, "{:?} wider than {max}", l.text);
        }
        let rejoined = lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rejoined, text);
    }
}

#[test]
fn overlong_word_gets_its_own_line() {
    let mut shaper = TextShaper::new();
    let font = ResolvedFont::builtin(60.0);
    let lines = wrap_text(&mut shaper, &font, "a abcdefghij b", 100).unwrap();
    let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, ["a", "abcdefghij", "b"]);
    assert!(lines[1].width > 100);
}

#[test]
fn empty_text_wraps_to_nothing() {
    let mut shaper = TextShaper::new();
    let font = ResolvedFont::builtin(60.0);
    assert!(wrap_text(&mut shaper, &font, "   ", 500).unwrap().is_empty());
}

#[test]
fn empty_artist_and_title_use_default_label() {
    let mut shaper = TextShaper::new();
    let layout = layout_text(&mut shaper, &builtin_pair(), "  ", "", 980).unwrap();
    assert!(layout.artist.is_none());
    assert!(layout.title.is_none());
    let label = layout.default_label.as_ref().unwrap();
    assert_eq!(label.lines[0].text, DEFAULT_LABEL);
    assert_eq!(layout.height, MIN_OVERLAY_HEIGHT);
    assert_eq!(layout.width, 980);
}

#[test]
fn height_counts_lines_gaps_and_margins() {
    let mut shaper = TextShaper::new();
    // max text width 60: every word lands on its own 64px line.
    let layout = layout_text(&mut shaper, &builtin_pair(), "A B C", "D E", 100).unwrap();
    assert_eq!(layout.artist.as_ref().unwrap().lines.len(), 3);
    assert_eq!(layout.title.as_ref().unwrap().lines.len(), 2);
    assert_eq!(layout.title.as_ref().unwrap().font_size(), BASE_FONT_SIZE);
    assert_eq!(layout.height, 40 + 3 * 69 + 15 + 2 * 69);
    assert!(layout.default_label.is_none());
}

#[test]
fn short_text_keeps_minimum_height() {
    let mut shaper = TextShaper::new();
    let layout = layout_text(&mut shaper, &builtin_pair(), "AB", "CD", 980).unwrap();
    assert_eq!(layout.height, MIN_OVERLAY_HEIGHT);
}

#[test]
fn long_title_shrinks_once() {
    let mut shaper = TextShaper::new();
    let title = "one two three four five six seven";
    let layout = layout_text(&mut shaper, &builtin_pair(), "", title, 400).unwrap();
    let block = layout.title.as_ref().unwrap();
    assert_eq!(block.font_size(), 51.0);
    assert!(block.lines.iter().all(|l| l.height == 48));
    assert!(layout.artist.is_none());
}

#[test]
fn two_line_title_shrinks_only_when_long() {
    let mut shaper = TextShaper::new();
    let pair = builtin_pair();
    // Two lines, short: no shrink.
    let layout = layout_text(&mut shaper, &pair, "", "abcdef ghijkl", 400).unwrap();
    let block = layout.title.as_ref().unwrap();
    assert_eq!(block.lines.len(), 2);
    assert_eq!(block.font_size(), BASE_FONT_SIZE);

    // Two lines but over 50 characters.
    let long_words = format!("{} {}", "a".repeat(26), "b".repeat(26));
    let layout = layout_text(&mut shaper, &pair, "", &long_words, 400).unwrap();
    assert_eq!(layout.title.as_ref().unwrap().font_size(), 51.0);
}

#[test]
fn artist_is_white_over_dark_outline() {
    let mut shaper = TextShaper::new();
    let stage = StageLayout::portrait();
    let layout = layout_text(&mut shaper, &builtin_pair(), "I", "", stage.text_width).unwrap();
    let overlay = render_overlay(&mut shaper, &layout, &stage).unwrap();
    assert_eq!(overlay.position(), (50, 1150));
    assert_eq!(overlay.image.width, 980);

    // "I" is 40px wide, centred at x 470; its stem spans x 486..494 from y 20.
    assert_eq!(overlay.image.pixel(490, 40), [255, 255, 255, 255]);
    // Right of the stem only the outline reaches.
    let shadow = overlay.image.pixel(496, 40);
    assert_eq!(&shadow[..3], &[0, 0, 0]);
    assert!(shadow[3] >= 200, "{shadow:?}");
    // Far away stays transparent.
    assert_eq!(overlay.image.alpha(10, 10), 0);
}

#[test]
fn default_label_is_drawn() {
    let mut shaper = TextShaper::new();
    let stage = StageLayout::portrait();
    let layout = layout_text(&mut shaper, &builtin_pair(), "", "", stage.text_width).unwrap();
    let overlay = render_overlay(&mut shaper, &layout, &stage).unwrap();
    assert!(
        overlay
            .image
            .data
            .chunks_exact(4)
            .any(|p| p == [255, 255, 255, 255])
    );
}

#[test]
fn build_overlay_uses_stage_slot() {
    let stage = StageLayout::portrait();
    let overlay =
        build_overlay(&BuiltinFontResolver, "Helvetica", "Test Artist", "Test Song", &stage)
            .unwrap();
    assert_eq!(overlay.position(), (50, 1150));
    assert_eq!(overlay.image.width, 980);
    assert!(overlay.image.height >= MIN_OVERLAY_HEIGHT);
}
