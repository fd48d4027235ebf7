/*!
 * Tests for subtitle segments, SRT parsing and line wrapping
 */

use vidscribe::errors::SubtitleError;
use vidscribe::subtitle_processor::{parse_srt, wrap_text, SubtitleSegment};

#[test]
fn test_formatTimestamp_shouldPadEveryField() {
    assert_eq!(SubtitleSegment::format_timestamp(0), "00:00:00,000");
    assert_eq!(SubtitleSegment::format_timestamp(61_001), "00:01:01,001");
    assert_eq!(SubtitleSegment::format_timestamp(36_000_000), "10:00:00,000");
    assert_eq!(SubtitleSegment::format_vtt_timestamp(61_001), "00:01:01.001");
}

#[test]
fn test_parseTimestamp_shouldAcceptCommaAndDot() {
    assert_eq!(SubtitleSegment::parse_timestamp("01:02:03,004").unwrap(), 3_723_004);
    assert_eq!(SubtitleSegment::parse_timestamp("00:00:01.500").unwrap(), 1_500);
}

#[test]
fn test_parseTimestamp_withBadInput_shouldFail() {
    assert!(SubtitleSegment::parse_timestamp("00:61:00,000").is_err());
    assert!(SubtitleSegment::parse_timestamp("1:2").is_err());
    assert!(SubtitleSegment::parse_timestamp("aa:bb:cc,ddd").is_err());
}

#[test]
fn test_display_shouldRenderSrtBlock() {
    let segment = SubtitleSegment::new(7, 1_000, 2_000, "Hi", "Hola", 0.9);
    assert_eq!(segment.to_string(), "7\n00:00:01,000 --> 00:00:02,000\nHola\n\n");
}

#[test]
fn test_parseSrt_withCrlfAndMultilineText() {
    let content = "1\r\n00:00:01,000 --> 00:00:02,000\r\nFirst line\r\nSecond line\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,500\r\nNext\r\n";
    let cues = parse_srt(content).unwrap();

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].text, "First line\nSecond line");
    assert_eq!(cues[1].index, 2);
    assert_eq!(cues[1].end_ms, 4_500);
}

#[test]
fn test_parseSrt_shouldSkipEmptyCues() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\n\n2\n00:00:03,000 --> 00:00:04,000\nKept\n";
    let cues = parse_srt(content).unwrap();
    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].text, "Kept");
}

#[test]
fn test_parseSrt_withNoCues_shouldFail() {
    assert!(matches!(parse_srt(""), Err(SubtitleError::Parse(_))));
    assert!(matches!(parse_srt("just some text\n"), Err(SubtitleError::Parse(_))));
}

#[test]
fn test_wrapText_shortTextIsUnchanged() {
    assert_eq!(wrap_text("Hello there", 42, 2).unwrap(), "Hello there");
}

#[test]
fn test_wrapText_shouldBreakOnWordBoundaries() {
    let wrapped = wrap_text("The quick brown fox jumps over the lazy dog", 20, 3).unwrap();
    assert_eq!(wrapped, "The quick brown fox\njumps over the lazy\ndog");
}

#[test]
fn test_wrapText_shouldCollapseExistingBreaks() {
    assert_eq!(wrap_text("one\ntwo   three", 42, 2).unwrap(), "one two three");
}

#[test]
fn test_wrapText_shouldCountCharactersNotBytes() {
    let wrapped = wrap_text("ééééé ééééé", 5, 2).unwrap();
    assert_eq!(wrapped, "ééééé\nééééé");
}

#[test]
fn test_wrapText_withZeroLimits_shouldFail() {
    assert!(matches!(wrap_text("text", 0, 2), Err(SubtitleError::InvalidWrap(_))));
    assert!(matches!(wrap_text("text", 10, 0), Err(SubtitleError::InvalidWrap(_))));
}

#[test]
fn test_wrapText_withEmptyText_shouldReturnEmpty() {
    assert_eq!(wrap_text("   ", 10, 2).unwrap(), "");
}
