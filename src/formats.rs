/*!
 * Subtitle serializers.
 *
 * Each `SubtitleFormat` variant turns an ordered slice of
 * `SubtitleSegment`s into its text encoding. Serialization is pure: the
 * same input always yields byte-identical output.
 */

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::str::FromStr;

use crate::errors::SubtitleError;
use crate::subtitle_processor::SubtitleSegment;

/// Output encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    #[default]
    Srt,
    Vtt,
    Ass,
    Json,
}

impl SubtitleFormat {
    /// Every supported format, in display order
    pub const ALL: [SubtitleFormat; 4] = [Self::Srt, Self::Vtt, Self::Ass, Self::Json];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Ass => "ass",
            Self::Json => "json",
        }
    }

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Srt => "application/x-subrip; charset=utf-8",
            Self::Vtt => "text/vtt; charset=utf-8",
            Self::Ass => "text/x-ssa; charset=utf-8",
            Self::Json => "application/json",
        }
    }

    /// Encode segments for the given language
    pub fn serialize(&self, language: &str, segments: &[SubtitleSegment]) -> String {
        match self {
            Self::Srt => to_srt(segments),
            Self::Vtt => to_vtt(language, segments),
            Self::Ass => to_ass(language, segments),
            Self::Json => to_json(language, segments),
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubtitleFormat {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "vtt" | "webvtt" => Ok(Self::Vtt),
            "ass" | "ssa" => Ok(Self::Ass),
            "json" => Ok(Self::Json),
            other => Err(SubtitleError::UnsupportedFormat(other.to_string())),
        }
    }
}

fn to_srt(segments: &[SubtitleSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        // Display renders the SRT block, blank separator included
        let _ = write!(out, "{}", segment);
    }
    out
}

fn to_vtt(language: &str, segments: &[SubtitleSegment]) -> String {
    let mut out = String::from("WEBVTT\nKind: captions\n");
    let _ = writeln!(out, "Language: {}", language);
    out.push('\n');

    for segment in segments {
        let _ = writeln!(out, "{}", segment.index);
        let _ = writeln!(
            out,
            "{} --> {}",
            SubtitleSegment::format_vtt_timestamp(segment.start_ms),
            SubtitleSegment::format_vtt_timestamp(segment.end_ms)
        );
        let _ = writeln!(out, "{}", escape_vtt(&segment.translated_text));
        out.push('\n');
    }
    out
}

/// "-->" and bare ampersands / angle brackets are not allowed in cue payloads
fn escape_vtt(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

const ASS_HEADER_STYLES: &str = "[V4+ Styles]\n\
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H80000000,0,0,0,0,100,100,0,0,1,2,1,2,10,10,10,1\n";

fn to_ass(language: &str, segments: &[SubtitleSegment]) -> String {
    let mut out = String::from("[Script Info]\n");
    let _ = writeln!(out, "Title: Subtitles ({})", language);
    out.push_str("ScriptType: v4.00+\nWrapStyle: 0\nPlayResX: 1920\nPlayResY: 1080\nScaledBorderAndShadow: yes\n\n");
    out.push_str(ASS_HEADER_STYLES);
    out.push('\n');
    out.push_str("[Events]\n");
    out.push_str("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n");

    for segment in segments {
        let _ = writeln!(
            out,
            "Dialogue: 0,{},{},Default,,0,0,0,,{}",
            SubtitleSegment::format_ass_timestamp(segment.start_ms),
            SubtitleSegment::format_ass_timestamp(segment.end_ms),
            escape_ass(&segment.translated_text)
        );
    }
    out
}

/// Braces open override blocks in ASS; newlines become \N
fn escape_ass(text: &str) -> String {
    text.replace('{', "(")
        .replace('}', ")")
        .replace("\r\n", "\n")
        .replace('\n', "\\N")
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    language: &'a str,
    segment_count: usize,
    segments: Vec<JsonSegment<'a>>,
}

#[derive(Serialize)]
struct JsonSegment<'a> {
    index: usize,
    start_time: String,
    end_time: String,
    start_ms: u64,
    end_ms: u64,
    original_text: &'a str,
    translated_text: &'a str,
    confidence: f32,
}

fn to_json(language: &str, segments: &[SubtitleSegment]) -> String {
    let document = JsonDocument {
        language,
        segment_count: segments.len(),
        segments: segments
            .iter()
            .map(|segment| JsonSegment {
                index: segment.index,
                start_time: segment.format_start_time(),
                end_time: segment.format_end_time(),
                start_ms: segment.start_ms,
                end_ms: segment.end_ms,
                original_text: &segment.original_text,
                translated_text: &segment.translated_text,
                confidence: segment.confidence,
            })
            .collect(),
    };
    // Plain data with string keys cannot fail to serialize
    serde_json::to_string_pretty(&document).unwrap_or_default()
}
