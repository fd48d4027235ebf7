use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;
use log::{warn, debug};
use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;
use crate::formats::SubtitleFormat;

// @module: Subtitle segments, timestamps, SRT parsing and line wrapping

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2,}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{2,}):(\d{2}):(\d{2})[,.](\d{3})").unwrap()
});

// @struct: Single subtitle display unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleSegment {
    // @field: Position in the file, 1-based
    pub index: usize,

    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Source transcript text
    pub original_text: String,

    // @field: Display text, already wrapped
    pub translated_text: String,

    // @field: Translation confidence in [0, 1]
    pub confidence: f32,
}

impl SubtitleSegment {
    pub fn new(
        index: usize,
        start_ms: u64,
        end_ms: u64,
        original_text: impl Into<String>,
        translated_text: impl Into<String>,
        confidence: f32,
    ) -> Self {
        SubtitleSegment {
            index,
            start_ms,
            end_ms: end_ms.max(start_ms),
            original_text: original_text.into(),
            translated_text: translated_text.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let (hours, minutes, seconds, millis) = split_ms(ms);
        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Format a timestamp in milliseconds to WebVTT format (HH:MM:SS.mmm)
    pub fn format_vtt_timestamp(ms: u64) -> String {
        let (hours, minutes, seconds, millis) = split_ms(ms);
        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    }

    /// Format a timestamp in milliseconds to ASS format (H:MM:SS.cc)
    pub fn format_ass_timestamp(ms: u64) -> String {
        let (hours, minutes, seconds, millis) = split_ms(ms);
        format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, millis / 10)
    }

    /// Parse an SRT or WebVTT timestamp to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, SubtitleError> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 {
            return Err(SubtitleError::Parse(format!("Invalid timestamp format: {}", timestamp)));
        }

        let component = |raw: &str, name: &str| -> Result<u64, SubtitleError> {
            raw.parse::<u64>()
                .map_err(|_| SubtitleError::Parse(format!("Invalid {} in timestamp: {}", name, timestamp)))
        };

        let hours = component(parts[0], "hours")?;
        let minutes = component(parts[1], "minutes")?;
        let seconds = component(parts[2], "seconds")?;
        let millis = component(parts[3], "milliseconds")?;

        // Validate time components
        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(SubtitleError::Parse(format!("Invalid time components in timestamp: {}", timestamp)));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }
}

fn split_ms(ms: u64) -> (u64, u64, u64, u64) {
    (ms / 3_600_000, (ms % 3_600_000) / 60_000, (ms % 60_000) / 1_000, ms % 1_000)
}

impl fmt::Display for SubtitleSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.translated_text)?;
        writeln!(f)
    }
}

/// A serialized subtitle document ready to be stored
#[derive(Debug, Clone, Serialize)]
pub struct SubtitleFile {
    pub language: String,
    pub format: SubtitleFormat,
    pub content: String,
    /// Content length in bytes
    pub size: usize,
    pub segment_count: usize,
}

impl SubtitleFile {
    /// Serialize segments into a file of the given format
    pub fn build(language: &str, format: SubtitleFormat, segments: &[SubtitleSegment]) -> Self {
        let content = format.serialize(language, segments);
        SubtitleFile {
            language: language.to_string(),
            format,
            size: content.len(),
            segment_count: segments.len(),
            content,
        }
    }
}

/// A cue read back from SRT content
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCue {
    pub index: usize,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

/// Parse SRT format string into cues, keeping file order
pub fn parse_srt(content: &str) -> Result<Vec<ParsedCue>, SubtitleError> {
    let mut cues = Vec::new();

    // State variables for parsing
    let mut current_index: Option<usize> = None;
    let mut current_times: Option<(u64, u64)> = None;
    let mut current_text = String::new();

    let mut flush = |index: Option<usize>, times: Option<(u64, u64)>, text: &mut String| {
        if let (Some(index), Some((start_ms, end_ms))) = (index, times) {
            if text.trim().is_empty() {
                warn!("Skipping empty subtitle cue {}", index);
            } else {
                cues.push(ParsedCue { index, start_ms, end_ms, text: text.trim().to_string() });
            }
        }
        text.clear();
    };

    for (line_number, line) in content.lines().enumerate() {
        let trimmed = line.trim_end_matches('\r');

        if trimmed.trim().is_empty() {
            if current_times.is_some() {
                flush(current_index.take(), current_times.take(), &mut current_text);
            }
            continue;
        }

        // Sequence number starts a new cue
        if current_index.is_none() {
            if let Ok(num) = trimmed.trim().parse::<usize>() {
                current_index = Some(num);
                continue;
            }
        }

        if current_index.is_some() && current_times.is_none() {
            if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                current_times = Some((captured_ms(&caps, 1)?, captured_ms(&caps, 5)?));
                continue;
            }
        }

        if current_times.is_some() {
            if !current_text.is_empty() {
                current_text.push('\n');
            }
            current_text.push_str(trimmed);
        } else {
            debug!("Ignoring stray line {} in SRT content: {}", line_number + 1, trimmed);
        }
    }

    flush(current_index, current_times, &mut current_text);

    if cues.is_empty() {
        return Err(SubtitleError::Parse("No valid subtitle cues were found in the SRT content".to_string()));
    }

    Ok(cues)
}

/// Parse timestamp captures to milliseconds
fn captured_ms(caps: &regex::Captures, start_idx: usize) -> Result<u64, SubtitleError> {
    let joined = format!(
        "{}:{}:{}.{}",
        &caps[start_idx],
        &caps[start_idx + 1],
        &caps[start_idx + 2],
        &caps[start_idx + 3]
    );
    SubtitleSegment::parse_timestamp(&joined)
}

/// Wrap text into at most `max_lines` lines of at most `max_line_length` characters.
///
/// Existing line breaks are treated as spaces. Words longer than a line are
/// hard-split. When the text needs more lines than allowed, the overflow is
/// appended to the last line, so no text is ever dropped.
pub fn wrap_text(text: &str, max_line_length: usize, max_lines: usize) -> Result<String, SubtitleError> {
    if max_line_length == 0 || max_lines == 0 {
        return Err(SubtitleError::InvalidWrap(format!(
            "max_line_length={} max_lines={}",
            max_line_length, max_lines
        )));
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        for piece in split_long_word(word, max_line_length) {
            let piece_len = piece.chars().count();
            if current_len > 0 && current_len + 1 + piece_len > max_line_length {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(&piece);
            current_len += piece_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        let overflow = lines.split_off(max_lines - 1).join(" ");
        lines.push(overflow);
    }

    Ok(lines.join("\n"))
}

fn split_long_word(word: &str, max_line_length: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() <= max_line_length {
        return vec![word.to_string()];
    }
    chars
        .chunks(max_line_length)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
