/*!
 * Tests for subtitle generation
 */

use std::sync::Arc;
use std::time::Duration;

use vidscribe::errors::{GenerationError, SubtitleError};
use vidscribe::formats::SubtitleFormat;
use vidscribe::generator::{GenerationRequest, SubtitleGenerator, DEFAULT_CONFIDENCE};
use vidscribe::providers::mock::MockTranslator;
use vidscribe::subtitle_processor::parse_srt;
use vidscribe::transcript::TranscriptSegment;

use crate::common::sample_transcript;

fn generator(translator: MockTranslator, concurrency: usize) -> SubtitleGenerator {
    SubtitleGenerator::new(
        Arc::new(translator),
        concurrency,
        vec!["en".to_string(), "es".to_string(), "fr".to_string(), "de".to_string()],
    )
}

fn request(target: &str) -> GenerationRequest {
    GenerationRequest {
        video_id: "video-1".to_string(),
        source_language: "en".to_string(),
        target_language: target.to_string(),
        format: SubtitleFormat::Srt,
        max_line_length: 42,
        max_lines: 2,
    }
}

#[tokio::test]
async fn test_generate_withWorkingTranslator_shouldTranslateEverySegment() {
    let mock = MockTranslator::working();
    let result = generator(mock.clone(), 2)
        .generate(&sample_transcript(), &request("es"))
        .await
        .unwrap();

    assert_eq!(result.segment_count, 3);
    assert_eq!(result.language, "es");
    assert_eq!(result.segments[0].translated_text, "[es] Welcome back to the channel");
    assert_eq!(result.segments[0].original_text, "Welcome back to the channel");
    assert_eq!(result.segments[0].index, 1);
    assert_eq!(result.segments[1].start_ms, 2_500);
    assert_eq!(result.segments[1].end_ms, 5_500);
    assert!((result.average_confidence - 0.75).abs() < 1e-6);
    assert_eq!(mock.request_count(), 3);
}

#[tokio::test]
async fn test_generate_withSameLanguage_shouldCopyTextWithFullConfidence() {
    let mock = MockTranslator::failing();
    let result = generator(mock.clone(), 4)
        .generate(&sample_transcript(), &request("en"))
        .await
        .unwrap();

    assert_eq!(mock.request_count(), 0);
    assert_eq!(result.segments[2].translated_text, "Let's get started");
    assert!(result.segments.iter().all(|s| s.confidence == 1.0));
    assert_eq!(result.average_confidence, 1.0);
}

#[tokio::test]
async fn test_generate_withIsoAliasOfSource_shouldCopy() {
    let mut req = request("en");
    req.source_language = "eng".to_string();
    let mock = MockTranslator::working();
    generator(mock.clone(), 1)
        .generate(&sample_transcript(), &req)
        .await
        .unwrap();
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_generate_withoutProviderConfidence_shouldUseDefault() {
    let result = generator(MockTranslator::no_confidence(), 4)
        .generate(&sample_transcript(), &request("fr"))
        .await
        .unwrap();
    assert!(result.segments.iter().all(|s| s.confidence == DEFAULT_CONFIDENCE));
}

#[tokio::test]
async fn test_generate_withOutOfOrderCompletion_shouldKeepTranscriptOrder() {
    // Shorter texts sleep longer, so completions arrive in reverse
    let transcript: Vec<TranscriptSegment> = (0..8)
        .map(|i| TranscriptSegment::new(i, i as f64, 1.0, "x".repeat(i + 1)))
        .collect();
    let translator = MockTranslator::working().with_inverse_delay(Duration::from_millis(1));

    let result = generator(translator, 8)
        .generate(&transcript, &request("de"))
        .await
        .unwrap();

    for (position, segment) in result.segments.iter().enumerate() {
        assert_eq!(segment.index, position + 1);
        assert_eq!(segment.original_text, "x".repeat(position + 1));
        assert_eq!(segment.start_ms, position as u64 * 1000);
    }
}

#[tokio::test]
async fn test_generate_shouldWrapTranslatedText() {
    let transcript = vec![TranscriptSegment::new(
        0,
        0.0,
        4.0,
        "this sentence is definitely longer than a single subtitle line allows",
    )];
    let mut req = request("es");
    req.max_line_length = 20;
    req.max_lines = 2;

    let result = generator(MockTranslator::working(), 1)
        .generate(&transcript, &req)
        .await
        .unwrap();
    let lines: Vec<&str> = result.segments[0].translated_text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].chars().count() <= 20);
    assert!(lines[1].ends_with("allows"));
}

#[tokio::test]
async fn test_generate_withEmptyTranscript_shouldFail() {
    let err = generator(MockTranslator::working(), 1)
        .generate(&[], &request("es"))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Invalid(SubtitleError::EmptyTranscript(_))));
}

#[tokio::test]
async fn test_generate_withUnsupportedLanguage_shouldFail() {
    let mock = MockTranslator::working();
    let err = generator(mock.clone(), 1)
        .generate(&sample_transcript(), &request("ja"))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Invalid(SubtitleError::UnsupportedLanguage(_))));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_generate_withDecreasingStartTimes_shouldFail() {
    let transcript = vec![
        TranscriptSegment::new(0, 5.0, 1.0, "later"),
        TranscriptSegment::new(1, 1.0, 1.0, "earlier"),
    ];
    let err = generator(MockTranslator::working(), 1)
        .generate(&transcript, &request("es"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GenerationError::Invalid(SubtitleError::UnorderedSegments { index: 1 })
    ));
}

#[tokio::test]
async fn test_generate_withFailingSegment_shouldAbort() {
    let err = generator(MockTranslator::fail_on("Let's get started"), 2)
        .generate(&sample_transcript(), &request("fr"))
        .await
        .unwrap_err();
    match err {
        GenerationError::Translation { index, .. } => assert_eq!(index, 3),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_generate_insideSpawnedTask_shouldComplete() {
    let translator = MockTranslator::working().with_inverse_delay(Duration::from_millis(1));
    let generator = Arc::new(generator(translator, 3));
    let handle = tokio::spawn(async move {
        let transcript = sample_transcript();
        generator.generate(&transcript, &request("fr")).await
    });

    let result = handle.await.unwrap().unwrap();
    assert_eq!(result.segment_count, 3);
    assert_eq!(result.segments[2].translated_text, "[fr] Let's get started");
}

#[tokio::test]
async fn test_generate_withBlankSegment_shouldFailBeforeTranslating() {
    let transcript = vec![
        TranscriptSegment::new(0, 0.0, 1.0, "Hello"),
        TranscriptSegment::new(1, 1.0, 1.0, "   "),
        TranscriptSegment::new(2, 2.0, 1.0, "World"),
    ];
    let mock = MockTranslator::working();
    let err = generator(mock.clone(), 2)
        .generate(&transcript, &request("en"))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Invalid(SubtitleError::BlankSegment { index: 1 })));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_generate_thenSerializeSrt_shouldParseBackEveryCue() {
    let result = generator(MockTranslator::working(), 2)
        .generate(&sample_transcript(), &request("en"))
        .await
        .unwrap();

    let content = SubtitleFormat::Srt.serialize("en", &result.segments);
    let cues = parse_srt(&content).unwrap();
    assert_eq!(cues.len(), result.segment_count);
    assert_eq!(cues[1].text, "Today we are looking at subtitles");
}
