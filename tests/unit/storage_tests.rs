/*!
 * Tests for subtitle file storage
 */

use tempfile::TempDir;

use vidscribe::errors::StorageError;
use vidscribe::formats::SubtitleFormat;
use vidscribe::storage::{file_id, SubtitleStorage, DOWNLOAD_PATH};
use vidscribe::subtitle_processor::{SubtitleFile, SubtitleSegment};

fn file(language: &str, format: SubtitleFormat) -> SubtitleFile {
    let segments = vec![SubtitleSegment::new(1, 0, 1_000, "Hello", format!("[{}] Hello", language), 0.9)];
    SubtitleFile::build(language, format, &segments)
}

#[tokio::test]
async fn test_save_shouldWriteFileAndBuildDownloadUrl() {
    let dir = TempDir::new().unwrap();
    let storage = SubtitleStorage::new(dir.path(), "http://subs.test/");

    let stored = storage.save("abc123", &file("es", SubtitleFormat::Srt)).await.unwrap();

    assert_eq!(stored.file_id, file_id("abc123", "es", SubtitleFormat::Srt));
    assert_eq!(
        stored.download_url,
        format!("http://subs.test{}/{}", DOWNLOAD_PATH, stored.file_id)
    );
    assert!(stored.path.starts_with(dir.path()));
    assert!(stored.path.ends_with(format!("abc123/{}.srt", stored.file_id)));
    let on_disk = std::fs::read_to_string(&stored.path).unwrap();
    assert!(on_disk.contains("[es] Hello"));
    assert_eq!(stored.size, on_disk.len());
}

#[tokio::test]
async fn test_load_shouldReturnStoredContent() {
    let dir = TempDir::new().unwrap();
    let storage = SubtitleStorage::new(dir.path(), "http://subs.test");
    let stored = storage.save("abc123", &file("fr", SubtitleFormat::Vtt)).await.unwrap();

    let (meta, content) = storage.load(&stored.file_id).await.unwrap();
    assert_eq!(meta, stored);
    assert!(content.starts_with("WEBVTT"));
}

#[tokio::test]
async fn test_load_withUnknownId_shouldBeNotFound() {
    let dir = TempDir::new().unwrap();
    let storage = SubtitleStorage::new(dir.path(), "http://subs.test");
    assert!(matches!(storage.load("nope").await, Err(StorageError::NotFound(_))));
}

#[tokio::test]
async fn test_load_withDeletedFile_shouldBeNotFound() {
    let dir = TempDir::new().unwrap();
    let storage = SubtitleStorage::new(dir.path(), "http://subs.test");
    let stored = storage.save("abc123", &file("de", SubtitleFormat::Ass)).await.unwrap();
    std::fs::remove_file(&stored.path).unwrap();

    assert!(matches!(storage.load(&stored.file_id).await, Err(StorageError::NotFound(_))));
}

#[tokio::test]
async fn test_list_shouldFilterByVideoAndSort() {
    let dir = TempDir::new().unwrap();
    let storage = SubtitleStorage::new(dir.path(), "http://subs.test");
    storage.save("abc123", &file("fr", SubtitleFormat::Srt)).await.unwrap();
    storage.save("abc123", &file("es", SubtitleFormat::Vtt)).await.unwrap();
    storage.save("abc123", &file("es", SubtitleFormat::Json)).await.unwrap();
    storage.save("other", &file("es", SubtitleFormat::Srt)).await.unwrap();

    let listed: Vec<(String, SubtitleFormat)> = storage
        .list("abc123")
        .into_iter()
        .map(|s| (s.language, s.format))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("es".to_string(), SubtitleFormat::Json),
            ("es".to_string(), SubtitleFormat::Vtt),
            ("fr".to_string(), SubtitleFormat::Srt),
        ]
    );
    assert!(storage.list("unknown").is_empty());
}

#[tokio::test]
async fn test_save_twice_shouldReplaceEntry() {
    let dir = TempDir::new().unwrap();
    let storage = SubtitleStorage::new(dir.path(), "http://subs.test");
    storage.save("abc123", &file("es", SubtitleFormat::Srt)).await.unwrap();
    storage.save("abc123", &file("es", SubtitleFormat::Srt)).await.unwrap();

    assert_eq!(storage.list("abc123").len(), 1);
}

#[tokio::test]
async fn test_save_withPathCharactersInVideoId_shouldStayInsideRoot() {
    let dir = TempDir::new().unwrap();
    let storage = SubtitleStorage::new(dir.path(), "http://subs.test");
    let stored = storage.save("../../etc", &file("es", SubtitleFormat::Srt)).await.unwrap();

    assert!(stored.path.starts_with(dir.path()));
    assert_eq!(stored.video_id, "../../etc");
}

#[tokio::test]
async fn test_save_videoIdsSanitizedAlike_shouldKeepSeparateContent() {
    let dir = TempDir::new().unwrap();
    let storage = SubtitleStorage::new(dir.path(), "http://subs.test");
    let first = vec![SubtitleSegment::new(1, 0, 1_000, "A", "from video a.b", 1.0)];
    let second = vec![SubtitleSegment::new(1, 0, 1_000, "B", "from video a_b", 1.0)];

    let dotted = storage.save("a.b", &SubtitleFile::build("en", SubtitleFormat::Srt, &first)).await.unwrap();
    let underscored = storage.save("a_b", &SubtitleFile::build("en", SubtitleFormat::Srt, &second)).await.unwrap();
    assert_ne!(dotted.path, underscored.path);

    let (_, content) = storage.load(&dotted.file_id).await.unwrap();
    assert!(content.contains("from video a.b"));
    let (_, content) = storage.load(&underscored.file_id).await.unwrap();
    assert!(content.contains("from video a_b"));
}
