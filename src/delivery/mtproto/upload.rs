//! Chunked file upload over MTProto.
//!
//! Files up to 10 MiB go through `upload.saveFilePart` and are referenced with
//! an MD5 checksum; larger ones use `upload.saveBigFilePart` with up to
//! [`UPLOAD_WORKERS`] parts in flight. Every part except the last is exactly
//! [`PART_SIZE`] bytes.

use async_trait::async_trait;
use grammers_client::Client;
use grammers_tl_types as tl;
use md5::{Digest, Md5};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio::task::JoinSet;

use super::error::MtProtoError;

pub const PART_SIZE: usize = 512 * 1024;
pub const BIG_FILE_THRESHOLD: u64 = 10 * 1024 * 1024;
const MAX_PARTS: u64 = 4000;
/// Concurrent `saveBigFilePart` calls per file
pub const UPLOAD_WORKERS: usize = 4;

/// Handle to a file whose parts are already on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadedFile {
    Small {
        id: i64,
        parts: i32,
        name: String,
        md5_checksum: String,
    },
    Big {
        id: i64,
        parts: i32,
        name: String,
    },
}

impl UploadedFile {
    pub fn into_input_file(self) -> tl::enums::InputFile {
        match self {
            UploadedFile::Small {
                id,
                parts,
                name,
                md5_checksum,
            } => tl::enums::InputFile::File(tl::types::InputFile {
                id,
                parts,
                name,
                md5_checksum,
            }),
            UploadedFile::Big { id, parts, name } => {
                tl::enums::InputFile::Big(tl::types::InputFileBig { id, parts, name })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPlan {
    pub big: bool,
    pub total_parts: i32,
}

/// Decides the part count and upload kind for a file of `size` bytes.
pub fn plan_upload(size: u64) -> Result<UploadPlan, MtProtoError> {
    if size == 0 {
        return Err(MtProtoError::EmptyFile(String::new()));
    }
    let parts = size.div_ceil(PART_SIZE as u64);
    if parts > MAX_PARTS {
        return Err(MtProtoError::FileTooLarge(size));
    }
    Ok(UploadPlan {
        big: size > BIG_FILE_THRESHOLD,
        // bounded by MAX_PARTS above
        total_parts: parts as i32,
    })
}

/// Destination for file parts.
#[async_trait]
pub trait PartSink: Send + Sync {
    async fn save_part(&self, file_id: i64, part: i32, plan: UploadPlan, bytes: Vec<u8>) -> Result<(), MtProtoError>;
}

#[async_trait]
impl PartSink for Client {
    async fn save_part(&self, file_id: i64, part: i32, plan: UploadPlan, bytes: Vec<u8>) -> Result<(), MtProtoError> {
        let accepted = if plan.big {
            self.invoke(&tl::functions::upload::SaveBigFilePart {
                file_id,
                file_part: part,
                file_total_parts: plan.total_parts,
                bytes,
            })
            .await?
        } else {
            self.invoke(&tl::functions::upload::SaveFilePart {
                file_id,
                file_part: part,
                bytes,
            })
            .await?
        };
        if accepted {
            Ok(())
        } else {
            Err(MtProtoError::PartRejected(part))
        }
    }
}

/// Uploads `path` part by part and returns the handle to reference it with.
pub async fn upload_file<S>(sink: &S, path: &Path) -> Result<UploadedFile, MtProtoError>
where
    S: PartSink + Clone + 'static,
{
    let mut file = tokio::fs::File::open(path).await?;
    let size = file.metadata().await?.len();
    let plan = plan_upload(size).map_err(|e| match e {
        MtProtoError::EmptyFile(_) => MtProtoError::EmptyFile(path.display().to_string()),
        other => other,
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let file_id: i64 = rand::random();

    log::info!(
        "Uploading {} ({} bytes, {} parts, {})",
        name,
        size,
        plan.total_parts,
        if plan.big { "big" } else { "small" }
    );

    if plan.big {
        upload_big_parts(sink, &mut file, file_id, plan).await?;
        return Ok(UploadedFile::Big {
            id: file_id,
            parts: plan.total_parts,
            name,
        });
    }

    let mut hasher = Md5::new();
    for part in 0..plan.total_parts {
        let chunk = read_chunk(&mut file).await?;
        hasher.update(&chunk);
        sink.save_part(file_id, part, plan, chunk).await?;
    }

    Ok(UploadedFile::Small {
        id: file_id,
        parts: plan.total_parts,
        name,
        md5_checksum: format!("{:x}", hasher.finalize()),
    })
}

/// Sends big-file parts through a pool of [`UPLOAD_WORKERS`] tasks.
///
/// Parts are read in order; a new one is read only once a slot frees up, so
/// at most `UPLOAD_WORKERS` chunks are held in memory. The first failure
/// drops the set, which aborts the remaining workers.
async fn upload_big_parts<S>(
    sink: &S,
    file: &mut tokio::fs::File,
    file_id: i64,
    plan: UploadPlan,
) -> Result<(), MtProtoError>
where
    S: PartSink + Clone + 'static,
{
    let mut workers: JoinSet<Result<(), MtProtoError>> = JoinSet::new();
    for part in 0..plan.total_parts {
        if workers.len() >= UPLOAD_WORKERS {
            join_next_part(&mut workers).await?;
        }
        let chunk = read_chunk(file).await?;
        let sink = sink.clone();
        workers.spawn(async move { sink.save_part(file_id, part, plan, chunk).await });
    }
    while !workers.is_empty() {
        join_next_part(&mut workers).await?;
    }
    Ok(())
}

async fn join_next_part(workers: &mut JoinSet<Result<(), MtProtoError>>) -> Result<(), MtProtoError> {
    match workers.join_next().await {
        Some(result) => result?,
        None => Ok(()),
    }
}

/// Reads up to [`PART_SIZE`] bytes, stopping short only at end of file.
async fn read_chunk(file: &mut tokio::fs::File) -> Result<Vec<u8>, MtProtoError> {
    let mut buf = vec![0u8; PART_SIZE];
    let mut filled = 0;
    while filled < PART_SIZE {
        let n = file.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buf.truncate(filled);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct RecordingSink {
        parts: Arc<Mutex<Vec<(i64, i32, UploadPlan, usize)>>>,
    }

    /// Holds every part for a moment and tracks how many overlap
    #[derive(Clone, Default)]
    struct SlowSink {
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
        done: Arc<Mutex<Vec<i32>>>,
        reject: Option<i32>,
    }

    #[async_trait]
    impl PartSink for SlowSink {
        async fn save_part(&self, _file_id: i64, part: i32, _plan: UploadPlan, _bytes: Vec<u8>) -> Result<(), MtProtoError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.reject == Some(part) {
                return Err(MtProtoError::PartRejected(part));
            }
            self.done.lock().unwrap().push(part);
            Ok(())
        }
    }

    fn sparse_file(dir: &tempfile::TempDir, size: u64) -> std::path::PathBuf {
        let path = dir.path().join("mix.mp3");
        std::fs::File::create(&path).unwrap().set_len(size).unwrap();
        path
    }

    #[async_trait]
    impl PartSink for RecordingSink {
        async fn save_part(&self, file_id: i64, part: i32, plan: UploadPlan, bytes: Vec<u8>) -> Result<(), MtProtoError> {
            self.parts.lock().unwrap().push((file_id, part, plan, bytes.len()));
            Ok(())
        }
    }

    #[test]
    fn test_plan_upload_threshold() {
        assert_eq!(
            plan_upload(1).unwrap(),
            UploadPlan {
                big: false,
                total_parts: 1
            }
        );
        assert_eq!(
            plan_upload(BIG_FILE_THRESHOLD).unwrap(),
            UploadPlan {
                big: false,
                total_parts: 20
            }
        );
        assert_eq!(
            plan_upload(BIG_FILE_THRESHOLD + 1).unwrap(),
            UploadPlan {
                big: true,
                total_parts: 21
            }
        );
        assert!(matches!(plan_upload(0), Err(MtProtoError::EmptyFile(_))));
        assert!(matches!(
            plan_upload(MAX_PARTS * PART_SIZE as u64 + 1),
            Err(MtProtoError::FileTooLarge(_))
        ));
    }

    #[tokio::test]
    async fn test_small_upload_carries_md5() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cover.jpg");
        let content: Vec<u8> = (0..PART_SIZE + 100).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &content).unwrap();

        let sink = RecordingSink::default();
        let handle = upload_file(&sink, &path).await.unwrap();

        let expected_md5 = format!("{:x}", Md5::digest(&content));
        match handle {
            UploadedFile::Small {
                parts,
                name,
                md5_checksum,
                ..
            } => {
                assert_eq!(parts, 2);
                assert_eq!(name, "cover.jpg");
                assert_eq!(md5_checksum, expected_md5);
            }
            other => panic!("expected small handle, got {:?}", other),
        }

        let recorded = sink.parts.lock().unwrap();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].3, PART_SIZE);
        assert_eq!(recorded[1].3, 100);
        assert_eq!(recorded[0].0, recorded[1].0);
    }

    #[tokio::test]
    async fn test_big_upload_uses_big_handle() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("song.mp3");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(BIG_FILE_THRESHOLD + 1).unwrap();

        let sink = RecordingSink::default();
        let handle = upload_file(&sink, &path).await.unwrap();
        assert!(matches!(handle, UploadedFile::Big { parts: 21, .. }));

        let recorded = sink.parts.lock().unwrap();
        assert_eq!(recorded.len(), 21);
        assert!(recorded.iter().all(|(_, _, plan, _)| plan.big));
        let last = recorded.iter().find(|(_, part, _, _)| *part == 20).unwrap();
        assert_eq!(last.3, 1);

        let input = handle.clone().into_input_file();
        assert!(matches!(input, tl::enums::InputFile::Big(_)));
    }

    #[tokio::test]
    async fn test_empty_file_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("empty.jpg");
        std::fs::write(&path, b"").unwrap();

        let sink = RecordingSink::default();
        let err = upload_file(&sink, &path).await.unwrap_err();
        assert!(err.to_string().contains("empty.jpg"));
        assert!(sink.parts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_big_parts_upload_concurrently_within_pool() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = sparse_file(&dir, BIG_FILE_THRESHOLD + 1);

        let sink = SlowSink::default();
        let handle = upload_file(&sink, &path).await.unwrap();
        assert!(matches!(handle, UploadedFile::Big { parts: 21, .. }));

        let peak = sink.peak.load(Ordering::SeqCst);
        assert!(peak > 1, "parts were sent one at a time");
        assert!(peak <= UPLOAD_WORKERS, "{} parts in flight", peak);

        let mut done = sink.done.lock().unwrap().clone();
        done.sort_unstable();
        assert_eq!(done, (0..21).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_big_part_rejection_fails_upload() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = sparse_file(&dir, BIG_FILE_THRESHOLD + 1);

        let sink = SlowSink {
            reject: Some(5),
            ..SlowSink::default()
        };
        let err = upload_file(&sink, &path).await.unwrap_err();
        assert!(matches!(err, MtProtoError::PartRejected(5)));
    }
}
