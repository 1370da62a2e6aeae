//! Room snapshot pipeline: fetch a room, render its canvas to SVG, persist
//! the file, and serve what was persisted.
//!
//! Snapshots are regenerated on every request and written to
//! `<snapshot_dir>/<room id>.svg`, replacing any previous file. Each write
//! goes to a uniquely named temporary file that is then renamed into place,
//! so concurrent requests for the same room never leave a torn file: the
//! last rename wins. The response body is read back from the renamed file.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::{ApiClient, BackendError};
use crate::error::SketchError;
use crate::render::MarkupRenderer;

/// XML declaration and SVG 1.1 doctype prepended to every snapshot.
pub const SVG_PREAMBLE: &str = concat!(
    r#"<?xml version="1.0" standalone="no"?>"#,
    r#"<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">"#,
);

/// Content type of snapshot responses.
pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Durable storage for snapshot files.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Store writing into `dir` (created on first write).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory snapshots are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final path of the snapshot for room `id`.
    pub fn path_for(&self, id: u64) -> PathBuf {
        self.dir.join(format!("{id}.svg"))
    }

    /// Replace the snapshot for room `id` with `bytes` and return the
    /// contents read back from disk.
    pub async fn persist(&self, id: u64, bytes: &[u8]) -> Result<Vec<u8>, SketchError> {
        let path = self.path_for(id);
        let persist_err = |source| SketchError::Persist {
            path: path.display().to_string(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(persist_err)?;

        let tmp = self.dir.join(format!(
            ".{id}.svg.{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(e) = tokio::fs::write(&tmp, bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(persist_err(e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(persist_err(e));
        }

        tokio::fs::read(&path).await.map_err(persist_err)
    }
}

/// Render, persist and return the snapshot of room `id`.
pub async fn render_snapshot(
    api: &ApiClient,
    renderer: &dyn MarkupRenderer,
    store: &SnapshotStore,
    id: u64,
) -> Result<Vec<u8>, SketchError> {
    let room = api.fetch_room(id).await.map_err(|e| match e {
        BackendError::NotFound { .. } => SketchError::RoomNotFound(id),
        other => SketchError::UpstreamFetch(other),
    })?;

    let svg = renderer.render_canvas(room.canvas_width, room.canvas_height, &room.strokes);

    let mut data = String::with_capacity(SVG_PREAMBLE.len() + svg.len());
    data.push_str(SVG_PREAMBLE);
    data.push_str(&svg);

    let written = store.persist(id, data.as_bytes()).await?;

    tracing::info!(
        room_id = id,
        strokes = room.strokes.len(),
        bytes = written.len(),
        path = %store.path_for(id).display(),
        "snapshot written"
    );

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn persist_writes_and_reads_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("img"));

        let body = store.persist(3, b"<svg/>").await.unwrap();
        assert_eq!(body, b"<svg/>");
        assert_eq!(std::fs::read(store.path_for(3)).unwrap(), b"<svg/>");
    }

    #[tokio::test]
    async fn persist_overwrites_previous_snapshot() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());

        store.persist(1, b"old old old").await.unwrap();
        let body = store.persist(1, b"new").await.unwrap();
        assert_eq!(body, b"new");
        assert_eq!(std::fs::read(store.path_for(1)).unwrap(), b"new");
    }

    #[tokio::test]
    async fn persist_leaves_no_temporary_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());

        store.persist(9, b"a").await.unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["9.svg".to_string()]);
    }

    #[tokio::test]
    async fn persist_failure_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        // A regular file where the snapshot directory should be.
        let blocker = dir.path().join("img");
        std::fs::write(&blocker, b"").unwrap();

        let store = SnapshotStore::new(&blocker);
        let err = store.persist(1, b"x").await.unwrap_err();
        assert!(matches!(err, SketchError::Persist { .. }));
    }

    #[test]
    fn preamble_is_xml_then_doctype() {
        assert!(SVG_PREAMBLE.starts_with("<?xml version=\"1.0\" standalone=\"no\"?>"));
        assert!(SVG_PREAMBLE.ends_with("svg11.dtd\">"));
    }
}
