use std::path::Path;

use tracing::{info, warn};

use seedsmith_generate::{DocumentTextSink, InsertionAnchor, apply_anchor};

use super::atomic::write_bytes_atomic;

/// Sink that edits documents on disk; the document name is a file path.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileTextSink;

impl DocumentTextSink for FileTextSink {
    fn insert(&mut self, document: &str, text: &str, anchor: &InsertionAnchor) -> bool {
        let path = Path::new(document);
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                warn!(document, error = %err, "document could not be read");
                return false;
            }
        };

        let Some(edited) = apply_anchor(&source, text, anchor) else {
            warn!(document, ?anchor, "insertion point not found");
            return false;
        };

        match write_bytes_atomic(path, edited.as_bytes()) {
            Ok(()) => {
                info!(document, bytes = text.len(), "generated text inserted");
                true
            }
            Err(err) => {
                warn!(document, error = %err, "document could not be written");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_the_file_in_place() {
        let dir = std::env::temp_dir().join(format!("seedsmith-documents-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("Seeds.cs");
        std::fs::write(&path, "public static class Seeds\n{\n}\n").expect("write document");
        let document = path.to_string_lossy().to_string();

        let mut sink = FileTextSink;
        let anchor = InsertionAnchor::EndOfTypeBody("Seeds".to_string());
        assert!(sink.insert(&document, "// generated", &anchor));
        let edited = std::fs::read_to_string(&path).expect("read document");
        assert_eq!(edited, "public static class Seeds\n{\n    // generated\n}\n");

        let missing = InsertionAnchor::EndOfTypeBody("Other".to_string());
        assert!(!sink.insert(&document, "// generated", &missing));
        assert!(!sink.insert("does/not/exist.cs", "x", &InsertionAnchor::EndOfDocument));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
