//! Markdown document writer
//!
//! Each converted page becomes one `.md` file in the output directory, headed
//! by its title and source URL.

use crate::markdown::MarkdownDocument;
use crate::output::{OutputError, OutputResult};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use url::Url;

/// Longest slug kept in a file name, in bytes
const MAX_SLUG_LEN: usize = 120;

/// Writes every document to `directory`, creating it if needed
///
/// # Arguments
///
/// * `documents` - The documents to write
/// * `directory` - Target directory
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Paths written, in document order
/// * `Err(OutputError)` - Failed to create the directory or a file
pub fn write_documents(
    documents: &[MarkdownDocument],
    directory: &Path,
) -> OutputResult<Vec<PathBuf>> {
    if directory.exists() && !directory.is_dir() {
        return Err(OutputError::Write(format!(
            "{} exists and is not a directory",
            directory.display()
        )));
    }
    fs::create_dir_all(directory)?;

    let mut used = HashSet::new();
    let mut written = Vec::with_capacity(documents.len());

    for document in documents {
        let base = document_file_stem(document.url.as_str());
        let mut stem = base.clone();
        let mut suffix = 2;
        while !used.insert(stem.clone()) {
            stem = format!("{}-{}", base, suffix);
            suffix += 1;
        }

        let path = directory.join(format!("{}.md", stem));
        let mut file = File::create(&path)?;
        file.write_all(format_document(document).as_bytes())?;

        tracing::debug!("Wrote {} to {}", document.url, path.display());
        written.push(path);
    }

    tracing::info!(
        "Wrote {} document(s) to {}",
        written.len(),
        directory.display()
    );
    Ok(written)
}

/// Formats a document with its title heading and source line
pub fn format_document(document: &MarkdownDocument) -> String {
    let heading = if document.title.trim().is_empty() {
        document.url.as_str()
    } else {
        document.title.trim()
    };

    format!(
        "# {}\n\nSource: {}\n\n{}\n",
        heading,
        document.url,
        document.markdown.trim_end()
    )
}

/// File name (without extension) for a page: `<host>_<path-slug>`
///
/// The root page gets the slug `index`.
pub fn document_file_stem(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return slugify(url);
    };

    let mut host = parsed.host_str().unwrap_or("page").to_string();
    if let Some(port) = parsed.port() {
        host = format!("{}-{}", host, port);
    }

    let mut rest = parsed.path().trim_matches('/').to_string();
    if let Some(query) = parsed.query() {
        rest.push('-');
        rest.push_str(query);
    }

    let slug = slugify(&rest);
    let slug = if slug.is_empty() { "index".to_string() } else { slug };

    format!("{}_{}", slugify(&host), slug)
}

/// Lowercases and replaces every run of non-alphanumeric characters with `-`
fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() || c == '.' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }

        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::normalize;
    use tempfile::TempDir;

    fn document(url: &str, title: &str, markdown: &str) -> MarkdownDocument {
        MarkdownDocument {
            url: normalize(url),
            title: title.to_string(),
            markdown: markdown.to_string(),
        }
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(document_file_stem("https://example.com"), "example.com_index");
        assert_eq!(
            document_file_stem("https://example.com/docs/Getting_Started"),
            "example.com_docs-getting-started"
        );
        assert_eq!(
            document_file_stem("http://127.0.0.1:8080/a?page=2"),
            "127.0.0.1-8080_a-page-2"
        );
    }

    #[test]
    fn test_format_document() {
        let doc = document("https://example.com/x", "Title", "Body\n\n");
        assert_eq!(
            format_document(&doc),
            "# Title\n\nSource: https://example.com/x\n\nBody\n"
        );
    }

    #[test]
    fn test_format_document_without_title() {
        let doc = document("https://example.com/x", "  ", "Body");
        assert!(format_document(&doc).starts_with("# https://example.com/x\n"));
    }

    #[test]
    fn test_write_documents() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("out");
        let docs = vec![
            document("https://example.com/", "Home", "Welcome"),
            document("https://example.com/about", "About", "Us"),
        ];

        let paths = write_documents(&docs, &out).unwrap();

        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], out.join("example.com_index.md"));
        let content = std::fs::read_to_string(&paths[1]).unwrap();
        assert!(content.starts_with("# About\n"));
        assert!(content.contains("Us"));
    }

    #[test]
    fn test_target_must_be_a_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("taken");
        std::fs::write(&file, "x").unwrap();

        let err = write_documents(&[], &file).unwrap_err();
        assert!(matches!(err, OutputError::Write(_)));
    }

    #[test]
    fn test_colliding_names_get_suffix() {
        let dir = TempDir::new().unwrap();
        let docs = vec![
            document("https://example.com/a-b", "One", "1"),
            document("https://example.com/a_b", "Two", "2"),
        ];

        let paths = write_documents(&docs, dir.path()).unwrap();

        assert_eq!(paths[0], dir.path().join("example.com_a-b.md"));
        assert_eq!(paths[1], dir.path().join("example.com_a-b-2.md"));
    }
}
