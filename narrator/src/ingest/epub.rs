// EPUB parsing and text extraction

use std::path::Path;

use html2text::render::text_renderer::TrivialDecorator;

use super::RawChunk;
use super::markup::{body_content, join_words};
use crate::error::{PipelineError, Result};

/// Extract one RawChunk per spine document, in reading order.
///
/// Documents with no text still produce an (empty) chunk so the chunk count
/// matches the document count.
pub fn extract_epub(path: &Path) -> Result<Vec<RawChunk>> {
    let mut doc = epub::doc::EpubDoc::new(path)
        .map_err(|e| PipelineError::extraction("EPUB", path, e))?;

    let title = doc
        .mdata("title")
        .map(|m| m.value.clone())
        .unwrap_or_else(|| "Unknown".to_string());
    let author = doc.mdata("creator").map(|m| m.value.clone());
    log::info!(
        "EPUB: \"{}\" by {}",
        title,
        author.as_deref().unwrap_or("Unknown")
    );

    let spine = doc.spine.clone();
    let mut chunks = Vec::with_capacity(spine.len());

    for spine_item in spine.iter() {
        let (content_bytes, _mime) = doc.get_resource(&spine_item.idref).ok_or_else(|| {
            PipelineError::extraction(
                "EPUB",
                path,
                format!("spine item '{}' is missing", spine_item.idref),
            )
        })?;
        let html = String::from_utf8_lossy(&content_bytes);

        chunks.push(RawChunk::new(chunks.len(), html_to_text(&html)));
    }

    log::info!("Extracted {} documents from EPUB", chunks.len());
    Ok(chunks)
}

/// Convert an XHTML document's body to whitespace-joined plain text.
///
/// html2text decodes entities itself, so its output is used as-is.
fn html_to_text(html: &str) -> String {
    let body = body_content(html);
    let text = html2text::from_read_with_decorator(body.as_bytes(), 10_000, TrivialDecorator::new());
    join_words(&text)
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Minimal EPUB 2 containers for tests.

    use std::io::Write;
    use std::path::{Path, PathBuf};

    use zip::write::SimpleFileOptions;

    /// Write an EPUB whose spine holds one XHTML document per body fragment.
    pub fn write_epub(dir: &Path, name: &str, bodies: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let file = std::fs::File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();

        zip.start_file("META-INF/container.xml", stored).unwrap();
        zip.write_all(
            br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
        )
        .unwrap();

        let mut manifest = String::new();
        let mut spine = String::new();
        let mut nav_points = String::new();
        for i in 0..bodies.len() {
            manifest.push_str(&format!(
                "<item id=\"doc{i}\" href=\"doc{i}.xhtml\" media-type=\"application/xhtml+xml\"/>\n"
            ));
            spine.push_str(&format!("<itemref idref=\"doc{i}\"/>\n"));
            nav_points.push_str(&format!(
                "<navPoint id=\"nav{i}\" playOrder=\"{}\"><navLabel><text>Part {i}</text></navLabel><content src=\"doc{i}.xhtml\"/></navPoint>\n",
                i + 1
            ));
        }

        zip.start_file("OEBPS/content.opf", stored).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="bookid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Test Book</dc:title>
    <dc:creator>Test Author</dc:creator>
    <dc:identifier id="bookid">urn:uuid:test-book</dc:identifier>
    <dc:language>en</dc:language>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
{manifest}  </manifest>
  <spine toc="ncx">
{spine}  </spine>
</package>"#
            )
            .as_bytes(),
        )
        .unwrap();

        zip.start_file("OEBPS/toc.ncx", stored).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head><meta name="dtb:uid" content="urn:uuid:test-book"/></head>
  <docTitle><text>Test Book</text></docTitle>
  <navMap>
{nav_points}  </navMap>
</ncx>"#
            )
            .as_bytes(),
        )
        .unwrap();

        for (i, body) in bodies.iter().enumerate() {
            zip.start_file(format!("OEBPS/doc{i}.xhtml"), stored).unwrap();
            zip.write_all(
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Document {i}</title></head>
<body>{body}</body>
</html>"#
                )
                .as_bytes(),
            )
            .unwrap();
        }

        zip.finish().unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_html_to_text_skips_head() {
        let html = "<html><head><title>Ignore me</title></head><body><h1>Chapter One</h1><p>It was <em>dark</em>.</p></body></html>";
        let text = html_to_text(html);
        assert!(text.starts_with("Chapter One"), "got: {text}");
        assert!(text.contains("It was dark"));
        assert!(!text.contains("Ignore me"));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_html_to_text_decodes_entities_once() {
        let html = "<body><p>Type &amp;lt;b&amp;gt; for bold &amp; italics.</p></body>";
        assert_eq!(html_to_text(html), "Type &lt;b&gt; for bold & italics.");
    }

    #[test]
    fn test_extract_epub_preserves_document_order() {
        let dir = TempDir::new().unwrap();
        let path = fixtures::write_epub(
            dir.path(),
            "ordered.epub",
            &[
                "<p>Copyright 2020 by Nobody.</p>",
                "<h1>Chapter 1</h1><p>First.</p>",
                "<h1>Chapter 2</h1><p>Second.</p>",
            ],
        );

        let chunks = extract_epub(&path).unwrap();

        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].text.contains("Copyright 2020"));
        assert!(chunks[1].text.starts_with("Chapter 1"));
        assert!(chunks[2].text.starts_with("Chapter 2"));
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }

    #[test]
    fn test_extract_epub_keeps_empty_documents() {
        let dir = TempDir::new().unwrap();
        let path = fixtures::write_epub(dir.path(), "blank.epub", &["", "<p>Only text.</p>"]);

        let chunks = extract_epub(&path).unwrap();
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.is_empty());
    }

    #[test]
    fn test_extract_malformed_epub() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.epub");
        std::fs::write(&path, b"this is not a zip archive").unwrap();

        assert!(matches!(
            extract_epub(&path),
            Err(PipelineError::Extraction { format: "EPUB", .. })
        ));
    }
}
