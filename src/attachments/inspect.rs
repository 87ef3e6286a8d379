use crate::attachments::policy::PolicyRequest;
use crate::error::FileError;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Number of leading bytes considered when sniffing the content type
pub const SNIFF_LEN: usize = 512;

/// Facts about a local file about to be attached, plus its full content.
///
/// The whole file is held in memory; there is no streaming path, so very
/// large attachments cost their full size in RAM.
#[derive(Debug)]
pub struct FileMetadata {
    pub content_type: String,
    pub name: String,
    pub size: u64,
    pub content: Vec<u8>,
}

impl FileMetadata {
    pub fn policy_request(&self) -> PolicyRequest {
        PolicyRequest {
            content_type: self.content_type.clone(),
            name: self.name.clone(),
            size: self.size,
        }
    }
}

/// Reads `path` fully and derives its content type, base name and size.
pub async fn inspect(path: impl AsRef<Path>) -> Result<FileMetadata, FileError> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| FileError::NoFileName {
            path: path.to_path_buf(),
        })?;

    let content = read_regular_file(path).await?;

    Ok(FileMetadata {
        content_type: detect_content_type(&content),
        name,
        size: content.len() as u64,
        content,
    })
}

async fn read_regular_file(path: &Path) -> Result<Vec<u8>, FileError> {
    let read_err = |source| FileError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).await.map_err(|source| FileError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let meta = file.metadata().await.map_err(read_err)?;
    if !meta.is_file() {
        return Err(FileError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let mut content = Vec::with_capacity(meta.len() as usize);
    file.read_to_end(&mut content).await.map_err(read_err)?;
    Ok(content)
}

/// Tags recognised as HTML when followed by a space or `>`, compared case-insensitively
const HTML_SIGNATURES: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

/// Sniffs the MIME type from the payload, ignoring any file extension.
///
/// Markup and byte-order marks are checked first, then known binary
/// signatures; anything else is UTF-8 text unless the sniffed window
/// contains binary control bytes.
pub fn detect_content_type(content: &[u8]) -> String {
    let head = &content[..content.len().min(SNIFF_LEN)];

    if let Some(kind) = sniff_markup(head).or_else(|| sniff_bom(head)) {
        return kind.to_string();
    }

    if let Some(kind) = infer::get(head) {
        return kind.mime_type().to_string();
    }

    if head.iter().copied().any(is_binary_byte) {
        mime::APPLICATION_OCTET_STREAM.to_string()
    } else {
        mime::TEXT_PLAIN_UTF_8.to_string()
    }
}

fn sniff_markup(head: &[u8]) -> Option<&'static str> {
    let start = head
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | 0x0C | b'\r' | b' '))
        .unwrap_or(head.len());
    let data = &head[start..];

    let is_html = HTML_SIGNATURES.iter().any(|sig| {
        data.len() > sig.len()
            && data[..sig.len()].eq_ignore_ascii_case(sig)
            && matches!(data[sig.len()], b' ' | b'>')
    });
    if is_html {
        return Some("text/html; charset=utf-8");
    }

    if data.starts_with(b"<?xml") {
        return Some("text/xml; charset=utf-8");
    }
    None
}

fn sniff_bom(head: &[u8]) -> Option<&'static str> {
    if head.starts_with(&[0xFE, 0xFF]) {
        Some("text/plain; charset=utf-16be")
    } else if head.starts_with(&[0xFF, 0xFE]) {
        Some("text/plain; charset=utf-16le")
    } else if head.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some("text/plain; charset=utf-8")
    } else {
        None
    }
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
