//! Header extraction from plain-text email files.
//!
//! Files are scanned line by line against a fixed, case-sensitive set of
//! header prefixes. Nothing here fails on content: unknown or malformed
//! headers simply leave their field empty. The only error is failing to read
//! the file in the first place.
//!
//! # Body capture
//!
//! The first zero-length line ends the header block. Only the single line
//! that follows it is kept as `body`; the rest of the file is not read into
//! the record. Search relevance and display downstream are built around this
//! truncated body.

use super::error::ExtractError;
use super::source::FileSource;
use crate::models::EmailRecord;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
enum HeaderField {
    MessageId,
    Date,
    Sender,
    Receiver,
    Subject,
    MimeVersion,
    ContentType,
    Encoding,
    Folder,
}

/// Recognised prefixes, tested in this order.
const HEADER_PREFIXES: [(&str, HeaderField); 9] = [
    ("Message-ID:", HeaderField::MessageId),
    ("Date:", HeaderField::Date),
    ("From:", HeaderField::Sender),
    ("To:", HeaderField::Receiver),
    ("Subject:", HeaderField::Subject),
    ("Mime-Version:", HeaderField::MimeVersion),
    ("Content-Type:", HeaderField::ContentType),
    ("Content-Transfer-Encoding:", HeaderField::Encoding),
    ("X-Folder:", HeaderField::Folder),
];

/// Store `line` into the matching field of `record`, if it is a known header.
///
/// Returns `false` for lines that match no prefix. A header seen twice keeps
/// its last value.
fn apply_header(record: &mut EmailRecord, line: &str) -> bool {
    for (prefix, field) in HEADER_PREFIXES {
        let Some(rest) = line.strip_prefix(prefix) else {
            continue;
        };

        let value = rest.trim().to_string();
        match field {
            HeaderField::MessageId => record.message_id = value,
            HeaderField::Date => record.date = Some(value),
            HeaderField::Sender => record.sender = value,
            HeaderField::Receiver => record.receiver = value,
            HeaderField::Subject => record.subject = value,
            HeaderField::MimeVersion => record.mime_version = value,
            HeaderField::ContentType => record.content_type = value,
            HeaderField::Encoding => record.encoding = value,
            HeaderField::Folder => record.folder = value,
        }
        return true;
    }
    false
}

/// Build an [`EmailRecord`] from the full text of one file.
pub fn extract_record(content: &str) -> EmailRecord {
    let mut record = EmailRecord::default();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        if line.is_empty() {
            record.body = lines.next().unwrap_or_default().to_string();
            break;
        }
        if !apply_header(&mut record, line) {
            log::trace!("ignoring non-header line: {:.40}", line);
        }
    }

    record
}

/// Read `path` through `source` and extract its record.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub async fn extract_file<F>(source: &F, path: &Path) -> Result<EmailRecord, ExtractError>
where
    F: FileSource + ?Sized,
{
    let bytes = source
        .read(path)
        .await
        .map_err(|err| ExtractError::new(path, err))?;

    let content = String::from_utf8_lossy(&bytes);
    Ok(extract_record(&content))
}
