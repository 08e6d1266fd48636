use super::parser::parse_document;
use super::schedule::ScheduleTable;
use super::source::{DocumentSource, FetchedDocument};
use crate::errors::GuideError;
use flate2::read::MultiGzDecoder;
use std::io::Read;
use std::sync::Arc;
use tracing::{info, warn};

/// Progress callback taking a fraction in [0.0, 1.0]. May be invoked from a
/// blocking worker thread; marshal to the UI context before touching UI state.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// A callback that drops every report
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Fetch and parse one guide, best effort.
///
/// On success reports exactly 1.0 and returns the table. On any failure
/// (network, decompression, malformed document) reports 0.0 and returns an
/// empty table; nothing is propagated.
pub async fn ingest<S: DocumentSource>(
    source: &S,
    url: &str,
    progress: ProgressCallback,
) -> ScheduleTable {
    match try_ingest(source, url, progress.clone()).await {
        Ok(table) => {
            progress(1.0);
            table
        }
        Err(e) => {
            warn!(url, error = %e, "EPG ingestion failed");
            progress(0.0);
            ScheduleTable::new()
        }
    }
}

/// Fetch and parse one guide, surfacing the failure.
///
/// Partial progress is reported while scanning; the final 1.0 / 0.0 is left
/// to the caller.
pub async fn try_ingest<S: DocumentSource>(
    source: &S,
    url: &str,
    progress: ProgressCallback,
) -> Result<ScheduleTable, GuideError> {
    info!(url, "Fetching EPG");
    let document = source.fetch(url).await?;

    // The scan is synchronous and can take a while on big guides
    let table = tokio::task::spawn_blocking(move || {
        let (bytes, expected_len) = decode_payload(document)?;
        parse_document(&bytes, expected_len, &*progress)
    })
    .await
    .map_err(|e| GuideError::Worker(e.to_string()))??;

    info!(
        url,
        channels = table.channel_count(),
        programs = table.program_count(),
        "EPG parsed"
    );
    Ok(table)
}

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Inflate `.xml.gz` payloads. The length hint then describes the compressed
/// body, so it is dropped in favour of the inflated size.
fn decode_payload(document: FetchedDocument) -> Result<(Vec<u8>, Option<u64>), GuideError> {
    if !document.body.starts_with(&GZIP_MAGIC) {
        return Ok((document.body, document.expected_len));
    }

    let mut inflated = Vec::with_capacity(document.body.len() * 4);
    MultiGzDecoder::new(document.body.as_slice())
        .read_to_end(&mut inflated)
        .map_err(|e| GuideError::Decompress(e.to_string()))?;
    Ok((inflated, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_plain_payload_passes_through() {
        let doc = FetchedDocument {
            body: b"<tv/>".to_vec(),
            expected_len: Some(5),
        };
        let (bytes, len) = decode_payload(doc).unwrap();
        assert_eq!(bytes, b"<tv/>");
        assert_eq!(len, Some(5));
    }

    #[test]
    fn test_gzip_payload_is_inflated() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"<tv></tv>").unwrap();
        let body = encoder.finish().unwrap();

        let doc = FetchedDocument {
            expected_len: Some(body.len() as u64),
            body,
        };
        let (bytes, len) = decode_payload(doc).unwrap();
        assert_eq!(bytes, b"<tv></tv>");
        assert_eq!(len, None);
    }

    #[test]
    fn test_concatenated_gzip_members_are_all_inflated() {
        let mut body = Vec::new();
        for part in [&b"<tv><programme/>"[..], &b"</tv>"[..]] {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(part).unwrap();
            body.extend(encoder.finish().unwrap());
        }

        let doc = FetchedDocument {
            body,
            expected_len: None,
        };
        let (bytes, _) = decode_payload(doc).unwrap();
        assert_eq!(bytes, b"<tv><programme/></tv>");
    }

    #[test]
    fn test_truncated_gzip_is_an_error() {
        let doc = FetchedDocument {
            body: vec![0x1f, 0x8b, 0x08, 0x00],
            expected_len: None,
        };
        assert!(matches!(decode_payload(doc), Err(GuideError::Decompress(_))));
    }
}
