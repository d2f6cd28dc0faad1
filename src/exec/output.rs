// src/exec/output.rs

//! Capturing and mirroring child output.
//!
//! Output is read in raw chunks (not lines) so non-UTF-8 bytes survive
//! capture untouched. Mirroring writes each chunk to the parent's matching
//! stream, skipping whitespace-only chunks; with a prefix every line is
//! prefixed and the chunk ends with a newline.

use std::io::{Read, Write};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::debug;

const CHUNK_SIZE: usize = 8 * 1024;

/// Which parent stream a child stream mirrors to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    pub fn label(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

/// Per-stream handling requested by the launch plan.
#[derive(Debug, Clone)]
pub struct Drain {
    pub stream: Stream,
    pub capture: bool,
    pub mirror: bool,
    pub prefix: Option<String>,
}

impl Drain {
    fn handle_chunk(&self, chunk: &[u8], captured: &mut Vec<u8>) -> Option<Vec<u8>> {
        if self.capture {
            captured.extend_from_slice(chunk);
        }
        if self.mirror {
            format_mirrored_chunk(chunk, self.prefix.as_deref())
        } else {
            None
        }
    }

    /// Read `reader` to EOF; returns the captured bytes (empty when not
    /// capturing).
    pub async fn run<R>(self, mut reader: R) -> Vec<u8>
    where
        R: AsyncRead + Unpin,
    {
        let mut captured = Vec::new();
        let mut buf = vec![0u8; CHUNK_SIZE];

        loop {
            let n = match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    debug!(stream = self.stream.label(), error = %e, "output reader exiting on read error");
                    break;
                }
            };
            if let Some(out) = self.handle_chunk(&buf[..n], &mut captured) {
                let res = match self.stream {
                    Stream::Stdout => tokio::io::stdout().write_all(&out).await,
                    Stream::Stderr => tokio::io::stderr().write_all(&out).await,
                };
                if let Err(e) = res {
                    debug!(stream = self.stream.label(), error = %e, "failed to mirror output");
                }
            }
        }

        captured
    }

    /// Blocking variant of [`run`](Self::run).
    pub fn run_blocking<R: Read>(self, mut reader: R) -> Vec<u8> {
        let mut captured = Vec::new();
        let mut buf = vec![0u8; CHUNK_SIZE];

        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!(stream = self.stream.label(), error = %e, "output reader exiting on read error");
                    break;
                }
            };
            if let Some(out) = self.handle_chunk(&buf[..n], &mut captured) {
                let res = match self.stream {
                    Stream::Stdout => std::io::stdout().lock().write_all(&out),
                    Stream::Stderr => std::io::stderr().lock().write_all(&out),
                };
                if let Err(e) = res {
                    debug!(stream = self.stream.label(), error = %e, "failed to mirror output");
                }
            }
        }

        captured
    }
}

/// Bytes to mirror for one chunk, or `None` if the chunk is blank.
pub fn format_mirrored_chunk(chunk: &[u8], prefix: Option<&str>) -> Option<Vec<u8>> {
    let text = String::from_utf8_lossy(chunk);
    if text.trim().is_empty() {
        return None;
    }

    let Some(prefix) = prefix else {
        return Some(chunk.to_vec());
    };

    let mut out = String::with_capacity(text.len() + prefix.len() * 4);
    for line in text.trim_end_matches(['\r', '\n']).split('\n') {
        out.push_str(prefix);
        out.push_str(line.trim_end_matches('\r'));
        out.push('\n');
    }
    Some(out.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_chunks_are_not_mirrored() {
        assert_eq!(format_mirrored_chunk(b"  \n\t\n", None), None);
        assert_eq!(format_mirrored_chunk(b"\n", Some("[x] ")), None);
    }

    #[test]
    fn unprefixed_chunks_pass_through_verbatim() {
        assert_eq!(
            format_mirrored_chunk(b"partial line", None),
            Some(b"partial line".to_vec())
        );
    }

    #[test]
    fn prefixed_chunks_prefix_every_line_and_end_with_newline() {
        let out = format_mirrored_chunk(b"one\r\ntwo\nthree", Some("[build] ")).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[build] one\n[build] two\n[build] three\n"
        );
    }

    #[tokio::test]
    async fn capture_keeps_raw_bytes() {
        let drain = Drain {
            stream: Stream::Stdout,
            capture: true,
            mirror: false,
            prefix: None,
        };
        let data: &[u8] = b"\xffraw\nbytes";
        assert_eq!(drain.run(data).await, data.to_vec());
    }

    #[test]
    fn blocking_drain_without_capture_discards() {
        let drain = Drain {
            stream: Stream::Stderr,
            capture: false,
            mirror: false,
            prefix: None,
        };
        assert!(drain.run_blocking(&b"ignored"[..]).is_empty());
    }
}
