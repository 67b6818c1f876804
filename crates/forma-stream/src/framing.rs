//! Line framing over a chunked response body.
//!
//! Chunk boundaries are arbitrary: a line, or a multi-byte UTF-8 character,
//! may be split across any number of chunks. The codec keeps the trailing
//! partial line buffered and only decodes text once a whole line is present.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, FramedRead};
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::transport::ByteStream;
use crate::StreamError;

/// Framed sequence of text lines read from a [`ByteStream`].
pub type LineStream = FramedRead<StreamReader<ByteStream, Bytes>, DataLineCodec>;

/// Splits bytes on `\n`, dropping an optional trailing `\r`.
///
/// Invalid UTF-8 is decoded lossily so one bad line never aborts the stream.
/// At end of input a buffered unterminated line is discarded: only lines
/// the server finished writing are ever yielded.
#[derive(Debug, Default)]
pub struct DataLineCodec {
    /// Bytes of the buffer already scanned without finding a newline.
    scanned: usize,
}

impl DataLineCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

impl Decoder for DataLineCodec {
    type Item = String;
    type Error = StreamError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, StreamError> {
        let Some(offset) = buf[self.scanned..].iter().position(|b| *b == b'\n') else {
            self.scanned = buf.len();
            return Ok(None);
        };
        let newline = self.scanned + offset;
        self.scanned = 0;
        let line = buf.split_to(newline + 1);
        Ok(Some(decode_line(&line[..newline])))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, StreamError> {
        if let Some(line) = self.decode(buf)? {
            return Ok(Some(line));
        }
        self.scanned = 0;
        if !buf.is_empty() {
            debug!(bytes = buf.len(), "discarding unterminated line at end of stream");
            buf.clear();
        }
        Ok(None)
    }
}

/// Wrap a response body so it yields whole lines in arrival order.
pub fn frame_lines(body: ByteStream) -> LineStream {
    FramedRead::new(StreamReader::new(body), DataLineCodec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{stream, StreamExt};

    fn body_from(chunks: Vec<Vec<u8>>) -> ByteStream {
        Box::pin(stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, std::io::Error>(Bytes::from(c))),
        ))
    }

    async fn collect_lines(chunks: Vec<Vec<u8>>) -> Vec<String> {
        frame_lines(body_from(chunks))
            .map(|line| line.unwrap())
            .collect()
            .await
    }

    const BODY: &str = "data: [\"messages\",\"Hé\"]\n\
                        : keepalive\r\n\
                        data: [\"messages\",\"llo ✅\"]\n\
                        \n\
                        data: [\"progress\",{\"outputs_count\":2}]\n";

    #[tokio::test]
    async fn single_chunk_yields_every_line() {
        let lines = collect_lines(vec![BODY.as_bytes().to_vec()]).await;
        assert_eq!(
            lines,
            vec![
                "data: [\"messages\",\"Hé\"]",
                ": keepalive",
                "data: [\"messages\",\"llo ✅\"]",
                "",
                "data: [\"progress\",{\"outputs_count\":2}]",
            ]
        );
    }

    #[tokio::test]
    async fn any_two_way_split_yields_the_same_lines() {
        let bytes = BODY.as_bytes();
        let expected = collect_lines(vec![bytes.to_vec()]).await;
        for split in 0..=bytes.len() {
            let chunks = vec![bytes[..split].to_vec(), bytes[split..].to_vec()];
            assert_eq!(collect_lines(chunks).await, expected, "split at {split}");
        }
    }

    #[tokio::test]
    async fn byte_at_a_time_yields_the_same_lines() {
        let bytes = BODY.as_bytes();
        let expected = collect_lines(vec![bytes.to_vec()]).await;
        let chunks = bytes.iter().map(|b| vec![*b]).collect();
        assert_eq!(collect_lines(chunks).await, expected);
    }

    #[tokio::test]
    async fn multibyte_character_split_across_chunks() {
        let text = "data: ✅ Leçon\n".as_bytes();
        // Split inside the three-byte check mark.
        let chunks = vec![text[..7].to_vec(), text[7..].to_vec()];
        assert_eq!(collect_lines(chunks).await, vec!["data: ✅ Leçon"]);
    }

    #[tokio::test]
    async fn unterminated_tail_is_dropped_at_end() {
        let lines = collect_lines(vec![b"a\nb".to_vec()]).await;
        assert_eq!(lines, vec!["a"]);

        let lines = collect_lines(vec![b"a\r\n".to_vec(), b"data: [\"val".to_vec()]).await;
        assert_eq!(lines, vec!["a"]);
    }

    #[tokio::test]
    async fn empty_body_yields_nothing() {
        assert!(collect_lines(vec![]).await.is_empty());
        assert!(collect_lines(vec![Vec::new(), Vec::new()]).await.is_empty());
    }

    #[tokio::test]
    async fn invalid_utf8_is_lossy_not_fatal() {
        let lines = collect_lines(vec![b"ok\n\xff\xfe\nafter\n".to_vec()]).await;
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ok");
        assert!(lines[1].contains('\u{FFFD}'));
        assert_eq!(lines[2], "after");
    }

    #[tokio::test]
    async fn read_error_surfaces_as_stream_error() {
        let body: ByteStream = Box::pin(stream::iter(vec![
            Ok(Bytes::from_static(b"data: 1\n")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ]));
        let mut lines = frame_lines(body);
        assert_eq!(lines.next().await.unwrap().unwrap(), "data: 1");
        assert!(matches!(lines.next().await, Some(Err(StreamError::Read(_)))));
    }
}
