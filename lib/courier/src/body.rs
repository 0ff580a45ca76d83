//! Request body that reports upload progress.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use courier_core::ProgressReporter;
use http_body::{Body, Frame, SizeHint};

const CHUNK_SIZE: usize = 64 * 1024;

/// A buffered body handed to hyper in chunks.
///
/// Each chunk taken by the connection is reported as sent.
#[derive(Debug)]
pub(crate) struct ProgressBody {
    remaining: Bytes,
    sent: u64,
    expected: u64,
    reporter: Option<ProgressReporter>,
}

impl ProgressBody {
    pub(crate) fn new(data: Bytes, reporter: Option<ProgressReporter>) -> Self {
        Self {
            expected: data.len() as u64,
            remaining: data,
            sent: 0,
            reporter,
        }
    }
}

impl Body for ProgressBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.remaining.is_empty() {
            return Poll::Ready(None);
        }

        let chunk = this.remaining.split_to(this.remaining.len().min(CHUNK_SIZE));
        this.sent += chunk.len() as u64;
        if let Some(reporter) = &this.reporter {
            reporter.report(this.sent, this.expected);
        }
        Poll::Ready(Some(Ok(Frame::data(chunk))))
    }

    fn is_end_stream(&self) -> bool {
        self.remaining.is_empty()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use futures_util::StreamExt;
    use http_body_util::BodyExt;

    use super::*;
    use courier_core::{UploadEvent, progress_channel};

    #[tokio::test]
    async fn chunks_are_reported() {
        let data = Bytes::from(vec![7_u8; CHUNK_SIZE * 2 + 10]);
        let (reporter, stream) = progress_channel();
        let body = ProgressBody::new(data.clone(), Some(reporter.clone()));
        check!(body.size_hint().exact() == Some(data.len() as u64));

        let collected = body.collect().await.expect("infallible").to_bytes();
        check!(collected == data);
        reporter.finish(Ok(Bytes::new()));

        let sent: Vec<u64> = stream
            .filter_map(|event| async move {
                match event {
                    Ok(UploadEvent::Progress(progress)) => Some(progress.bytes_sent),
                    _ => None,
                }
            })
            .collect()
            .await;
        let total = data.len() as u64;
        check!(sent == vec![CHUNK_SIZE as u64, 2 * CHUNK_SIZE as u64, total]);
    }

    #[tokio::test]
    async fn empty_body_ends_immediately() {
        let body = ProgressBody::new(Bytes::new(), None);
        check!(body.is_end_stream());
        let collected = body.collect().await.expect("infallible").to_bytes();
        check!(collected.is_empty());
    }
}
