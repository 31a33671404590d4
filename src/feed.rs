// src/feed.rs
// Reader for the backend's multipart MJPEG stream. A spawned task pulls
// bytes, reassembles JPEG frames and hands decoded images to the UI over
// a small bounded channel. When the UI falls behind, frames are dropped
// here instead of queueing up.

use std::time::Duration;

use futures::StreamExt;
use image::DynamicImage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{PanelError, Result};
use crate::{log_debug, log_info, log_warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const FRAME_CHANNEL_CAPACITY: usize = 2;
/// A stream that never yields a frame end must not grow the reassembly
/// buffer without bound.
const MAX_BUFFER: usize = 8 * 1024 * 1024;

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

/// A running feed task plus the channel its frames arrive on.
#[derive(Debug)]
pub struct FeedHandle {
    /// The URL this task is reading, so a new source can be told apart
    /// from the one already running.
    pub url: String,
    pub frames: mpsc::Receiver<DynamicImage>,
    task: JoinHandle<()>,
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Connect to `url` and start decoding frames in the background.
pub fn spawn_feed(url: String) -> FeedHandle {
    let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
    let task_url = url.clone();
    let task = tokio::spawn(async move {
        if let Err(e) = run_feed(&task_url, tx).await {
            log_warn!("Video feed ended: {}", e);
        }
    });
    FeedHandle {
        url,
        frames: rx,
        task,
    }
}

async fn run_feed(url: &str, tx: mpsc::Sender<DynamicImage>) -> Result<()> {
    // No overall request timeout here: the stream is expected to stay
    // open for as long as recognition runs.
    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?;

    log_info!("Connecting to video feed at {}", url);
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(PanelError::BackendStatus {
            endpoint: "/video_feed",
            status: response.status().as_u16(),
        });
    }

    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();
    let mut dropped: u64 = 0;

    while let Some(chunk) = stream.next().await {
        buffer.extend_from_slice(&chunk?);

        while let Some(jpeg) = extract_jpeg(&mut buffer) {
            match image::load_from_memory(&jpeg) {
                Ok(frame) => match tx.try_send(frame) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        dropped += 1;
                        if dropped % 100 == 0 {
                            log_debug!("Dropped {} feed frames so far", dropped);
                        }
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => return Ok(()),
                },
                Err(e) => log_debug!("Discarding undecodable frame: {}", e),
            }
        }

        if buffer.len() > MAX_BUFFER {
            log_warn!("Feed buffer passed {} bytes without a frame end, resetting", MAX_BUFFER);
            buffer.clear();
        }
    }

    log_info!("Video feed stream closed");
    Ok(())
}

/// Pull the next complete JPEG out of the reassembly buffer. Multipart
/// boundaries and part headers sit between frames; everything up to the
/// frame start is discarded with it.
fn extract_jpeg(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let start = find_marker(buffer, 0, JPEG_SOI)?;
    let end = find_marker(buffer, start + 2, JPEG_EOI)? + 2;
    let jpeg = buffer[start..end].to_vec();
    buffer.drain(..end);
    Some(jpeg)
}

fn find_marker(haystack: &[u8], from: usize, marker: [u8; 2]) -> Option<usize> {
    haystack[from..]
        .windows(2)
        .position(|window| window == marker)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(payload: &[u8]) -> Vec<u8> {
        let mut bytes = JPEG_SOI.to_vec();
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(&JPEG_EOI);
        bytes
    }

    #[test]
    fn test_extract_skips_multipart_headers() {
        let mut buffer = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n".to_vec();
        buffer.extend_from_slice(&frame(b"abc"));
        let jpeg = extract_jpeg(&mut buffer).unwrap();
        assert_eq!(jpeg, frame(b"abc"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_extract_waits_for_the_frame_end() {
        let mut buffer = JPEG_SOI.to_vec();
        buffer.extend_from_slice(b"partial");
        assert!(extract_jpeg(&mut buffer).is_none());
        assert_eq!(buffer.len(), 2 + 7);

        buffer.extend_from_slice(&JPEG_EOI);
        let jpeg = extract_jpeg(&mut buffer).unwrap();
        assert_eq!(jpeg, frame(b"partial"));
    }

    #[test]
    fn test_extract_returns_frames_one_at_a_time() {
        let mut buffer = frame(b"one");
        buffer.extend_from_slice(b"\r\n--frame\r\n");
        buffer.extend_from_slice(&frame(b"two"));

        assert_eq!(extract_jpeg(&mut buffer).unwrap(), frame(b"one"));
        assert_eq!(extract_jpeg(&mut buffer).unwrap(), frame(b"two"));
        assert!(extract_jpeg(&mut buffer).is_none());
    }

    #[test]
    fn test_extract_keeps_trailing_bytes() {
        let mut buffer = frame(b"done");
        buffer.extend_from_slice(&JPEG_SOI);
        buffer.extend_from_slice(b"next");

        extract_jpeg(&mut buffer).unwrap();
        assert_eq!(&buffer[..2], &JPEG_SOI);
    }
}
