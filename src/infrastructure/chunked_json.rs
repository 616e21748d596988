// Chunked JSON streaming of window updates
use crate::application::power_service::WindowUpdate;
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Create a chunked streaming response. Each chunk is a 4-byte big-endian
/// length followed by the JSON payload, compressed per chunk when asked.
pub fn chunked_json_stream<S, T>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + Sync + 'static,
{
    let byte_stream = stream.then(move |msg| async move { serialize_chunk(&msg, compress).await });

    // No Content-Encoding: chunks are compressed individually, not the HTTP body.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::TRANSFER_ENCODING, "chunked")
        .body(Body::from_stream(byte_stream))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn serialize_chunk<T: Serialize>(msg: &T, compress: bool) -> Result<Bytes, std::io::Error> {
    let buffer = serde_json::to_vec(msg).map_err(std::io::Error::other)?;

    let payload = if compress {
        brotli_compress(buffer).await?
    } else {
        buffer
    };

    let length = payload.len() as u32;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Stream the current window and then every update published after it
pub fn stream_from_receiver(rx: watch::Receiver<WindowUpdate>, compress: bool) -> impl IntoResponse {
    let stream = WatchStream::new(rx).map(|window| window.to_vec());

    match chunked_json_stream(stream, compress) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::Sample;

    #[tokio::test]
    async fn test_chunk_is_length_prefixed() {
        let chunk = serialize_chunk(&vec![Sample::absent(1)], false).await.unwrap();
        let payload = br#"[{"time_ms":1,"voltage":null}]"#;
        assert_eq!(&chunk[..4], (payload.len() as u32).to_be_bytes().as_slice());
        assert_eq!(&chunk[4..], payload.as_slice());
    }

    #[tokio::test]
    async fn test_stream_starts_with_current_window() {
        let (tx, rx) = watch::channel(std::sync::Arc::new(vec![Sample::reading(0, 230.0)]));
        let response = stream_from_receiver(rx, false).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let mut body = response.into_body().into_data_stream();
        let first = body.next().await.unwrap().unwrap();
        let len = u32::from_be_bytes([first[0], first[1], first[2], first[3]]) as usize;
        let window: Vec<Sample> = serde_json::from_slice(&first[4..4 + len]).unwrap();
        assert_eq!(window, vec![Sample::reading(0, 230.0)]);

        tx.send_replace(std::sync::Arc::new(vec![Sample::absent(60_000)]));
        let second = body.next().await.unwrap().unwrap();
        let window: Vec<Sample> = serde_json::from_slice(&second[4..]).unwrap();
        assert_eq!(window, vec![Sample::absent(60_000)]);
    }
}
