use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

use crate::{ClientBuilder, UrlInfo};

/// Resolve `link` with a default client.
///
/// # Panic
///
/// This panics if the client cannot be built or the lookup fails, so it
/// should only be used for testing
pub(crate) async fn resolve_with_default_client(link: &str) -> UrlInfo {
    ClientBuilder::default()
        .client()
        .unwrap()
        .resolve(link)
        .await
        .unwrap()
}

/// Start a server which answers every request with `body` in chunked
/// transfer encoding, so no `Content-Length` is ever declared.
///
/// `HEAD` requests only get the headers. Returns the server's base URL.
pub(crate) async fn chunked_server(content_type: &'static str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let body = body.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let head = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: {content_type}\r\ntransfer-encoding: chunked\r\nconnection: close\r\n\r\n"
                );
                if stream.write_all(head.as_bytes()).await.is_err() {
                    return;
                }
                if !request.starts_with(b"HEAD") {
                    for chunk in body.chunks(1024) {
                        let mut frame = format!("{:x}\r\n", chunk.len()).into_bytes();
                        frame.extend_from_slice(chunk);
                        frame.extend_from_slice(b"\r\n");
                        // The client hangs up once it has seen enough
                        if stream.write_all(&frame).await.is_err() {
                            return;
                        }
                    }
                    let _ = stream.write_all(b"0\r\n\r\n").await;
                }
                let _ = stream.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}
