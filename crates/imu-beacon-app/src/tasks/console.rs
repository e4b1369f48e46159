//! Serial pass-through: echoes whatever arrives on the console UART.

use embassy_futures::yield_now;
use embedded_io_async::{Error as _, Read, Write};

use crate::prelude::*;

pub const CONSOLE_BUFFER_LEN: usize = 256;
const LINE_END: &[u8] = b"\r\n";

/// Read one chunk and write it back followed by a line ending.
///
/// Returns the number of bytes echoed; 0 means the reader hit end of input.
pub async fn echo_once<U: Read + Write>(
    uart: &mut U,
    buf: &mut [u8],
) -> Result<usize, U::Error> {
    let n = uart.read(buf).await?;
    if n == 0 {
        return Ok(0);
    }
    uart.write_all(&buf[..n]).await?;
    uart.write_all(LINE_END).await?;
    uart.flush().await?;
    Ok(n)
}

pub async fn console_task<B: Board, const K: usize, U: Read + Write>(
    node: &Node<B, K>,
    mut uart: U,
) -> ! {
    node.readiness().wait_ready().await;
    info!("Console echo enabled");

    let mut buf = [0u8; CONSOLE_BUFFER_LEN];
    loop {
        match echo_once(&mut uart, &mut buf).await {
            Ok(0) => {
                warn!("Console input closed");
                fail_stop().await;
            }
            Ok(n) => trace!("Echoed {} bytes", n),
            Err(e) => warn!("Console error: {:?}", e.kind()),
        }
        // Lowest priority: let everything else run between chunks.
        yield_now().await;
    }
}
