//! A GPS receiver on the console UART, emitting one fix per second.

use std::convert::Infallible;

use embassy_time::Timer;
use embedded_io_async::{ErrorType, Read, Write};
use log::info;

pub struct SimGps {
    fixes: u32,
    echoed: Vec<u8>,
}

impl SimGps {
    pub const fn new() -> Self {
        Self { fixes: 0, echoed: Vec::new() }
    }
}

impl ErrorType for SimGps {
    type Error = Infallible;
}

impl Read for SimGps {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        Timer::after_secs(1).await;
        let sentence = format!(
            "$GPGGA,{:06},3859.812,N,07651.424,W,1,08,0.9,41.0,M,,,,",
            self.fixes
        );
        self.fixes += 1;
        let n = sentence.len().min(buf.len());
        buf[..n].copy_from_slice(&sentence.as_bytes()[..n]);
        Ok(n)
    }
}

impl Write for SimGps {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
        self.echoed.extend_from_slice(buf);
        while let Some(end) =
            self.echoed.windows(2).position(|w| w == b"\r\n")
        {
            let line: Vec<u8> = self.echoed.drain(..end + 2).collect();
            info!("console: {}", String::from_utf8_lossy(&line[..end]));
        }
        Ok(buf.len())
    }
}
