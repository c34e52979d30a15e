// BSD 3-Clause License
// Copyright (c) 2026, Virtual Cable S.L.
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice,
//    this list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
//    this list of conditions and the following disclaimer in the documentation
//    and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors
//    may be used to endorse or promote products derived from this software
//    without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

// Authors: Adolfo Gómez, dkmaster at dkmon dot com

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Which peer sits at the other end of the stream; decides the trailing-byte
/// discipline. Clients terminate their frames with `\n\x00`, servers with a
/// bare `\x00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peer {
    Client,
    Server,
}

/// The wire is Latin-1: every byte maps to the Unicode scalar of the same
/// value, so decoding is lossless and the envelope sentinel (0xF9) survives.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            debug_assert!((c as u32) < 0x100, "frame holds a non Latin-1 scalar");
            c as u8
        })
        .collect()
}

/// NUL-delimited frame reader for one direction of a proxied connection.
pub struct FrameReader<R> {
    peer: Peer,
    inner: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Reader for a stream where the remote peer is a client.
    pub fn from_client(reader: R) -> Self {
        FrameReader::new(Peer::Client, reader)
    }

    /// Reader for a stream where the remote peer is a server.
    pub fn from_server(reader: R) -> Self {
        FrameReader::new(Peer::Server, reader)
    }

    fn new(peer: Peer, reader: R) -> Self {
        FrameReader {
            peer,
            inner: BufReader::new(reader),
            buf: Vec::new(),
        }
    }

    /// Next non-empty frame, or `None` on EOF. Empty frames (consecutive
    /// separators) are skipped; a partial frame cut off by EOF is dropped.
    pub async fn next_frame(&mut self) -> Result<Option<String>> {
        loop {
            self.buf.clear();
            let n = self.inner.read_until(0, &mut self.buf).await?;
            if n == 0 {
                return Ok(None);
            }
            if self.buf.last() != Some(&0) {
                return Ok(None);
            }
            let mut frame = &self.buf[..self.buf.len() - 1];
            if self.peer == Peer::Client && frame.last() == Some(&b'\n') {
                frame = &frame[..frame.len() - 1];
            }
            if frame.is_empty() {
                continue;
            }
            return Ok(Some(decode_latin1(frame)));
        }
    }
}

/// Frame writer for one direction of a proxied connection, applying the
/// destination's trailing-byte discipline.
pub struct FrameWriter<W> {
    peer: Peer,
    inner: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    /// Writer for frames going to a client.
    pub fn to_client(writer: W) -> Self {
        FrameWriter {
            peer: Peer::Client,
            inner: writer,
        }
    }

    /// Writer for frames going to a server.
    pub fn to_server(writer: W) -> Self {
        FrameWriter {
            peer: Peer::Server,
            inner: writer,
        }
    }

    pub async fn send(&mut self, frame: &str) -> Result<()> {
        let mut bytes = encode_latin1(frame);
        if self.peer == Peer::Server {
            bytes.push(b'\n');
        }
        bytes.push(0);
        self.inner.write_all(&bytes).await?;
        self.inner.flush().await?;
        Ok(())
    }
}
