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

use crate::log;
use crate::protocol::consts::{ENVELOPE_SENTINEL, ENVELOPE_SENTINEL_COUNT};

/// Some client frames arrive wrapped in a signature envelope: the sentinel
/// occurs three times delimiting what looks like a base64 signature, the
/// real message following the third occurrence. Returns the message to
/// interpret; the caller must still forward the ORIGINAL frame upstream.
///
/// A frame with a wrong sentinel count is interpreted as-is, with a warning.
/// It is never dropped.
pub fn interpret(frame: &str) -> &str {
    if !frame.contains(ENVELOPE_SENTINEL) {
        return frame;
    }
    let count = frame.matches(ENVELOPE_SENTINEL).count();
    if count != ENVELOPE_SENTINEL_COUNT {
        log::warn!(
            "malformed signature envelope ({} sentinels): {}",
            count,
            frame
        );
        return frame;
    }
    match frame.rsplit_once(ENVELOPE_SENTINEL) {
        Some((_, message)) => message,
        None => frame,
    }
}
