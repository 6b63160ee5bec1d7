// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response frame decoding.

/// Length of every inbound frame, terminator included.
pub const RESPONSE_FRAME_LEN: usize = 4;

/// Number of meaningful payload bytes in an inbound frame.
const PAYLOAD_LEN: usize = RESPONSE_FRAME_LEN - 1;

/// Decodes a response frame into its payload text.
///
/// The first three bytes are read as ASCII and trimmed. The fourth byte is
/// the frame terminator and is ignored whatever its value.
///
/// # Examples
///
/// ```
/// use parcelbox::protocol::decode_response;
///
/// assert_eq!(decode_response(b"CLS\n"), "CLS");
/// assert_eq!(decode_response(b"NO \n"), "NO");
/// assert_eq!(decode_response(b"OPNX"), "OPN");
/// ```
#[must_use]
pub fn decode_response(frame: &[u8; RESPONSE_FRAME_LEN]) -> String {
    let payload: String = frame[..PAYLOAD_LEN]
        .iter()
        .map(|&b| if b.is_ascii() { char::from(b) } else { char::REPLACEMENT_CHARACTER })
        .collect();
    payload.trim().to_string()
}
