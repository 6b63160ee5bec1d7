// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Box command definitions.
//!
//! The box understands exactly four single-letter commands:
//!
//! | Command | Letter | Reply |
//! |---------|--------|-------|
//! | [`Command::ConnectProbe`] | `c` | 4 bytes, discarded |
//! | [`Command::Unlock`] | `u` | none |
//! | [`Command::BoxState`] | `s` | `CLS` / `OPN` |
//! | [`Command::PackageState`] | `p` | `YES` / `NO` |
//!
//! # Examples
//!
//! ```
//! use parcelbox::command::Command;
//!
//! assert_eq!(Command::BoxState.letter(), 's');
//! assert_eq!(&Command::BoxState.frame(), b"s>");
//! assert!(!Command::Unlock.expects_response());
//! ```

use std::fmt;

/// Byte terminating every outbound frame.
pub const FRAME_TERMINATOR: u8 = b'>';

/// A command that can be sent to the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Sent once right after connecting.
    ConnectProbe,
    /// Releases the door lock. Fire-and-forget.
    Unlock,
    /// Queries the door lock state.
    BoxState,
    /// Queries package presence.
    PackageState,
}

impl Command {
    /// Returns the command letter.
    #[must_use]
    pub const fn letter(&self) -> char {
        match self {
            Self::ConnectProbe => 'c',
            Self::Unlock => 'u',
            Self::BoxState => 's',
            Self::PackageState => 'p',
        }
    }

    /// Returns the outbound frame: the letter followed by the terminator.
    #[must_use]
    pub const fn frame(&self) -> [u8; 2] {
        // Letters are ASCII.
        #[allow(clippy::cast_possible_truncation)]
        let letter = self.letter() as u8;
        [letter, FRAME_TERMINATOR]
    }

    /// Returns whether the box answers this command.
    #[must_use]
    pub const fn expects_response(&self) -> bool {
        !matches!(self, Self::Unlock)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConnectProbe => "connect-probe",
            Self::Unlock => "unlock",
            Self::BoxState => "box-state",
            Self::PackageState => "package-state",
        };
        write!(f, "{name}({})", self.letter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_letters() {
        assert_eq!(Command::ConnectProbe.letter(), 'c');
        assert_eq!(Command::Unlock.letter(), 'u');
        assert_eq!(Command::BoxState.letter(), 's');
        assert_eq!(Command::PackageState.letter(), 'p');
    }

    #[test]
    fn command_frames_end_with_terminator() {
        assert_eq!(&Command::ConnectProbe.frame(), b"c>");
        assert_eq!(&Command::Unlock.frame(), b"u>");
        assert_eq!(&Command::PackageState.frame(), b"p>");
    }

    #[test]
    fn only_unlock_is_fire_and_forget() {
        assert!(Command::ConnectProbe.expects_response());
        assert!(!Command::Unlock.expects_response());
        assert!(Command::BoxState.expects_response());
        assert!(Command::PackageState.expects_response());
    }

    #[test]
    fn command_display() {
        assert_eq!(Command::Unlock.to_string(), "unlock(u)");
    }
}
