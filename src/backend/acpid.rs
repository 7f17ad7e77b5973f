//! acpid socket [`EventSource`] implementation.
//!
//! acpid exposes its event stream on a Unix stream socket, by default
//! `/var/run/acpid.socket`.  Every connected client receives every event as
//! one line of text:
//!
//! ```text
//! button/volumeup VOLUP 00000080 00000000 K
//! ```
//!
//! [`AcpidSource`] connects to that socket, resolves each line through a
//! [`Keymap`] and forwards the resulting [`Action`]s.  Lines that match no
//! binding (lid, power button, AC adapter, …) are dropped.

use crate::event::{Action, Keymap};
use crate::traits::EventSource;
use log::{debug, info, trace, warn};
use std::io::{BufRead, BufReader, Read};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Default acpid event socket.
pub const DEFAULT_SOCKET: &str = "/var/run/acpid.socket";

/// Usable bytes of `sockaddr_un.sun_path` on Linux (108 minus the NUL).
pub const MAX_SOCKET_PATH: usize = 107;

/// Longest event line kept, newline included.  Longer lines are dropped.
pub const MAX_EVENT_LEN: usize = 512;

/// Errors produced by the acpid source.
#[derive(Debug, thiserror::Error)]
pub enum AcpidError {
    #[error("socket path longer than {max} bytes: {path}")]
    PathTooLong { path: PathBuf, max: usize },
    #[error("can't open socket {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("acpid closed the event socket")]
    Disconnected,
}

/// An [`EventSource`] reading hotkey events from acpid.
pub struct AcpidSource {
    path: PathBuf,
    stream: UnixStream,
    keymap: Keymap,
}

impl AcpidSource {
    /// Connect to the acpid socket at `path`.
    ///
    /// The connection is opened eagerly so that a missing or dead acpid is
    /// reported at startup rather than from the reader thread.
    pub fn connect(path: impl AsRef<Path>, keymap: Keymap) -> Result<Self, AcpidError> {
        let path = path.as_ref().to_path_buf();
        check_path_len(&path)?;
        let stream = UnixStream::connect(&path).map_err(|source| AcpidError::Connect {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            stream,
            keymap,
        })
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn check_path_len(path: &Path) -> Result<(), AcpidError> {
    use std::os::unix::ffi::OsStrExt;
    if path.as_os_str().as_bytes().len() > MAX_SOCKET_PATH {
        return Err(AcpidError::PathTooLong {
            path: path.to_path_buf(),
            max: MAX_SOCKET_PATH,
        });
    }
    Ok(())
}

/// Consume input up to and including the next `\n`, in bounded chunks.
fn skip_line(reader: &mut impl BufRead) -> std::io::Result<()> {
    let mut chunk = Vec::with_capacity(MAX_EVENT_LEN);
    loop {
        chunk.clear();
        let n = reader
            .by_ref()
            .take(MAX_EVENT_LEN as u64)
            .read_until(b'\n', &mut chunk)?;
        if n == 0 || chunk.last() == Some(&b'\n') {
            return Ok(());
        }
    }
}

impl EventSource for AcpidSource {
    type Error = AcpidError;

    /// Read events until acpid hangs up.
    ///
    /// This method **blocks**.  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Action>) -> Result<(), Self::Error> {
        let mut reader = BufReader::new(&self.stream);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let n = (&mut reader)
                .take(MAX_EVENT_LEN as u64)
                .read_until(b'\n', &mut buf)?;
            if n == 0 {
                return Err(AcpidError::Disconnected);
            }
            if n == MAX_EVENT_LEN && buf.last() != Some(&b'\n') {
                warn!("dropping event longer than {} bytes", MAX_EVENT_LEN);
                skip_line(&mut reader)?;
                continue;
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end();
            trace!("event: {:?}", line);

            match self.keymap.lookup(line) {
                Some(action) => {
                    debug!("{:?} -> {}", line, action);
                    if sink.send(action).is_err() {
                        info!("sink closed, shutting down");
                        return Ok(());
                    }
                }
                None => debug!("ignoring event {:?}", line),
            }
        }
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::net::UnixListener;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Monotonic counter to generate unique socket paths per test.
    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_socket_path() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "acpi-volumed-test-{}-{}.sock",
            std::process::id(),
            id
        ))
    }

    /// Bind a fake acpid, connect a source to it, write `lines`, hang up,
    /// and return everything the source forwarded plus its exit result.
    fn feed(lines: &[&str]) -> (Vec<Action>, Result<(), AcpidError>) {
        let path = tmp_socket_path();
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path).expect("bind");

        let mut source = AcpidSource::connect(&path, Keymap::default()).expect("connect");
        let (mut acpid, _) = listener.accept().expect("accept");
        for line in lines {
            acpid.write_all(line.as_bytes()).unwrap();
        }
        drop(acpid);

        let (tx, rx) = mpsc::channel();
        let result = source.run(tx);
        let _ = std::fs::remove_file(&path);
        (rx.try_iter().collect(), result)
    }

    #[test]
    fn forwards_matched_events_in_order() {
        let (actions, result) = feed(&[
            "button/volumeup VOLUP 00000080 00000000 K\n",
            "button/volumedown VOLDN 00000080 00000000 K\n",
            "button/mute MUTE 00000080 00000000 K\n",
            "button/f20 F20 00000080 00000000 K\n",
        ]);
        assert_eq!(
            actions,
            vec![
                Action::VolumeUp,
                Action::VolumeDown,
                Action::TogglePlaybackMute,
                Action::ToggleCaptureMute,
            ]
        );
        assert!(matches!(result, Err(AcpidError::Disconnected)));
    }

    #[test]
    fn unrelated_events_are_dropped() {
        let (actions, _) = feed(&[
            "ac_adapter ACPI0003:00 00000080 00000000\n",
            "button/lid LID close\n",
            "\n",
            "button/mute MUTE 00000080 00000000 K\n",
        ]);
        assert_eq!(actions, vec![Action::TogglePlaybackMute]);
    }

    #[test]
    fn several_events_in_one_write_are_split() {
        let (actions, _) = feed(&[
            "button/volumeup VOLUP 00000080 00000000 K\nbutton/volumeup VOLUP 00000080 00000000 K\n",
        ]);
        assert_eq!(actions, vec![Action::VolumeUp, Action::VolumeUp]);
    }

    #[test]
    fn invalid_utf8_does_not_abort() {
        let path = tmp_socket_path();
        let listener = UnixListener::bind(&path).expect("bind");
        let mut source = AcpidSource::connect(&path, Keymap::default()).expect("connect");
        let (mut acpid, _) = listener.accept().expect("accept");
        acpid.write_all(b"\xff\xfe garbage\n").unwrap();
        acpid.write_all(b"button/volumedown VOLDN\n").unwrap();
        drop(acpid);

        let (tx, rx) = mpsc::channel();
        let _ = source.run(tx);
        let _ = std::fs::remove_file(&path);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![Action::VolumeDown]);
    }

    #[test]
    fn oversized_line_is_dropped_and_reading_resumes() {
        let junk = "x".repeat(MAX_EVENT_LEN * 20) + "\n";
        let (actions, result) = feed(&[
            "button/volumeup VOLUP 00000080 00000000 K\n",
            &junk,
            "button/mute MUTE 00000080 00000000 K\n",
        ]);
        assert_eq!(actions, vec![Action::VolumeUp, Action::TogglePlaybackMute]);
        assert!(matches!(result, Err(AcpidError::Disconnected)));
    }

    #[test]
    fn oversized_line_with_event_prefix_is_not_dispatched() {
        let long = format!("button/mute MUTE {}\n", "0".repeat(MAX_EVENT_LEN));
        let (actions, _) = feed(&[&long, "button/volumedown VOLDN\n"]);
        assert_eq!(actions, vec![Action::VolumeDown]);
    }

    #[test]
    fn skip_line_stops_after_newline() {
        let input = format!("{}\nnext\n", "y".repeat(MAX_EVENT_LEN * 3));
        let mut reader = std::io::Cursor::new(input.into_bytes());
        skip_line(&mut reader).unwrap();
        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "next\n");
    }

    #[test]
    fn closed_sink_stops_source() {
        let path = tmp_socket_path();
        let listener = UnixListener::bind(&path).expect("bind");
        let mut source = AcpidSource::connect(&path, Keymap::default()).expect("connect");
        let (mut acpid, _) = listener.accept().expect("accept");
        acpid.write_all(b"button/mute MUTE\n").unwrap();

        let (tx, rx) = mpsc::channel();
        drop(rx);
        assert!(source.run(tx).is_ok());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn source_reports_its_socket_path() {
        let path = tmp_socket_path();
        let _listener = UnixListener::bind(&path).expect("bind");
        let source = AcpidSource::connect(&path, Keymap::default()).expect("connect");
        assert_eq!(source.path(), path.as_path());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_socket_is_connect_error() {
        let path = tmp_socket_path();
        let err = AcpidSource::connect(&path, Keymap::default()).err().unwrap();
        assert!(matches!(err, AcpidError::Connect { .. }));
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn overlong_path_rejected_before_connect() {
        let path = PathBuf::from(format!("/tmp/{}", "a".repeat(MAX_SOCKET_PATH)));
        let err = AcpidSource::connect(&path, Keymap::default()).err().unwrap();
        assert!(matches!(err, AcpidError::PathTooLong { max: MAX_SOCKET_PATH, .. }));
    }

    #[test]
    fn path_at_limit_is_accepted_by_length_check() {
        let path = PathBuf::from("/".to_string() + &"a".repeat(MAX_SOCKET_PATH - 1));
        assert!(check_path_len(&path).is_ok());
    }
}
