//! Stdio wire framing (spec §6, SPEC_FULL §10.2): a 4-byte `{size, type}`
//! header for data frames, interleaved on the same stdin with
//! newline-terminated control lines behind a 1-byte discriminant.
//!
//! Built on `byteorder`, the same crate the frame codec traces its lineage
//! to, rather than hand-rolling big-endian integer reads.

use std::io::{self, ErrorKind, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

const FRAME_DISCRIMINANT: u8 = b'F';
const CONTROL_DISCRIMINANT: u8 = b'C';

/// One unit of input read off stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Frame { ifc_num: u16, bytes: Vec<u8> },
    Control(String),
}

/// One unit of output produced in response to a control command: either a
/// line of text (command output or a diagnostic) or a frame to emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOutput {
    Line(String),
    Frame(u16, Vec<u8>),
}

/// Read one event, or `Ok(None)` at a clean EOF between units.
pub fn read_event<R: Read>(reader: &mut R) -> io::Result<Option<Event>> {
    let mut discriminant = [0u8; 1];
    match reader.read_exact(&mut discriminant) {
        Ok(()) => {}
        Err(error) if error.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(error) => return Err(error),
    }

    match discriminant[0] {
        FRAME_DISCRIMINANT => {
            let size = reader.read_u16::<BigEndian>()?;
            let ifc_num = reader.read_u16::<BigEndian>()?;
            let payload_len = (size as usize)
                .checked_sub(4)
                .ok_or_else(|| io::Error::new(ErrorKind::InvalidData, "frame size smaller than its own header"))?;
            let mut bytes = vec![0u8; payload_len];
            reader.read_exact(&mut bytes)?;
            Ok(Some(Event::Frame { ifc_num, bytes }))
        }
        CONTROL_DISCRIMINANT => {
            let mut line = Vec::new();
            let mut byte = [0u8; 1];
            loop {
                reader.read_exact(&mut byte)?;
                if byte[0] == b'\n' {
                    break;
                }
                line.push(byte[0]);
            }
            let line = String::from_utf8(line)
                .map_err(|error| io::Error::new(ErrorKind::InvalidData, error))?;
            Ok(Some(Event::Control(line)))
        }
        other => Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("unrecognized stdio discriminant byte {other:#04x}"),
        )),
    }
}

/// Write a complete emitted frame using the §6 wire framing.
pub fn emit_frame<W: Write>(writer: &mut W, ifc_num: u16, bytes: &[u8]) -> io::Result<()> {
    let size = 4usize
        .checked_add(bytes.len())
        .and_then(|size| u16::try_from(size).ok())
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidData, "emitted frame too large to frame as u16"))?;
    writer.write_u16::<BigEndian>(size)?;
    writer.write_u16::<BigEndian>(ifc_num)?;
    writer.write_all(bytes)?;
    writer.flush()
}

/// Write one line of command output (always terminated by exactly one `\n`).
pub fn emit_line<W: Write>(writer: &mut W, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    if !line.ends_with('\n') {
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Drive the event loop until stdin is exhausted, dispatching each frame and
/// control line to the supplied callbacks and writing back whatever they
/// return (spec §5: exactly one callback active at a time, no re-entrance).
pub fn run<R, W>(
    reader: &mut R,
    writer: &mut W,
    mut on_frame: impl FnMut(u16, &[u8]) -> Vec<(u16, Vec<u8>)>,
    mut on_control: impl FnMut(&str) -> Vec<ControlOutput>,
) -> io::Result<()>
where
    R: Read,
    W: Write,
{
    while let Some(event) = read_event(reader)? {
        match event {
            Event::Frame { ifc_num, bytes } => {
                for (port, out) in on_frame(ifc_num, &bytes) {
                    emit_frame(writer, port, &out)?;
                }
            }
            Event::Control(line) => {
                for output in on_control(&line) {
                    match output {
                        ControlOutput::Line(text) => emit_line(writer, &text)?,
                        ControlOutput::Frame(port, bytes) => emit_frame(writer, port, &bytes)?,
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_a_framed_data_frame() {
        let mut input = vec![FRAME_DISCRIMINANT];
        input.extend_from_slice(&7u16.to_be_bytes()); // size = 4 + 3
        input.extend_from_slice(&2u16.to_be_bytes()); // ifc_num
        input.extend_from_slice(&[9, 8, 7]);
        let mut cursor = Cursor::new(input);

        let event = read_event(&mut cursor).unwrap().unwrap();
        assert_eq!(
            event,
            Event::Frame {
                ifc_num: 2,
                bytes: vec![9, 8, 7]
            }
        );
        assert!(read_event(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn reads_a_control_line() {
        let mut input = vec![CONTROL_DISCRIMINANT];
        input.extend_from_slice(b"arp 10.0.0.4 eth2\n");
        let mut cursor = Cursor::new(input);
        let event = read_event(&mut cursor).unwrap().unwrap();
        assert_eq!(event, Event::Control("arp 10.0.0.4 eth2".to_string()));
    }

    #[test]
    fn emit_frame_round_trips_through_read_event() {
        let mut buffer = Vec::new();
        emit_frame(&mut buffer, 3, &[1, 2, 3, 4]).unwrap();

        let mut framed = vec![FRAME_DISCRIMINANT];
        framed.extend_from_slice(&buffer);
        let mut cursor = Cursor::new(framed);
        let event = read_event(&mut cursor).unwrap().unwrap();
        assert_eq!(
            event,
            Event::Frame {
                ifc_num: 3,
                bytes: vec![1, 2, 3, 4]
            }
        );
    }

    #[test]
    fn emit_line_always_terminates_with_newline() {
        let mut buffer = Vec::new();
        emit_line(&mut buffer, "10.0.0.4 -> 12:34:56:78:9a:bc (eth2)").unwrap();
        assert_eq!(buffer, b"10.0.0.4 -> 12:34:56:78:9a:bc (eth2)\n");
    }

    #[test]
    fn rejects_unknown_discriminant() {
        let mut cursor = Cursor::new(vec![b'X']);
        assert!(read_event(&mut cursor).is_err());
    }

    #[test]
    fn run_dispatches_frames_and_control_lines() {
        let mut input = vec![FRAME_DISCRIMINANT];
        input.extend_from_slice(&6u16.to_be_bytes());
        input.extend_from_slice(&1u16.to_be_bytes());
        input.extend_from_slice(&[0xaa, 0xbb]);
        input.push(CONTROL_DISCRIMINANT);
        input.extend_from_slice(b"arp\n");

        let mut reader = Cursor::new(input);
        let mut writer = Vec::new();
        run(
            &mut reader,
            &mut writer,
            |ifc_num, bytes| vec![(ifc_num + 1, bytes.to_vec())],
            |_line| vec![ControlOutput::Line("ok".to_string())],
        )
        .unwrap();

        let mut expected = Vec::new();
        emit_frame(&mut expected, 2, &[0xaa, 0xbb]).unwrap();
        emit_line(&mut expected, "ok").unwrap();
        assert_eq!(writer, expected);
    }
}
