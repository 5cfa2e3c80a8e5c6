use std::cell::RefCell;
use std::io::{self, Read, Write};
use std::rc::Rc;

use super::{Mode, Stream};
use crate::error::{ParseError, StreamError};
use crate::handle::Handle;
use crate::path::StreamPath;

#[derive(Default)]
struct MemState {
    data: Vec<u8>,
    read_pos: usize,
    writes: usize,
    syncs: usize,
    closed: bool,
    fail_read: bool,
    fail_write: bool,
    short_write: bool,
    fail_sync: bool,
    fail_close: bool,
}

/// In-memory handle whose state stays inspectable after the stream takes it.
#[derive(Clone, Default)]
struct MemHandle(Rc<RefCell<MemState>>);

impl MemHandle {
    fn with_data(data: &[u8]) -> Self {
        let handle = MemHandle::default();
        handle.0.borrow_mut().data = data.to_vec();
        handle
    }

    fn state(&self) -> std::cell::RefMut<'_, MemState> {
        self.0.borrow_mut()
    }

    fn data(&self) -> Vec<u8> {
        self.0.borrow().data.clone()
    }
}

fn injected() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "injected failure")
}

impl Handle for MemHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state();
        if state.fail_read {
            return Err(injected());
        }
        let start = state.read_pos;
        let n = buf.len().min(state.data.len() - start);
        buf[..n].copy_from_slice(&state.data[start..start + n]);
        state.read_pos += n;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state();
        state.writes += 1;
        if state.fail_write {
            return Err(injected());
        }
        let n = if state.short_write { buf.len() / 2 } else { buf.len() };
        state.data.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn sync(&mut self) -> io::Result<()> {
        let mut state = self.state();
        state.syncs += 1;
        if state.fail_sync {
            return Err(injected());
        }
        Ok(())
    }

    fn close(self) -> io::Result<()> {
        let mut state = self.state();
        state.closed = true;
        if state.fail_close {
            return Err(injected());
        }
        Ok(())
    }
}

fn reader(data: &[u8], capacity: usize) -> Stream<MemHandle> {
    Stream::from_handle_with_capacity(
        StreamPath::new("mem"),
        MemHandle::with_data(data),
        capacity,
    )
}

/// A reader whose buffer is already filled, so the first parse can take the
/// resident path.
fn primed(data: &[u8], capacity: usize) -> Stream<MemHandle> {
    let mut stream = reader(data, capacity);
    if stream.refill().unwrap().is_some() {
        stream.unget_byte();
    }
    stream
}

fn writer(count: usize, capacity: usize) -> (Stream<MemHandle>, Vec<MemHandle>) {
    let mut stream = Stream::with_slots_and_capacity(count, capacity);
    let handles: Vec<MemHandle> = (0..count).map(|_| MemHandle::default()).collect();
    for (i, h) in handles.iter().enumerate() {
        stream.attach_handle(i, StreamPath::format(format_args!("dest{}", i)), h.clone());
    }
    (stream, handles)
}

/// (resident path, byte-by-byte path). The resident variant only takes the
/// fast path while the field's worst case fits in what is buffered.
fn both_paths(data: &[u8]) -> [Stream<MemHandle>; 2] {
    [primed(data, 4096), reader(data, 1)]
}

#[test]
fn token_leaves_delimiter_unread() {
    for mut s in both_paths(b"foo bar\n") {
        let mut tok = Vec::new();
        assert_eq!(s.read_token(&mut tok, 4).unwrap(), 3);
        assert_eq!(tok, b"foo");

        assert_eq!(s.read_token(&mut tok, 4).unwrap(), 0);
        assert!(tok.is_empty());

        assert_eq!(s.get_byte().unwrap(), Some(b' '));
        assert_eq!(s.read_token(&mut tok, 4).unwrap(), 3);
        assert_eq!(tok, b"bar");
        assert_eq!(s.get_byte().unwrap(), Some(b'\n'));
        assert_eq!(s.get_byte().unwrap(), None);
        assert_eq!(s.mode(), Mode::EndOfFile);
    }
}

#[test]
fn token_stops_at_tab_and_end_of_stream() {
    for mut s in both_paths(b"a\tb") {
        let mut tok = Vec::new();
        assert_eq!(s.read_token(&mut tok, 1).unwrap(), 1);
        assert_eq!(s.get_byte().unwrap(), Some(b'\t'));
        assert_eq!(s.read_token(&mut tok, 1).unwrap(), 1);
        assert_eq!(tok, b"b");
        assert_eq!(s.read_token(&mut tok, 1).unwrap(), 0);
    }
}

#[test]
fn line_strips_carriage_return() {
    for mut s in both_paths(b"abc\r\nabc\nx\ry\n") {
        let mut line = Vec::new();
        assert_eq!(s.read_line(&mut line, 4).unwrap(), 3);
        assert_eq!(line, b"abc");
        assert_eq!(s.get_byte().unwrap(), Some(b'\n'));

        assert_eq!(s.read_line(&mut line, 4).unwrap(), 3);
        assert_eq!(line, b"abc");
        assert_eq!(s.get_byte().unwrap(), Some(b'\n'));

        // Only a CR right before the newline is part of the terminator.
        assert_eq!(s.read_line(&mut line, 4).unwrap(), 3);
        assert_eq!(line, b"x\ry");
    }
}

#[test]
fn line_keeps_blanks() {
    for mut s in both_paths(b"a b\tc\n") {
        let mut line = Vec::new();
        assert_eq!(s.read_line(&mut line, 5).unwrap(), 5);
        assert_eq!(line, b"a b\tc");
    }
}

#[test]
fn trimmed_line() {
    for mut s in both_paths(b"some name \t \r\n") {
        let mut line = Vec::new();
        assert_eq!(s.read_trimmed_line(&mut line, 13).unwrap(), 9);
        assert_eq!(line, b"some name");
        assert_eq!(s.get_byte().unwrap(), Some(b'\n'));
    }
}

#[test]
fn overlong_token_is_an_error() {
    for mut s in both_paths(b"abcd ") {
        let mut tok = Vec::new();
        match s.read_token(&mut tok, 2) {
            Err(ParseError::TooLong { max: 2 }) => {}
            other => panic!("unexpected {:?}", other),
        }
        // Parse errors leave the stream usable right after the stored bytes.
        assert_eq!(s.mode(), Mode::Read);
        assert_eq!(s.get_byte().unwrap(), Some(b'c'));
    }
}

#[test]
fn token_of_exactly_max_len_fits() {
    for mut s in both_paths(b"ab cd") {
        let mut tok = Vec::new();
        assert_eq!(s.read_token(&mut tok, 2).unwrap(), 2);
        assert_eq!(tok, b"ab");
    }
}

#[test]
fn decimal_pushback() {
    let mut s = reader(b"0xyz", 4096);
    assert_eq!(s.read_u32().unwrap(), 0);
    let mut rest = Vec::new();
    s.read_token(&mut rest, 8).unwrap();
    assert_eq!(rest, b"xyz");
}

#[test]
fn decimal_needs_a_digit() {
    let mut s = reader(b"", 16);
    assert!(matches!(s.read_u32(), Err(ParseError::NoDigits)));
    assert_eq!(s.mode(), Mode::EndOfFile);

    let mut s = reader(b"x1", 16);
    assert!(matches!(s.read_u64(), Err(ParseError::NoDigits)));
    assert_eq!(s.get_byte().unwrap(), Some(b'x'));
    assert_eq!(s.read_u64().unwrap(), 1);
}

#[test]
fn decimal_across_refills() {
    let mut s = reader(b"123456789012 7", 2);
    assert_eq!(s.read_u64().unwrap(), 123456789012);
    assert_eq!(s.get_byte().unwrap(), Some(b' '));
    assert_eq!(s.read_u32().unwrap(), 7);
}

#[test]
fn decimal_wraps_without_checking() {
    let mut s = reader(b"4294967297", 64);
    assert_eq!(s.read_u32().unwrap(), 1);
}

#[test]
fn hex_decodes_either_case() {
    for mut s in both_paths(b"00ffA9\n") {
        let mut out = [0u8; 3];
        s.read_hex(&mut out).unwrap();
        assert_eq!(out, [0x00, 0xff, 0xa9]);
        assert_eq!(s.get_byte().unwrap(), Some(b'\n'));
    }
}

#[test]
fn bad_hex_consumes_all_pairs_then_fails() {
    for mut s in both_paths(b"zz41") {
        let mut out = [0u8; 2];
        assert!(matches!(s.read_hex(&mut out), Err(ParseError::InvalidHex)));
        assert_eq!(s.get_byte().unwrap(), None);
    }
}

#[test]
fn short_hex_is_eof() {
    for mut s in both_paths(b"abc") {
        let mut out = [0u8; 2];
        assert!(matches!(
            s.read_hex(&mut out),
            Err(ParseError::UnexpectedEof)
        ));
    }
}

#[test]
fn read_bytes_short_is_eof() {
    let mut s = reader(b"abc", 2);
    let mut out = [0u8; 4];
    assert!(matches!(
        s.read_bytes(&mut out),
        Err(ParseError::UnexpectedEof)
    ));
}

/// Parses a little manifest-like document and records every outcome.
fn parse_document(mut s: Stream<MemHandle>) -> Vec<String> {
    let mut log = Vec::new();
    let mut field = Vec::new();
    loop {
        match s.read_u64() {
            Ok(v) => log.push(format!("u64 {}", v)),
            Err(e) => {
                log.push(format!("u64 err {}", e));
                break;
            }
        }
        s.get_byte().unwrap();
        let mut digest = [0u8; 4];
        log.push(format!("hex {:?}", s.read_hex(&mut digest).map(|_| digest)));
        s.get_byte().unwrap();
        let token = s.read_token(&mut field, 6).map_err(|e| e.to_string());
        log.push(format!("tok {:?} {:?}", token, field));
        let line = s.read_trimmed_line(&mut field, 24).map_err(|e| e.to_string());
        log.push(format!("line {:?} {:?}", line, field));
        match s.get_byte().unwrap() {
            Some(b'\n') => {}
            other => log.push(format!("tail {:?}", other)),
        }
    }
    log
}

#[test]
fn resident_and_bytewise_paths_agree() {
    let doc = b"12 deadbeef name rest of line  \r\n\
                0 00000000 toolongtoken x\n\
                987654321 zz00ff11 n a\tb \n\
                5 0102";

    let expected = parse_document(reader(doc, 1));
    assert!(expected.iter().any(|l| l.contains("too long") || l.contains("longer")));
    for capacity in [2, 3, 7, 16, 31, 64, 4096] {
        assert_eq!(parse_document(reader(doc, capacity)), expected, "capacity {}", capacity);
        assert_eq!(parse_document(primed(doc, capacity)), expected, "primed {}", capacity);
    }
}

#[test]
fn end_of_file_is_terminal() {
    let mut s = reader(b"a", 8);
    assert_eq!(s.get_byte().unwrap(), Some(b'a'));
    assert_eq!(s.get_byte().unwrap(), None);
    assert_eq!(s.refill().unwrap(), None);
    assert_eq!(s.get_byte().unwrap(), None);
    assert_eq!(s.mode(), Mode::EndOfFile);
}

#[test]
fn read_error_faults_the_stream() {
    let handle = MemHandle::with_data(b"data");
    handle.state().fail_read = true;
    let mut s = Stream::from_handle_with_capacity(StreamPath::new("src"), handle, 8);

    assert!(matches!(s.get_byte(), Err(StreamError::Read { .. })));
    assert_eq!(s.mode(), Mode::Faulted);
    assert_eq!(s.fault_index(), Some(0));
    assert!(matches!(s.get_byte(), Err(StreamError::Faulted { index: 0 })));

    let mut tok = Vec::new();
    assert!(matches!(
        s.read_token(&mut tok, 4),
        Err(ParseError::Stream(StreamError::Faulted { .. }))
    ));
}

#[test]
fn io_read_drains_the_source() {
    let data: Vec<u8> = (0..100u8).collect();
    let mut s = reader(&data, 7);
    let mut out = Vec::new();
    s.read_to_end(&mut out).unwrap();
    assert_eq!(out, data);
}

#[test]
fn fan_out_stops_at_first_failure() {
    let (mut s, handles) = writer(3, 64);
    handles[1].state().fail_write = true;

    s.write_str("hello").unwrap();
    match s.flush() {
        Err(StreamError::Write { index: 1, .. }) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(handles[0].data(), b"hello");
    assert_eq!(handles[1].state().writes, 1);
    assert!(handles[1].data().is_empty());
    assert_eq!(handles[2].state().writes, 0);
    assert!(handles[2].data().is_empty());

    assert_eq!(s.mode(), Mode::Faulted);
    assert_eq!(s.fault_index(), Some(1));
    assert!(matches!(
        s.put_byte(b'x'),
        Err(StreamError::Faulted { index: 1 })
    ));

    assert!(s.close().is_err());
    assert!(handles.iter().all(|h| h.state().closed));
}

#[test]
fn short_write_is_a_failure() {
    let (mut s, handles) = writer(2, 64);
    handles[0].state().short_write = true;

    s.write_bytes(b"abcdef").unwrap();
    match s.flush() {
        Err(StreamError::Write { index: 0, source, .. }) => {
            assert_eq!(source.kind(), io::ErrorKind::WriteZero)
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(handles[0].data(), b"abc");
    assert_eq!(handles[1].state().writes, 0);
    assert_eq!(s.fault_index(), Some(0));
}

#[test]
fn empty_flush_does_not_touch_destinations() {
    let (mut s, handles) = writer(2, 64);
    s.flush().unwrap();
    s.flush().unwrap();
    assert!(handles.iter().all(|h| h.state().writes == 0));

    s.write_str("x").unwrap();
    s.flush().unwrap();
    s.flush().unwrap();
    s.flush().unwrap();
    assert!(handles.iter().all(|h| h.state().writes == 1));
    assert!(handles.iter().all(|h| h.data() == b"x"));
}

#[test]
fn full_buffer_flushes_on_put() {
    let (mut s, handles) = writer(2, 4);
    s.write_bytes(b"0123456789").unwrap();
    assert_eq!(handles[0].data(), b"01234567");
    assert_eq!(s.pending(), 2);

    s.close().unwrap();
    for h in &handles {
        assert_eq!(h.data(), b"0123456789");
        assert!(h.state().closed);
    }
}

#[test]
fn numbers_and_hex_written_as_text() {
    let (mut s, handles) = writer(1, 8);
    s.write_u32(0).unwrap();
    s.put_byte(b' ').unwrap();
    s.write_u64(18446744073709551615).unwrap();
    s.put_byte(b' ').unwrap();
    s.write_hex(&[0x00, 0xab, 0x7f]).unwrap();
    write!(s, " {}", 42).unwrap();
    s.close().unwrap();

    assert_eq!(handles[0].data(), b"0 18446744073709551615 00ab7f 42");
}

#[test]
fn detached_slot_faults_flush() {
    let mut s: Stream<MemHandle> = Stream::with_slots_and_capacity(2, 16);
    let first = MemHandle::default();
    s.attach_handle(0, StreamPath::new("first"), first.clone());

    s.write_str("data").unwrap();
    assert!(matches!(s.flush(), Err(StreamError::Detached { index: 1 })));
    assert_eq!(s.fault_index(), Some(1));
    assert_eq!(first.data(), b"data");

    assert!(s.close().is_err());
    assert!(first.state().closed);
}

#[test]
fn close_reports_failure_but_closes_everything() {
    let (mut s, handles) = writer(3, 16);
    handles[0].state().fail_close = true;
    s.write_str("abc").unwrap();

    match s.close() {
        Err(StreamError::Close { index: 0, .. }) => {}
        other => panic!("unexpected {:?}", other),
    }
    for h in &handles {
        assert!(h.state().closed);
        assert_eq!(h.data(), b"abc");
    }
}

#[test]
fn sync_failure_records_index() {
    let (mut s, handles) = writer(3, 16);
    handles[2].state().fail_sync = true;

    assert!(matches!(s.sync(), Err(StreamError::Sync { index: 2, .. })));
    assert_eq!(s.fault_index(), Some(2));
    assert!(handles.iter().all(|h| h.state().syncs == 1));
}

#[test]
fn wrong_mode() {
    let mut r = reader(b"abc", 8);
    assert!(matches!(
        r.flush(),
        Err(StreamError::WrongMode {
            expected: Mode::Write,
            actual: Mode::Read
        })
    ));
    assert!(r.put_byte(b'x').is_err());

    let (mut w, _handles) = writer(1, 8);
    let mut tok = Vec::new();
    assert!(matches!(
        w.read_token(&mut tok, 4),
        Err(ParseError::Stream(StreamError::WrongMode { .. }))
    ));
    assert!(w.raw_cursor().is_empty());
    assert!(!w.has_contiguous(0));
}

#[test]
fn bridge_commits_resident_bytes() {
    let mut s = primed(b"hello world", 64);
    assert!(s.has_contiguous(11));
    assert!(!s.has_contiguous(12));
    assert_eq!(s.raw_cursor(), b"hello world");
    s.commit(6);
    assert_eq!(s.raw_cursor(), b"world");
    assert_eq!(s.get_byte().unwrap(), Some(b'w'));
}

#[test]
#[should_panic(expected = "commit past the end")]
fn bridge_rejects_overrun() {
    let mut s = primed(b"abc", 64);
    s.commit(4);
}
