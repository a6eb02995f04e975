//! A pass-through writer that counts the bytes it forwards.
//!
//! READDIR and READDIRPLUS replies are limited by a client-supplied byte
//! budget rather than an entry count; the handlers wrap their output in a
//! `WriteCounter` and stop appending entries when the next one would
//! overflow the budget.

use std::io::Write;

/// Counts bytes written through it.
pub struct WriteCounter<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> WriteCounter<W> {
    /// Wraps a writer with a zeroed counter.
    pub fn new(inner: W) -> WriteCounter<W> {
        WriteCounter { inner, written: 0 }
    }

    /// Bytes forwarded so far.
    pub fn bytes_written(&self) -> usize {
        self.written
    }
}

impl<W: Write> Write for WriteCounter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::WriteCounter;

    #[test]
    fn counts_forwarded_bytes() {
        let mut buf = Vec::new();
        let mut counter = WriteCounter::new(&mut buf);
        counter.write_all(b"0123").unwrap();
        counter.write_all(b"45").unwrap();
        assert_eq!(counter.bytes_written(), 6);
        assert_eq!(buf, b"012345");
    }
}
