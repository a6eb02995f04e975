use std::io::{Read, Write};

pub const ALIGNMENT: usize = 4;

pub fn read_padding(src_len: usize, src: &mut impl Read) -> std::io::Result<()> {
    let pad = (ALIGNMENT - src_len % ALIGNMENT) % ALIGNMENT;
    let mut padding_buffer: [u8; ALIGNMENT] = Default::default();
    src.read_exact(&mut padding_buffer[..pad])
}

pub fn write_padding(src_len: usize, dest: &mut (impl Write + ?Sized)) -> std::io::Result<()> {
    let pad = (ALIGNMENT - src_len % ALIGNMENT) % ALIGNMENT;
    let padding_buffer: [u8; ALIGNMENT] = Default::default();
    dest.write_all(&padding_buffer[..pad])
}

pub fn invalid_data(m: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, m)
}
