use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, Chain, Cursor, Read};
use std::path::Path;

/// Compression detected from the first bytes of an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Zstd,
    None,
}

/// Detect compression format by magic bytes: gzip (1F 8B 08) or zstd (28 B5 2F FD)
pub fn detect_compression(head: &[u8]) -> Compression {
    if head.len() >= 3 && head[0] == 0x1F && head[1] == 0x8B && head[2] == 0x08 {
        Compression::Gzip
    } else if head.len() >= 4 && head[..4] == [0x28, 0xB5, 0x2F, 0xFD] {
        Compression::Zstd
    } else {
        Compression::None
    }
}

/// Wrap any reader so gzip and zstd streams are decompressed transparently.
/// Plain input passes through unchanged.
pub fn maybe_decompress<R: Read + Send + 'static>(mut reader: R) -> io::Result<Box<dyn Read + Send>> {
    let mut head = [0u8; 4];
    let n = read_head(&mut reader, &mut head)?;

    // Put the read bytes back in front using a cursor chain
    let prefix = Cursor::new(head[..n].to_vec());
    let chained: Chain<Cursor<Vec<u8>>, R> = prefix.chain(reader);

    match detect_compression(&head[..n]) {
        Compression::Gzip => Ok(Box::new(MultiGzDecoder::new(chained))),
        Compression::Zstd => Ok(Box::new(zstd::Decoder::new(chained)?)),
        Compression::None => Ok(Box::new(chained)),
    }
}

/// Open a file (or stdin for "-") with transparent decompression
pub fn open_input(path: &str) -> io::Result<Box<dyn Read + Send>> {
    if path == "-" {
        return maybe_decompress(io::stdin());
    }

    let file = File::open(Path::new(path))?;
    maybe_decompress(file)
}

/// Fill as much of `buf` as the reader allows; short reads are retried until EOF
fn read_head<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
