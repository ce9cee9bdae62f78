use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use xxhash_rust::xxh3::xxh3_128;

/// Block size used when streaming bytes through the content digest.
pub const BLOCK_SIZE: usize = 4096;

/// Hex length of a SHA-256 content digest.
pub const CONTENT_DIGEST_LEN: usize = 64;

pub fn content_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// 128-bit digest over the hex text of a content digest. Only used to name files on disk.
pub fn name_digest(content_digest: &str) -> String {
    format!("{:032x}", xxh3_128(content_digest.to_lowercase().as_bytes()))
}

pub async fn content_digest_from_reader<R: AsyncRead + Unpin>(
    mut reader: R,
) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; BLOCK_SIZE];
    loop {
        let n = reader.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Copies `reader` into `writer` block by block while hashing.
/// Returns the content digest and the number of bytes written.
pub async fn copy_with_digest<R, W>(mut reader: R, writer: &mut W) -> std::io::Result<(String, u64)>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; BLOCK_SIZE];
    let mut written = 0u64;
    loop {
        let n = reader.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
        writer.write_all(&buffer[..n]).await?;
        written += n as u64;
    }
    writer.flush().await?;
    Ok((hex::encode(hasher.finalize()), written))
}

pub fn is_content_digest(candidate: &str) -> bool {
    candidate.len() == CONTENT_DIGEST_LEN && candidate.chars().all(|c| c.is_ascii_hexdigit())
}
