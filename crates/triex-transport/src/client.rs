use tokio::net::{TcpStream, ToSocketAddrs};
use triex_codec::{decode_reply, encode_raw, encode_request, read_frame, write_frame};
use triex_core::{Request, Result, TrieXError};

/// Largest response the client will accept.
const MAX_RESPONSE_LEN: u64 = 64 * 1024 * 1024;

/// A persistent connection to a keyword index server.
pub struct TrieClient {
    stream: TcpStream,
}

impl TrieClient {
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }

    /// Sends a request and returns the server's reply text.
    pub async fn send(&mut self, request: &Request) -> Result<String> {
        self.send_payload(&encode_request(request)).await
    }

    /// Sends an operation by wire name, recognised or not.
    pub async fn send_raw(&mut self, operation: &str, argument: Option<&str>) -> Result<String> {
        self.send_payload(&encode_raw(operation, argument)).await
    }

    /// Sends `payload` verbatim as one frame.
    pub async fn send_payload(&mut self, payload: &[u8]) -> Result<String> {
        write_frame(&mut self.stream, payload).await?;
        let frame = read_frame(&mut self.stream, MAX_RESPONSE_LEN)
            .await?
            .ok_or_else(|| TrieXError::ProtocolViolation("server closed the connection".to_string()))?;
        decode_reply(&frame)
    }

    pub async fn add(&mut self, word: &str) -> Result<String> {
        self.send(&Request::Insert(word.to_string())).await
    }

    pub async fn delete(&mut self, word: &str) -> Result<String> {
        self.send(&Request::Delete(word.to_string())).await
    }

    pub async fn delete_all(&mut self) -> Result<String> {
        self.send(&Request::DeleteAll).await
    }

    pub async fn search(&mut self, word: &str) -> Result<String> {
        self.send(&Request::Search(word.to_string())).await
    }

    pub async fn autocomplete(&mut self, prefix: &str) -> Result<String> {
        self.send(&Request::Autocomplete(prefix.to_string())).await
    }

    pub async fn list_fast(&mut self) -> Result<String> {
        self.send(&Request::ListFast).await
    }

    pub async fn list_full(&mut self) -> Result<String> {
        self.send(&Request::ListFull).await
    }
}
