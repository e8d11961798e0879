//! Async client for a Lockit server.
//!
//! One `Client` holds one TCP connection and sends requests on it one at
//! a time.  The client moves opaque bytes only; encrypting before `create`
//! and decrypting after `retrieve` is the caller's job (see `cli::commands`).

pub mod link;

use chrono::{DateTime, Utc};
use tokio::io::BufReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use zeroize::Zeroizing;

use crate::errors::{LockitError, Result};
use crate::service::{Request, Response};
use crate::transport::{frame_limit, read_message, write_message};
use crate::vault::{Delivery, Receipt};

pub use link::ShareLink;

/// Largest payload the client is willing to receive (64 MiB).
const MAX_RESPONSE_PAYLOAD: usize = 64 * 1024 * 1024;

/// Status of a message as reported by `peek`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageStatus {
    pub password_required: bool,
    pub burn_after_reading: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A connection to a Lockit server.
pub struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    /// Connect to `address` (e.g. `127.0.0.1:7878`).
    pub async fn connect(address: &str) -> Result<Self> {
        let stream = TcpStream::connect(address).await.map_err(|e| {
            LockitError::CommandFailed(format!("cannot reach server at {address}: {e}"))
        })?;
        let (read_half, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer,
        })
    }

    /// Send one request and wait for its response.
    ///
    /// Error responses are returned as `Ok(Response::Error { .. })`; the
    /// typed helpers below turn them into `LockitError`s.
    pub async fn request(&mut self, request: &Request) -> Result<Response> {
        write_message(&mut self.writer, request).await?;
        read_message(&mut self.reader, frame_limit(MAX_RESPONSE_PAYLOAD))
            .await?
            .ok_or_else(|| LockitError::Protocol("server closed the connection".into()))
    }

    /// Upload `payload` and return the issued reference.
    pub async fn create(
        &mut self,
        payload: Vec<u8>,
        ttl_seconds: Option<u64>,
        burn_after_reading: bool,
        password: Option<&str>,
    ) -> Result<Receipt> {
        let request = Request::Create {
            payload,
            ttl_seconds,
            burn_after_reading,
            password: password.map(|p| Zeroizing::new(p.to_string())),
        };
        match self.request(&request).await?.into_result()? {
            Response::Created {
                reference,
                expires_at,
            } => Ok(Receipt {
                reference,
                expires_at,
            }),
            other => Err(unexpected(&other)),
        }
    }

    /// Redeem `reference`.
    pub async fn retrieve(&mut self, reference: &str, password: Option<&str>) -> Result<Delivery> {
        let request = Request::Retrieve {
            reference: reference.to_string(),
            password: password.map(|p| Zeroizing::new(p.to_string())),
        };
        match self.request(&request).await?.into_result()? {
            Response::Payload {
                payload,
                view_count,
            } => Ok(Delivery {
                payload,
                view_count,
            }),
            other => Err(unexpected(&other)),
        }
    }

    /// Check `reference` without consuming it.
    pub async fn peek(&mut self, reference: &str) -> Result<MessageStatus> {
        let request = Request::Peek {
            reference: reference.to_string(),
        };
        match self.request(&request).await?.into_result()? {
            Response::Peeked {
                password_required,
                burn_after_reading,
                expires_at,
            } => Ok(MessageStatus {
                password_required,
                burn_after_reading,
                expires_at,
            }),
            other => Err(unexpected(&other)),
        }
    }
}

fn unexpected(response: &Response) -> LockitError {
    let kind = match response {
        Response::Created { .. } => "created",
        Response::Payload { .. } => "payload",
        Response::Peeked { .. } => "peeked",
        Response::Error { .. } => "error",
    };
    LockitError::Protocol(format!("unexpected '{kind}' response"))
}
