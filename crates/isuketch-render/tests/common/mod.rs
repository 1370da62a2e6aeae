//! In-process Redis stand-in speaking just enough RESP for the render cache.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// Behavior switches for [`FakeRedis`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeRedisOptions {
    /// Close the first client connection right after it answers one `GET`.
    pub drop_first_connection_after_get: bool,
    /// Answer every `SET`/`SETEX` with an error reply.
    pub reject_writes: bool,
}

#[derive(Default)]
struct Shared {
    store: Mutex<HashMap<String, Vec<u8>>>,
    connections: AtomicUsize,
    writes: AtomicUsize,
}

/// A RESP server on an ephemeral port, backed by a `HashMap`.
pub struct FakeRedis {
    addr: SocketAddr,
    shared: Arc<Shared>,
}

impl FakeRedis {
    pub async fn start(options: FakeRedisOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shared = Arc::new(Shared::default());

        let server = shared.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let index = server.connections.fetch_add(1, Ordering::SeqCst);
                let drop_after_get = options.drop_first_connection_after_get && index == 0;
                tokio::spawn(serve(stream, server.clone(), options, drop_after_get));
            }
        });

        Self { addr, shared }
    }

    pub fn url(&self) -> String {
        format!("redis://{}/", self.addr)
    }

    /// Remove a key, as another Redis client would with `DEL`.
    pub fn delete(&self, key: &str) -> bool {
        self.shared.store.lock().unwrap().remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.shared.store.lock().unwrap().contains_key(key)
    }

    pub fn connections(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }

    /// Write commands received, accepted or not.
    pub fn writes(&self) -> usize {
        self.shared.writes.load(Ordering::SeqCst)
    }
}

async fn serve(stream: TcpStream, shared: Arc<Shared>, options: FakeRedisOptions, drop_after_get: bool) {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);

    while let Some(args) = read_command(&mut reader).await {
        let Some(name) = args.first().map(|n| String::from_utf8_lossy(n).to_ascii_uppercase()) else {
            return;
        };
        let key = args.get(1).map(|k| String::from_utf8_lossy(k).into_owned());

        let reply = match (name.as_str(), key) {
            ("GET", Some(key)) => match shared.store.lock().unwrap().get(&key) {
                Some(value) => bulk(value),
                None => b"$-1\r\n".to_vec(),
            },
            ("SET" | "SETEX", Some(_)) if options.reject_writes => {
                shared.writes.fetch_add(1, Ordering::SeqCst);
                b"-ERR writes are disabled\r\n".to_vec()
            }
            // SET key value [...] / SETEX key seconds value
            ("SET", Some(key)) if args.len() >= 3 => {
                shared.writes.fetch_add(1, Ordering::SeqCst);
                shared.store.lock().unwrap().insert(key, args[2].clone());
                b"+OK\r\n".to_vec()
            }
            ("SETEX", Some(key)) if args.len() == 4 => {
                shared.writes.fetch_add(1, Ordering::SeqCst);
                shared.store.lock().unwrap().insert(key, args[3].clone());
                b"+OK\r\n".to_vec()
            }
            ("DEL", _) => {
                let mut store = shared.store.lock().unwrap();
                let removed = args[1..]
                    .iter()
                    .filter(|k| store.remove(&*String::from_utf8_lossy(k)).is_some())
                    .count();
                format!(":{removed}\r\n").into_bytes()
            }
            ("PING", _) => b"+PONG\r\n".to_vec(),
            // CLIENT SETINFO and other connection setup.
            _ => b"+OK\r\n".to_vec(),
        };

        if write.write_all(&reply).await.is_err() {
            return;
        }
        if drop_after_get && name == "GET" {
            return;
        }
    }
}

fn bulk(value: &[u8]) -> Vec<u8> {
    let mut out = format!("${}\r\n", value.len()).into_bytes();
    out.extend_from_slice(value);
    out.extend_from_slice(b"\r\n");
    out
}

/// Read one RESP array of bulk strings. `None` on EOF or malformed input.
async fn read_command<R: AsyncBufRead + Unpin>(reader: &mut R) -> Option<Vec<Vec<u8>>> {
    let mut line = String::new();
    if reader.read_line(&mut line).await.ok()? == 0 {
        return None;
    }
    let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;

    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        reader.read_line(&mut line).await.ok()?;
        let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;

        let mut buf = vec![0; len + 2];
        reader.read_exact(&mut buf).await.ok()?;
        buf.truncate(len);
        args.push(buf);
    }
    Some(args)
}
