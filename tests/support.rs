use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::process::{Command, Output};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Scripted behavior for the mock server.
#[derive(Debug, Clone, Copy)]
pub enum ResponseScript {
    /// 200 for every request.
    AlwaysOk,
    /// 200 for the first `ok` requests, then `status` with
    /// `Location: /blocked`.
    OkThenBlocked { ok: usize, status: u16 },
    /// 307 with a `Location` that is not the blocked page.
    RedirectElsewhere,
    /// A status outside the success/redirect contract.
    Teapot,
}

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a lightweight scripted HTTP server for tests.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_http_server(script: ResponseScript) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let counter = Arc::new(AtomicUsize::new(0));

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    let ordinal = counter.fetch_add(1, Ordering::SeqCst).saturating_add(1);
                    thread::spawn(move || handle_client(stream, script, ordinal));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

/// Spawn the scripted server, skipping (with a note) in sandboxes that
/// forbid binding sockets.
///
/// # Errors
///
/// Returns an error for any failure other than a denied bind.
pub fn spawn_http_server_or_skip(
    script: ResponseScript,
) -> Result<Option<(String, ServerHandle)>, String> {
    match spawn_http_server(script) {
        Ok(result) => Ok(Some(result)),
        Err(err) if err.contains("Operation not permitted") => {
            eprintln!("Skipping e2e test: {}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn handle_client(mut stream: TcpStream, script: ResponseScript, ordinal: usize) {
    let mut buffer = [0u8; 2048];
    if stream.read(&mut buffer).is_err() {
        return;
    }

    let response = match script {
        ResponseScript::AlwaysOk => ok_response(),
        ResponseScript::OkThenBlocked { ok, status } => {
            if ordinal <= ok {
                ok_response()
            } else {
                redirect_response(status, "/blocked")
            }
        }
        ResponseScript::RedirectElsewhere => redirect_response(307, "/login"),
        ResponseScript::Teapot => {
            "HTTP/1.1 418 I'm a teapot\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_owned()
        }
    };

    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

fn ok_response() -> String {
    "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK".to_owned()
}

fn redirect_response(status: u16, location: &str) -> String {
    let reason = match status {
        302 => "Found",
        308 => "Permanent Redirect",
        _ => "Temporary Redirect",
    };
    format!(
        "HTTP/1.1 {} {}\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        status, reason, location
    )
}

/// Returns an address nothing is listening on, for connection-refused
/// tests.
///
/// # Errors
///
/// Returns an error if a probe listener cannot be bound.
pub fn unreachable_url() -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind probe listener failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("probe addr failed: {}", err))?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

/// Run the `limitprobe` binary and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_limitprobe<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = limitprobe_bin()?;
    Command::new(bin)
        .args(args)
        .env("RUST_LOG", "error")
        .output()
        .map_err(|err| format!("run limitprobe failed: {}", err))
}

fn limitprobe_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_limitprobe").map_or_else(
        || Err("CARGO_BIN_EXE_limitprobe missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
