/** Owns the serial connection and the background read loop */
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info};
use thiserror::Error;

use crate::keys::{Key, KeyCommand};
use crate::protocol::display::DisplayUpdate;
use crate::protocol::{FrameAssembler, Message};
use crate::status::{StatusSnapshot, StatusState, TempReading, TextReading};

/// The bus runs at a fixed rate; it is not negotiable.
pub const BAUD_RATE: u32 = 19_200;

/// A queued press only leaves during a client query window, and if the
/// controller stops polling it never does. A shallow bound keeps a wedged
/// bus from accumulating stale presses.
pub const KEY_QUEUE_DEPTH: usize = 8;

// Read timeout doubles as the cancellation check interval.
const READ_TIMEOUT: Duration = Duration::from_millis(500);
const RESTART_SETTLE: Duration = Duration::from_secs(1);

/// The fixed 8-byte broadcast the controller emits when it is ready to
/// accept a key command. Writing at any other time collides with bus
/// traffic.
const CLIENT_QUERY: [u8; 8] = [0x10, 0x02, 0x01, 0x01, 0x00, 0x14, 0x10, 0x03];

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("bridge is already running")]
    AlreadyRunning,
    #[error("bridge is not running")]
    NotRunning,
    #[error("bridge stopped after an I/O fault: {0}")]
    Faulted(String),
    #[error("key queue is full ({0} presses pending)")]
    KeyQueueFull(usize),
    #[error("failed to open serial port: {0}")]
    PortOpen(#[from] serialport::Error),
    #[error("failed to spawn reader thread: {0}")]
    Spawn(#[source] io::Error),
}

/// Byte-level connection seam. The real implementation is a serial port;
/// tests drive the loop with an in-memory double.
pub trait Wire: Read + Write + Send {}
impl<T: Read + Write + Send> Wire for T {}

/// State shared between caller threads and the reader thread. Each lock is
/// held only across its mutation, never across serial I/O.
#[derive(Default)]
struct Shared {
    status: Mutex<StatusState>,
    keys: Mutex<VecDeque<KeyCommand>>,
    cancel: AtomicBool,
    fault: Mutex<Option<String>>,
}

/// Bridges the controller's RS-485 broadcast to a queryable status cache
/// and injects simulated key presses back onto the bus.
///
/// All serial I/O happens on one background thread; callers only touch the
/// shared caches. [`Bridge::status`] hands out copies, never live
/// references.
pub struct Bridge {
    port_path: String,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Bridge {
    pub fn new(port_path: impl Into<String>) -> Self {
        Self {
            port_path: port_path.into(),
            shared: Arc::new(Shared::default()),
            worker: None,
        }
    }

    /// Opens the port and spawns the reader. A port that cannot be opened
    /// aborts the start and leaves the bridge stopped.
    pub fn start(&mut self) -> Result<(), BridgeError> {
        if self.is_running() {
            return Err(BridgeError::AlreadyRunning);
        }

        info!("opening {} at {} baud", self.port_path, BAUD_RATE);
        // TTY ports are opened exclusive by default; a second reader would
        // steal bytes mid-frame
        let port = serialport::new(&self.port_path, BAUD_RATE)
            .timeout(READ_TIMEOUT)
            .open()?;
        // the bus broadcasts continuously, so the input buffer already
        // holds a partial frame; drop it and let the framer resync
        port.clear(serialport::ClearBuffer::Input)?;

        self.spawn_reader(port)
    }

    /// Signals the reader and waits for it to exit. Idempotent; the serial
    /// handle is closed when the thread drops it, whatever the exit cause.
    pub fn stop(&mut self) {
        self.shared.cancel.store(true, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            info!("stopping reader");
            let _ = handle.join();
        }
    }

    /// Stop, let the OS and device settle, start again. The explicit path
    /// back from a fatal I/O fault.
    pub fn restart(&mut self) -> Result<(), BridgeError> {
        self.stop();
        thread::sleep(RESTART_SETTLE);
        self.start()
    }

    /// A copy of the current status. Fails with [`BridgeError::NotRunning`]
    /// before start, or [`BridgeError::Faulted`] after the loop died.
    pub fn status(&self) -> Result<StatusSnapshot, BridgeError> {
        self.check_running()?;
        Ok(self.shared.status.lock().unwrap().snapshot())
    }

    /// Queues a simulated key press for the next client query window.
    /// Returns immediately; there is no delivery confirmation.
    pub fn press_key(&self, key: Key) -> Result<(), BridgeError> {
        self.check_running()?;
        let mut keys = self.shared.keys.lock().unwrap();
        if keys.len() >= KEY_QUEUE_DEPTH {
            return Err(BridgeError::KeyQueueFull(keys.len()));
        }
        info!("queueing key press: {}", key.as_ref());
        keys.push_back(KeyCommand::new(key));
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn check_running(&self) -> Result<(), BridgeError> {
        if self.is_running() {
            return Ok(());
        }
        match self.shared.fault.lock().unwrap().clone() {
            Some(fault) => Err(BridgeError::Faulted(fault)),
            None => Err(BridgeError::NotRunning),
        }
    }

    fn spawn_reader(&mut self, mut wire: impl Wire + 'static) -> Result<(), BridgeError> {
        if self.is_running() {
            return Err(BridgeError::AlreadyRunning);
        }
        // reap a worker left behind by an earlier fault
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        *self.shared.fault.lock().unwrap() = None;
        self.shared.cancel.store(false, Ordering::SeqCst);

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("prologic-reader".into())
            .spawn(move || match read_loop(&mut wire, &shared) {
                Ok(()) => info!("reader exited"),
                Err(e) => {
                    error!("reader failed: {}", e);
                    *shared.fault.lock().unwrap() = Some(e.to_string());
                }
            })
            .map_err(BridgeError::Spawn)?;
        self.worker = Some(handle);
        info!("reader started");
        Ok(())
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Matches the client query signature one byte at a time. Any mismatch
/// resets to the start of the signature; there is no partial-match
/// rollback, mirroring how the physical keypads track the bus.
#[derive(Debug, Default)]
struct QueryWindow {
    index: usize,
}

impl QueryWindow {
    /// Returns true when the final signature byte lands.
    fn advance(&mut self, byte: u8) -> bool {
        if byte != CLIENT_QUERY[self.index] {
            self.index = 0;
            return false;
        }
        self.index += 1;
        if self.index == CLIENT_QUERY.len() {
            self.index = 0;
            return true;
        }
        false
    }
}

/// One byte per iteration: the byte feeds the query window matcher and the
/// frame assembler independently. Read timeouts are the cancellation check
/// cadence; any other I/O error is fatal and ends the loop.
fn read_loop(wire: &mut dyn Wire, shared: &Shared) -> io::Result<()> {
    let mut assembler = FrameAssembler::new();
    let mut window = QueryWindow::default();
    let mut byte = [0u8; 1];

    while !shared.cancel.load(Ordering::SeqCst) {
        match wire.read(&mut byte) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "serial port closed",
                ))
            }
            Ok(_) => {}
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                continue
            }
            Err(e) => return Err(e),
        }
        let b = byte[0];

        if window.advance(b) {
            // the only moment a write is protocol-safe
            let pending = shared.keys.lock().unwrap().pop_front();
            if let Some(command) = pending {
                debug!("query window open, writing {}", command.key().as_ref());
                wire.write_all(command.encode().as_ref())?;
                wire.flush()?;
            }
        }

        if let Some(frame) = assembler.push(b) {
            apply_message(shared, Message::decode(&frame));
        }
    }

    Ok(())
}

fn apply_message(shared: &Shared, message: Message) {
    match message {
        Message::UpdateLed(led) => shared.status.lock().unwrap().led = Some(led),
        Message::UpdateDisplay(text) => apply_display(shared, &text),
        // queries, key echoes and unclassified frames carry no state
        Message::ClientQuery
        | Message::KeyPressRelease
        | Message::Unknown
        | Message::Incomplete => {}
    }
}

fn apply_display(shared: &Shared, text: &str) {
    let update = DisplayUpdate::classify(text);
    debug!("display update: {:?}", update);
    let mut status = shared.status.lock().unwrap();
    match update {
        DisplayUpdate::AirTemp { value, unit } => {
            status.air_temp = Some(TempReading::now(value, unit));
        }
        DisplayUpdate::PoolTemp { value, unit } => {
            status.pool_temp = Some(TempReading::now(value, unit));
        }
        DisplayUpdate::SaltLevel(value) => status.salt_level = Some(TextReading::now(value)),
        DisplayUpdate::Chlorinator(value) => {
            status.pool_chlorinator = Some(TextReading::now(value));
        }
        DisplayUpdate::Banner { text, ttl } => status.board.post(&text, ttl),
    }
}
