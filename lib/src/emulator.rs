// Copyright (c) 2022-2023 The MobileCoin Foundation

//! In-process device emulator
//!
//! Runs the `ledger-crab-core` [Dispatcher] behind the [Exchange] trait, with
//! button inputs driving the on-screen review. Deferred responses are returned
//! once the review is resolved (or times out).
//!
//! The engine clock follows wall time: elapsed ticks are applied whenever the
//! emulator is accessed, so reviews expire whether or not a host is waiting.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use log::{debug, info, trace, warn};
use tokio::{net::TcpListener, sync::oneshot};

use ledger_crab_core::{
    consts::MAX_RESP_LEN,
    dispatcher::{Dispatcher, Reply, Response},
    engine::{Config, Engine},
    review::{Button, Page, Reviewer, UiResult},
};

use crate::{
    transport::{read_frame, write_response},
    Error, Exchange, SeedDriver,
};

/// Upper bound on navigation steps when seeking a page
const MAX_NAV_STEPS: usize = 16;

/// Emulated device, cloned handles share the same device
#[derive(Clone)]
pub struct Emulator {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    dispatcher: Dispatcher<SeedDriver>,
    ui: Option<Reviewer>,
    pending: Option<oneshot::Sender<Vec<u8>>>,
    last_tick: Instant,
}

/// Request handling result
enum Handled {
    Ready(Vec<u8>),
    Pending(oneshot::Receiver<Vec<u8>>),
}

impl Emulator {
    /// Create an emulator with the default engine configuration
    pub fn new(drv: SeedDriver) -> Self {
        Self::with_config(drv, Config::default())
    }

    /// Create an emulator with the provided engine configuration
    pub fn with_config(drv: SeedDriver, cfg: Config) -> Self {
        let inner = Inner {
            dispatcher: Dispatcher::new(Engine::with_config(drv, cfg)),
            ui: None,
            pending: None,
            last_tick: Instant::now(),
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Lock the device, applying any ticks elapsed since the last access
    fn lock(&self) -> MutexGuard<'_, Inner> {
        let mut i = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        i.advance();
        i
    }

    /// Check whether a review is awaiting user input
    pub fn is_pending(&self) -> bool {
        self.lock().ui.is_some()
    }

    /// Fetch the current review page
    pub fn page(&self) -> Option<Page> {
        self.lock().ui.map(|ui| ui.page())
    }

    /// Render the current review page
    pub fn screen(&self) -> Option<String> {
        let i = self.lock();

        let ui = i.ui.as_ref()?;
        let review = i.dispatcher.engine().review()?;

        let mut s = String::new();
        ui.render(&review, &mut s).ok()?;

        Some(s)
    }

    /// Press a button, resolving the pending review on exit
    pub fn press(&self, b: Button) -> UiResult<bool> {
        let mut i = self.lock();
        let i = &mut *i;

        let r = match i.ui.as_mut() {
            Some(ui) => ui.update(b),
            None => return UiResult::None,
        };

        trace!("button {}: {:?}", b, r);

        if let UiResult::Exit(approve) = r {
            info!("review {}", if approve { "approved" } else { "rejected" });

            i.ui = None;

            let mut buff = [0u8; MAX_RESP_LEN];
            if let Some(resp) = i.dispatcher.confirm(approve, &mut buff) {
                i.respond(resp, &buff);
            }
        }

        r
    }

    /// Navigate to the approve page and confirm, returns false if no review is pending
    pub fn approve(&self) -> bool {
        self.select(Page::Approve)
    }

    /// Navigate to the reject page and confirm, returns false if no review is pending
    pub fn reject(&self) -> bool {
        self.select(Page::Reject)
    }

    fn select(&self, target: Page) -> bool {
        for _ in 0..MAX_NAV_STEPS {
            match self.page() {
                None => return false,
                Some(p) if p == target => return self.press(Button::Both).is_exit(),
                // Approve precedes reject
                Some(Page::Reject) => self.press(Button::Left),
                Some(_) => self.press(Button::Right),
            };
        }

        false
    }

    /// Bring the engine clock up to date, resolving timed out reviews
    pub fn tick(&self) {
        drop(self.lock());
    }

    fn tick_period(&self) -> Duration {
        self.lock().tick_period()
    }

    fn handle(&self, command: &[u8]) -> Handled {
        let mut i = self.lock();
        let i = &mut *i;

        let mut buff = [0u8; MAX_RESP_LEN];

        match i.dispatcher.handle(command, &mut buff) {
            Reply::Ready(r) => Handled::Ready(buff[..r.len].to_vec()),
            Reply::Pending => {
                i.ui = i.dispatcher.engine().review().map(|r| Reviewer::new(&r));

                let (tx, rx) = oneshot::channel();
                i.pending = Some(tx);

                debug!("review pending");

                Handled::Pending(rx)
            }
        }
    }

    /// Serve APDU requests over TCP using the speculos framing
    ///
    /// Connections are handled sequentially, as with a physical device.
    pub async fn serve(self, listener: TcpListener) -> Result<(), Error> {
        loop {
            let (mut s, addr) = listener.accept().await?;
            info!("connection from {}", addr);

            while let Some(req) = read_frame(&mut s).await? {
                let resp = match self.await_response(&req, None).await {
                    Ok(r) => r,
                    Err(e) => {
                        warn!("request failed: {}", e);
                        break;
                    }
                };

                write_response(&mut s, &resp).await?;
            }

            info!("connection closed");
        }
    }

    async fn await_response(
        &self,
        command: &[u8],
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>, Error> {
        let mut rx = match self.handle(command) {
            Handled::Ready(r) => return Ok(r),
            Handled::Pending(rx) => rx,
        };

        let mut ticker = tokio::time::interval(self.tick_period());

        let wait = async {
            loop {
                tokio::select! {
                    r = &mut rx => return r.map_err(|_| Error::UnexpectedResponse),
                    _ = ticker.tick() => self.tick(),
                }
            }
        };

        match timeout {
            Some(t) => tokio::time::timeout(t, wait).await?,
            None => wait.await,
        }
    }
}

impl Inner {
    fn tick_period(&self) -> Duration {
        let ticks_per_s = self.dispatcher.engine().config().ticks_per_s.max(1);
        Duration::from_millis((1000 / ticks_per_s as u64).max(1))
    }

    /// Apply platform ticks for the time elapsed since the last update
    fn advance(&mut self) {
        let period = self.tick_period();
        let elapsed = self.last_tick.elapsed();

        // Idle time does not count towards the next review
        if !self.dispatcher.engine().is_pending() {
            self.last_tick = Instant::now();
            return;
        }

        let n = elapsed.as_millis() / period.as_millis();
        if n == 0 {
            return;
        }
        self.last_tick += period * n.min(u32::MAX as u128) as u32;

        // Ticks beyond the approval timeout have no further effect
        let cfg = self.dispatcher.engine().config();
        let max = cfg
            .approval_timeout_s
            .saturating_mul(cfg.ticks_per_s)
            .saturating_add(1);

        let mut buff = [0u8; MAX_RESP_LEN];
        for _ in 0..n.min(max as u128) {
            if let Some(resp) = self.dispatcher.tick(&mut buff) {
                warn!("review timed out");

                self.ui = None;
                self.respond(resp, &buff);
                break;
            }
        }
    }

    /// Forward a resolved response to the waiting request
    fn respond(&mut self, resp: Response, buff: &[u8]) {
        match self.pending.take() {
            Some(tx) => {
                let _ = tx.send(buff[..resp.len].to_vec());
            }
            None => debug!("no request awaiting response"),
        }
    }
}

#[async_trait]
impl Exchange for Emulator {
    async fn exchange(&mut self, command: &[u8], timeout: Duration) -> Result<Vec<u8>, Error> {
        trace!("TX: {:02x?}", command);

        let r = self.await_response(command, Some(timeout)).await?;

        trace!("RX: {:02x?}", r);

        Ok(r)
    }
}
