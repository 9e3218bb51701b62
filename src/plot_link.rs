use std::future::pending;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::select;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::config::LinkConfig;
use crate::emitter::SampleEmitter;
use crate::link::link_controller::{InboundChannel, InputHandler, LinkController};
use crate::link::link_state::LinkState;
use crate::link::resolver::{DnsResolver, NameResolver};
use crate::transport::local::{spawn_line_reader, WriterLineSink};
use crate::transport::selector::TransportSelector;
use crate::transport::udp::UdpChannel;
use crate::transport::LineSink;
use crate::util::clock::{Clock, MonotonicClock};


/// Owns the link state and wires the transports, the handshake logic and the emitter together.
///  [PlotLink::run] drives the inbound side; emitting works whether or not it is running.
pub struct PlotLink {
    config: Arc<LinkConfig>,
    link_state: Arc<Mutex<LinkState>>,
    udp: Arc<UdpChannel>,
    controller: LinkController,
    emitter: SampleEmitter,
    cancel_sender: watch::Sender<bool>,
}
impl PlotLink {
    /// Local output goes to stdout, host names are resolved through DNS
    pub async fn new(config: LinkConfig) -> anyhow::Result<PlotLink> {
        Self::with_collaborators(
            config,
            Arc::new(WriterLineSink::stdout()),
            Arc::new(DnsResolver),
            Arc::new(MonotonicClock::new()),
        ).await
    }

    /// Binding the UDP listener is attempted right away. Failure is not an error: `run` keeps
    ///  retrying, and output goes to the local channel in the meantime.
    pub async fn with_collaborators(config: LinkConfig, local: Arc<dyn LineSink>, resolver: Arc<dyn NameResolver>, clock: Arc<dyn Clock>) -> anyhow::Result<PlotLink> {
        config.validate()?;
        let config = Arc::new(config);

        let link_state: Arc<Mutex<LinkState>> = Default::default();
        let udp = Arc::new(UdpChannel::new(&config));
        let selector = Arc::new(TransportSelector::new(link_state.clone(), udp.clone(), local));
        let controller = LinkController::new(link_state.clone(), selector.clone(), resolver);
        let emitter = SampleEmitter::new(selector, clock, &config);
        let (cancel_sender, _) = watch::channel(false);

        udp.try_bind().await;

        Ok(PlotLink {
            config,
            link_state,
            udp,
            controller,
            emitter,
            cancel_sender,
        })
    }

    pub fn emitter(&self) -> &SampleEmitter {
        &self.emitter
    }

    /// Registers the consumer for received lines that are not handshake commands, replacing
    ///  any previously registered one
    pub async fn on_input_received(&self, handler: impl InputHandler + 'static) {
        self.controller.set_input_handler(Arc::new(handler)).await;
    }

    pub async fn link_state(&self) -> LinkState {
        *self.link_state.lock().await
    }

    pub async fn is_linked(&self) -> bool {
        self.link_state.lock().await.is_linked()
    }

    pub async fn is_udp_available(&self) -> bool {
        self.udp.is_available().await
    }

    pub async fn udp_local_addr(&self) -> Option<SocketAddr> {
        self.udp.local_addr().await
    }

    /// Receives datagrams and (if present) local lines until [PlotLink::cancel] is called,
    ///  retrying to bind the UDP listener while it is unavailable. Inbound messages are
    ///  processed one at a time.
    pub async fn run(&self, mut local_lines: Option<mpsc::Receiver<String>>) -> anyhow::Result<()> {
        let mut cancel_receiver = self.cancel_sender.subscribe();

        let mut bind_retry_ticks = time::interval(self.config.bind_retry_interval);
        bind_retry_ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        bind_retry_ticks.tick().await;

        let mut buf = vec![0u8; self.config.max_datagram_size];
        let mut socket = self.udp.socket().await;

        trace!("starting receive loop");

        loop {
            select! {
                _ = bind_retry_ticks.tick(), if socket.is_none() => {
                    if self.udp.try_bind().await {
                        info!("UDP listener available after retry");
                        socket = self.udp.socket().await;
                    }
                }
                r = recv_datagram(socket.as_deref(), &mut buf) => {
                    match r {
                        Ok((len, from)) => {
                            let received = String::from_utf8_lossy(&buf[..len]);
                            self.controller.on_line_received(&received, InboundChannel::Udp(from)).await;
                        }
                        Err(e) => {
                            warn!("error receiving UDP datagram: {}", e);
                        }
                    }
                }
                line = recv_local(&mut local_lines) => {
                    match line {
                        Some(line) => self.controller.on_line_received(&line, InboundChannel::Local).await,
                        None => {
                            debug!("local input closed");
                            local_lines = None;
                        }
                    }
                }
                _ = cancelled(&mut cancel_receiver) => break,
            }
        }

        trace!("receive loop stopped");
        Ok(())
    }

    /// Runs with local lines read from stdin
    pub async fn run_with_stdin(&self) -> anyhow::Result<()> {
        let local_lines = spawn_line_reader(tokio::io::stdin(), self.config.local_line_capacity);
        self.run(Some(local_lines)).await
    }

    /// Cancellation is permanent: a running loop stops, and a later call to `run` returns
    ///  right away.
    pub fn cancel(&self) {
        if self.cancel_sender.send_replace(true) {
            debug!("receive loop was already cancelled");
        }
    }
}

async fn recv_datagram(socket: Option<&UdpSocket>, buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)> {
    match socket {
        Some(socket) => socket.recv_from(buf).await,
        None => pending().await,
    }
}

async fn cancelled(cancel_receiver: &mut watch::Receiver<bool>) {
    let _ = cancel_receiver.wait_for(|cancelled| *cancelled).await;
}

async fn recv_local(local_lines: &mut Option<mpsc::Receiver<String>>) -> Option<String> {
    match local_lines {
        Some(lines) => lines.recv().await,
        None => pending().await,
    }
}
