//! UDP multicast binding for the hop ports.
//!
//! One publisher or subscriber per logical channel. Delivery is best effort:
//! nothing here retries, reorders or deduplicates.

use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use trackcore::model::{DelayCalcTrackData, FinalCalcTrackData, TrackData};
use trackcore::ports::{DelayDataReceiver, FinalDataSender, TrackDataSender};
use trackcore::prelude::{Clock, SystemClock, TrackResult};
use trackcore::wire::{Envelope, TrackFrame, MAX_DATAGRAM_LEN};

use crate::workflow::config::{ChannelConfig, TransportConfig};

fn open_publish_socket(transport: &TransportConfig) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_multicast_ttl_v4(transport.ttl)?;
    socket.set_multicast_loop_v4(transport.loopback)?;
    if !transport.interface.is_unspecified() {
        socket.set_multicast_if_v4(&transport.interface)?;
    }
    let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0));
    socket.bind(&bind_addr.into())?;
    Ok(socket.into())
}

fn open_subscribe_socket(
    channel: &ChannelConfig,
    transport: &TransportConfig,
) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, channel.port));
    socket.bind(&bind_addr.into())?;

    let socket: UdpSocket = socket.into();
    socket.join_multicast_v4(&channel.group, &transport.interface)?;
    socket.set_read_timeout(Some(transport.read_timeout()))?;
    log::debug!(
        "[multicast] joined {} ({}) on interface {}",
        channel.target(),
        channel.name,
        transport.interface
    );
    Ok(socket)
}

/// Publishes every record handed to it on one channel.
pub struct MulticastPublisher {
    socket: UdpSocket,
    channel: String,
    target: SocketAddrV4,
    clock: SystemClock,
}

impl MulticastPublisher {
    pub fn open(channel: &ChannelConfig, transport: &TransportConfig) -> io::Result<Self> {
        let socket = open_publish_socket(transport)?;
        log::debug!(
            "[multicast] publishing {} on {}",
            channel.name,
            channel.target()
        );
        Ok(Self {
            socket,
            channel: channel.name.clone(),
            target: channel.target(),
            clock: SystemClock,
        })
    }

    fn publish(&mut self, frame: TrackFrame) -> TrackResult<()> {
        let envelope = Envelope::new(self.channel.as_str(), self.clock.now_micros(), frame);
        let bytes = envelope.encode()?;
        self.socket.send_to(&bytes, self.target)?;
        Ok(())
    }
}

impl TrackDataSender for MulticastPublisher {
    fn send_track(&mut self, data: &TrackData) -> TrackResult<()> {
        self.publish(TrackFrame::Track(data.clone()))
    }
}

impl DelayDataReceiver for MulticastPublisher {
    fn on_data_received(&mut self, data: &DelayCalcTrackData) -> TrackResult<()> {
        self.publish(TrackFrame::DelayCalc(data.clone()))
    }
}

impl FinalDataSender for MulticastPublisher {
    fn send_data(&mut self, data: &FinalCalcTrackData) -> TrackResult<()> {
        self.publish(TrackFrame::FinalCalc(data.clone()))
    }
}

/// Receives envelopes published on one channel.
pub struct MulticastSubscriber {
    socket: UdpSocket,
    channel: String,
    buffer: Vec<u8>,
}

impl MulticastSubscriber {
    pub fn open(channel: &ChannelConfig, transport: &TransportConfig) -> io::Result<Self> {
        let socket = open_subscribe_socket(channel, transport)?;
        Ok(Self {
            socket,
            channel: channel.name.clone(),
            buffer: vec![0u8; MAX_DATAGRAM_LEN],
        })
    }

    /// Waits up to the read timeout for one datagram.
    ///
    /// `Ok(None)` on timeout or for envelopes from another channel sharing the
    /// group. A datagram that fails to decode is an `Err` for that message only.
    pub fn recv(&mut self) -> TrackResult<Option<Envelope>> {
        let len = match self.socket.recv_from(&mut self.buffer) {
            Ok((len, _)) => len,
            Err(err)
                if err.kind() == io::ErrorKind::WouldBlock
                    || err.kind() == io::ErrorKind::TimedOut =>
            {
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        Envelope::decode_for(&self.channel, &self.buffer[..len])
    }
}
