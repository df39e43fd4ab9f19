// The MIT License (MIT)
//
// Copyright (c) 2016 AT&T
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

//! Narrow capabilities the driver consumes: a transport that carries
//! messages to and from the master, and a detector that names the current
//! master. Both push into the driver through the notification handles
//! defined here, so everything a driver receives lands on one ordered queue.

mod detector;
mod local;

pub use self::detector::{parse_master_url, MasterUrl, StaticDetector};
pub use self::local::{LocalCluster, LocalDetector, LocalTransport};

use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::driver::DriverError;
use crate::proto::Message;
use crate::utils::Params;

pub(crate) enum DriverEvent {
    Message { from: String, message: Message },
    NewMaster(String),
    NoMaster,
    LinkLost(String),
    Shutdown,
}

/// Message channel between one driver and the master.
pub trait Transport: Send + Sync {
    /// Hands `message` over for delivery to the process at `to`.
    /// Must return without waiting for the peer.
    fn send(&self, to: &str, message: Message) -> Result<(), DriverError>;

    /// Installs the inbox inbound messages are pushed into and returns the
    /// address peers reply to.
    fn listen(&self, inbox: Inbox) -> Result<String, DriverError>;
}

/// Source of "current master" notifications.
pub trait MasterDetector: Send + Sync {
    /// Registers `listener`; a known master should be announced right away.
    fn subscribe(&self, listener: MasterListener) -> Result<(), DriverError>;
}

/// Where a transport pushes inbound traffic for one driver.
#[derive(Clone)]
pub struct Inbox {
    events: Sender<DriverEvent>,
}

impl Inbox {
    pub(crate) fn new(events: Sender<DriverEvent>) -> Inbox {
        Inbox { events: events }
    }

    /// Returns false once the driver no longer listens.
    pub fn deliver(&self, from: &str, message: Message) -> bool {
        self.events
            .send(DriverEvent::Message {
                from: from.to_string(),
                message: message,
            })
            .is_ok()
    }

    /// Reports that the master stayed unreachable past the retry policy.
    pub fn link_lost(&self, reason: &str) -> bool {
        self.events.send(DriverEvent::LinkLost(reason.to_string())).is_ok()
    }
}

/// Where a detector pushes master changes for one driver.
#[derive(Clone)]
pub struct MasterListener {
    events: Sender<DriverEvent>,
}

impl MasterListener {
    pub(crate) fn new(events: Sender<DriverEvent>) -> MasterListener {
        MasterListener { events: events }
    }

    pub fn new_master(&self, address: &str) -> bool {
        self.events.send(DriverEvent::NewMaster(address.to_string())).is_ok()
    }

    pub fn no_master(&self) -> bool {
        self.events.send(DriverEvent::NoMaster).is_ok()
    }
}

fn master_url(params: &Params) -> Result<MasterUrl, DriverError> {
    match params.master() {
        Some(url) => parse_master_url(&url),
        None => Err(DriverError::Config("no master given".to_string())),
    }
}

/// Builds the collaborators named by the `master` parameter.
///
/// Only `local` carries its own transport; other master URLs need one
/// injected through `MesosSchedulerDriver::with_transport`.
pub fn connect(params: &Params) -> Result<(Arc<dyn Transport>, Arc<dyn MasterDetector>), DriverError> {
    match master_url(params)? {
        MasterUrl::Local => {
            let cluster = LocalCluster::new(params)?;
            Ok((Arc::new(cluster.transport()), Arc::new(cluster.detector())))
        }
        MasterUrl::Static(address) => {
            Err(DriverError::Config(format!("no transport available for master {}; inject one", address)))
        }
        MasterUrl::ZooKeeper(_) => Err(zookeeper_unsupported()),
    }
}

/// Detector for the `master` parameter, for use with an injected transport.
pub fn detector_for(params: &Params) -> Result<Arc<dyn MasterDetector>, DriverError> {
    match master_url(params)? {
        MasterUrl::Static(address) => Ok(Arc::new(StaticDetector::new(&address))),
        MasterUrl::Local => Err(DriverError::Config("local master brings its own transport".to_string())),
        MasterUrl::ZooKeeper(_) => Err(zookeeper_unsupported()),
    }
}

fn zookeeper_unsupported() -> DriverError {
    DriverError::Config("ZooKeeper master detection is not supported".to_string())
}
