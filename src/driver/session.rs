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

use std::collections::HashMap;
use std::sync::mpsc::Sender;

use chrono::{DateTime, Utc};

use crate::collaborator::{DriverEvent, Transport};
use crate::proto::{FrameworkID, FrameworkInfo, FrameworkMessage, Message, OfferID, TaskDescription, TaskID};
use crate::utils::Params;

use super::error::DriverError;
use super::offer_list::OfferList;
use super::state::DriverState;

/// Everything the driver's exclusive region guards, apart from the
/// scheduler itself. Commands are methods here so that the owning driver
/// and the handle given to callbacks apply them identically.
pub struct Session {
    pub state: DriverState,
    /// `start()` is waiting for the first master.
    pub connecting: bool,
    pub master: Option<String>,
    pub framework_id: FrameworkID,
    /// Next registration takes over an existing identity.
    pub failover: bool,
    pub registered: bool,
    pub offers: OfferList,
    pub params: Params,
    pub address: Option<String>,
    events: Option<Sender<DriverEvent>>,
    pub started_at: Option<DateTime<Utc>>,
    pub messages_sent: u64,
    pub events_delivered: u64,
}

impl Session {
    pub fn new(params: Params, framework_id: Option<FrameworkID>) -> Session {
        let framework_id = framework_id.unwrap_or_default();
        Session {
            state: DriverState::NotStarted,
            connecting: false,
            master: None,
            failover: !framework_id.is_empty(),
            framework_id: framework_id,
            registered: false,
            offers: OfferList::new(),
            params: params,
            address: None,
            events: None,
            started_at: None,
            messages_sent: 0,
            events_delivered: 0,
        }
    }

    pub fn registration_message(&self, framework: FrameworkInfo) -> Message {
        if self.framework_id.is_empty() {
            Message::RegisterFramework { framework: framework }
        } else {
            Message::ReregisterFramework {
                framework_id: self.framework_id.clone(),
                framework: framework,
                failover: self.failover,
            }
        }
    }

    /// Hands a message to the transport, addressed to the current master.
    pub fn send(&mut self, transport: &dyn Transport, message: Message) -> Result<(), DriverError> {
        let master = match self.master {
            Some(ref master) => master.clone(),
            None => return Err(DriverError::NotRegistered),
        };
        debug!("sending {} to {}", message.name(), master);
        transport.send(&master, message)?;
        self.messages_sent += 1;
        Ok(())
    }

    fn check_registered(&self) -> Result<(), DriverError> {
        if self.state != DriverState::Running {
            Err(DriverError::NotRunning)
        } else if !self.registered {
            Err(DriverError::NotRegistered)
        } else {
            Ok(())
        }
    }

    pub fn reply_to_offer(&mut self,
                          transport: &dyn Transport,
                          offer_id: OfferID,
                          tasks: Vec<TaskDescription>,
                          params: HashMap<String, String>)
                          -> Result<(), DriverError> {
        self.check_registered()?;
        self.offers.validate_reply(&offer_id, &tasks)?;

        let message = Message::ReplyToOffer {
            framework_id: self.framework_id.clone(),
            offer_id: offer_id.clone(),
            tasks: tasks,
            params: params,
        };
        self.send(transport, message)?;
        self.offers.remove_offer(&offer_id);
        Ok(())
    }

    pub fn kill_task(&mut self, transport: &dyn Transport, task_id: TaskID) -> Result<(), DriverError> {
        self.check_registered()?;
        let message = Message::KillTask {
            framework_id: self.framework_id.clone(),
            task_id: task_id,
        };
        self.send(transport, message)
    }

    pub fn send_framework_message(&mut self,
                                  transport: &dyn Transport,
                                  message: FrameworkMessage)
                                  -> Result<(), DriverError> {
        self.check_registered()?;
        let message = Message::FrameworkMessage {
            framework_id: self.framework_id.clone(),
            message: message,
        };
        self.send(transport, message)
    }

    pub fn revive_offers(&mut self, transport: &dyn Transport) -> Result<(), DriverError> {
        self.check_registered()?;
        let message = Message::ReviveOffers { framework_id: self.framework_id.clone() };
        self.send(transport, message)
    }

    pub fn send_hints(&mut self, transport: &dyn Transport, hints: HashMap<String, String>) -> Result<(), DriverError> {
        self.check_registered()?;
        let message = Message::SendHints {
            framework_id: self.framework_id.clone(),
            hints: hints,
        };
        self.send(transport, message)
    }

    /// Moves a running driver to `Stopped`, telling the master first if a
    /// session is established. Callers wake joiners afterwards.
    pub fn stop(&mut self, transport: &dyn Transport) -> Result<DriverState, DriverError> {
        if self.state != DriverState::Running {
            return Err(DriverError::NotRunning);
        }

        if self.registered {
            let message = Message::UnregisterFramework { framework_id: self.framework_id.clone() };
            if let Err(err) = self.send(transport, message) {
                warn!("could not unregister framework {}: {}", self.framework_id, err);
            }
        }

        info!("driver for framework {} stopped", self.framework_id);
        self.state = DriverState::Stopped;
        self.finish();
        Ok(DriverState::Stopped)
    }

    pub fn abort(&mut self) {
        self.state = DriverState::Aborted;
        self.finish();
    }

    pub(crate) fn attach_dispatcher(&mut self, events: Sender<DriverEvent>) {
        self.events = Some(events);
    }

    /// Ends the dispatcher once it drains what is already queued.
    pub fn shutdown_dispatcher(&mut self) {
        if let Some(events) = self.events.take() {
            let _ = events.send(DriverEvent::Shutdown);
        }
    }

    fn finish(&mut self) {
        self.registered = false;
        self.offers.invalidate_all();
        self.shutdown_dispatcher();
    }
}
