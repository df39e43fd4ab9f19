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

use std::cell::RefCell;
use std::collections::HashMap;
use std::env;
use std::sync::mpsc::channel;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::collaborator::{self, Inbox, MasterDetector, MasterListener, Transport};
use crate::proto::{FrameworkID, FrameworkInfo, FrameworkMessage, OfferID, TaskDescription, TaskID};
use crate::scheduler::Scheduler;
use crate::utils::Params;

use super::dispatch;
use super::error::DriverError;
use super::reentrancy::{self, CallbackScope};
use super::session::Session;
use super::state::DriverState;
use super::SchedulerDriver;

const DEFAULT_MASTER_DETECT_TIMEOUT_SECS: u64 = 10;

/// State shared by the driver handle and its dispatcher thread.
pub struct Shared {
    pub id: usize,
    pub guarded: Mutex<Guarded>,
    /// Signalled on master detection and on every move to a terminal state.
    pub cond: Condvar,
    pub transport: Arc<dyn Transport>,
    pub detector: Arc<dyn MasterDetector>,
    master_detect_timeout: Duration,
}

pub struct Guarded {
    pub session: Session,
    pub scheduler: Box<dyn Scheduler>,
}

impl Guarded {
    /// Runs one scheduler callback with a driver handle bound to the region
    /// the caller already holds.
    pub fn invoke<F, R>(&mut self, shared: &Shared, callback: F) -> R
        where F: FnOnce(&mut dyn Scheduler, &dyn SchedulerDriver) -> R
    {
        let Guarded { ref mut session, ref mut scheduler } = *self;
        let driver = CallbackDriver {
            session: RefCell::new(session),
            transport: &*shared.transport,
            cond: &shared.cond,
        };
        let _scope = CallbackScope::enter(shared.id);
        callback(&mut **scheduler, &driver)
    }
}

/// Point-in-time view of a driver for diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverSnapshot {
    pub state: DriverState,
    pub framework_id: String,
    pub master: Option<String>,
    pub address: Option<String>,
    pub registered: bool,
    pub outstanding_offers: Vec<String>,
    pub started_at: Option<i64>,
    pub messages_sent: u64,
    pub events_delivered: u64,
}

/// Scheduler driver talking to a master through injected collaborators.
///
/// Every method that touches the session runs inside one exclusive region,
/// the same one callbacks are delivered under, so commands are applied in
/// the order their calls acquired it and never overlap a callback. Share
/// the driver between threads behind an `Arc`.
pub struct MesosSchedulerDriver {
    shared: Arc<Shared>,
}

impl MesosSchedulerDriver {
    /// Builds the collaborators from the `master` parameter.
    pub fn new(scheduler: Box<dyn Scheduler>,
               params: Params,
               framework_id: Option<FrameworkID>)
               -> Result<MesosSchedulerDriver, DriverError> {
        let (transport, detector) = collaborator::connect(&params)?;
        MesosSchedulerDriver::with_collaborators(scheduler, params, framework_id, transport, detector)
    }

    pub fn with_url(scheduler: Box<dyn Scheduler>,
                    url: &str,
                    framework_id: Option<FrameworkID>)
                    -> Result<MesosSchedulerDriver, DriverError> {
        MesosSchedulerDriver::new(scheduler, Params::from_url(url)?, framework_id)
    }

    pub fn with_map(scheduler: Box<dyn Scheduler>,
                    map: &HashMap<String, String>,
                    framework_id: Option<FrameworkID>)
                    -> Result<MesosSchedulerDriver, DriverError> {
        MesosSchedulerDriver::new(scheduler, Params::from_map(map)?, framework_id)
    }

    /// `args[0]` is the program name.
    pub fn with_args<I, T>(scheduler: Box<dyn Scheduler>,
                           args: I,
                           framework_id: Option<FrameworkID>)
                           -> Result<MesosSchedulerDriver, DriverError>
        where I: IntoIterator<Item = T>,
              T: Into<String>
    {
        MesosSchedulerDriver::new(scheduler, Params::from_args(args)?, framework_id)
    }

    /// Pairs an injected transport with the detector the `master`
    /// parameter names.
    pub fn with_transport(scheduler: Box<dyn Scheduler>,
                          params: Params,
                          framework_id: Option<FrameworkID>,
                          transport: Arc<dyn Transport>)
                          -> Result<MesosSchedulerDriver, DriverError> {
        let detector = collaborator::detector_for(&params)?;
        MesosSchedulerDriver::with_collaborators(scheduler, params, framework_id, transport, detector)
    }

    /// `framework_id` reconnects a redundant scheduler to an existing
    /// session instead of registering a new framework.
    pub fn with_collaborators(scheduler: Box<dyn Scheduler>,
                              params: Params,
                              framework_id: Option<FrameworkID>,
                              transport: Arc<dyn Transport>,
                              detector: Arc<dyn MasterDetector>)
                              -> Result<MesosSchedulerDriver, DriverError> {
        let master_detect_timeout = params.get_secs("master_detect_timeout", DEFAULT_MASTER_DETECT_TIMEOUT_SECS)?;

        Ok(MesosSchedulerDriver {
            shared: Arc::new(Shared {
                id: reentrancy::next_driver_id(),
                guarded: Mutex::new(Guarded {
                    session: Session::new(params, framework_id),
                    scheduler: scheduler,
                }),
                cond: Condvar::new(),
                transport: transport,
                detector: detector,
                master_detect_timeout: master_detect_timeout,
            }),
        })
    }

    pub fn state(&self) -> Result<DriverState, DriverError> {
        Ok(self.lock()?.session.state)
    }

    pub fn framework_id(&self) -> Result<FrameworkID, DriverError> {
        Ok(self.lock()?.session.framework_id.clone())
    }

    /// Never waits on the exclusive region; `None` while it is held.
    pub fn snapshot(&self) -> Option<DriverSnapshot> {
        let guarded = match self.shared.guarded.try_lock() {
            Ok(guarded) => guarded,
            Err(_) => return None,
        };
        let session = &guarded.session;

        Some(DriverSnapshot {
            state: session.state,
            framework_id: session.framework_id.to_string(),
            master: session.master.clone(),
            address: session.address.clone(),
            registered: session.registered,
            outstanding_offers: session.offers.offer_ids().iter().map(|offer_id| offer_id.to_string()).collect(),
            started_at: session.started_at.map(|started_at| started_at.timestamp()),
            messages_sent: session.messages_sent,
            events_delivered: session.events_delivered,
        })
    }

    fn lock(&self) -> Result<MutexGuard<Guarded>, DriverError> {
        if reentrancy::in_callback(self.shared.id) {
            return Err(DriverError::Reentrant);
        }
        Ok(self.shared.guarded.lock()?)
    }

    /// Sets up the event path and waits, bounded, for a master. Leaves the
    /// driver in `NotStarted` on failure.
    fn connect<'a>(&'a self, mut guarded: MutexGuard<'a, Guarded>) -> Result<MutexGuard<'a, Guarded>, DriverError> {
        let (events, receiver) = channel();
        let address = self.shared.transport.listen(Inbox::new(events.clone()))?;
        dispatch::spawn(self.shared.clone(), receiver)?;

        guarded.session.address = Some(address);
        guarded.session.connecting = true;
        guarded.session.attach_dispatcher(events.clone());

        if let Err(err) = self.shared.detector.subscribe(MasterListener::new(events)) {
            abandon_connect(&mut guarded.session);
            return Err(err);
        }

        let timeout = self.shared.master_detect_timeout;
        let deadline = Instant::now() + timeout;
        while guarded.session.master.is_none() {
            let now = Instant::now();
            if now >= deadline {
                warn!("no master detected within {:?}", timeout);
                abandon_connect(&mut guarded.session);
                return Err(DriverError::MasterDetectTimeout(timeout));
            }
            guarded = self.shared.cond.wait_timeout(guarded, deadline - now)?.0;
        }

        guarded.session.connecting = false;
        Ok(guarded)
    }
}

fn abandon_connect(session: &mut Session) {
    session.connecting = false;
    session.master = None;
    session.shutdown_dispatcher();
}

impl SchedulerDriver for MesosSchedulerDriver {
    fn start(&self) -> Result<DriverState, DriverError> {
        let guarded = self.lock()?;
        if guarded.session.state != DriverState::NotStarted || guarded.session.connecting {
            return Err(DriverError::AlreadyStarted);
        }

        let mut guarded = self.connect(guarded)?;
        guarded.session.state = DriverState::Running;
        guarded.session.started_at = Some(Utc::now());

        if let Err(err) = dispatch::register(&self.shared, &mut guarded) {
            if guarded.session.state.is_terminal() {
                info!("driver {} stopped while registering", self.shared.id);
                return Ok(guarded.session.state);
            }
            error!("could not send registration: {}", err);
            guarded.session.state = DriverState::NotStarted;
            guarded.session.started_at = None;
            abandon_connect(&mut guarded.session);
            return Err(err);
        }

        info!("driver {} running against master {}",
              self.shared.id,
              guarded.session.master.as_ref().map(|master| master.as_str()).unwrap_or(""));
        Ok(DriverState::Running)
    }

    fn stop(&self) -> Result<DriverState, DriverError> {
        let mut guarded = self.lock()?;
        let state = guarded.session.stop(&*self.shared.transport)?;
        self.shared.cond.notify_all();
        Ok(state)
    }

    fn join(&self) -> Result<DriverState, DriverError> {
        let mut guarded = self.lock()?;
        if guarded.session.state == DriverState::NotStarted {
            return Err(DriverError::NotRunning);
        }
        while !guarded.session.state.is_terminal() {
            guarded = self.shared.cond.wait(guarded)?;
        }
        Ok(guarded.session.state)
    }

    fn run(&self) -> Result<DriverState, DriverError> {
        self.start()?;
        self.join()
    }

    fn send_framework_message(&self, message: FrameworkMessage) -> Result<(), DriverError> {
        self.lock()?.session.send_framework_message(&*self.shared.transport, message)
    }

    fn kill_task(&self, task_id: TaskID) -> Result<(), DriverError> {
        self.lock()?.session.kill_task(&*self.shared.transport, task_id)
    }

    fn reply_to_offer(&self,
                      offer_id: OfferID,
                      tasks: Vec<TaskDescription>,
                      params: HashMap<String, String>)
                      -> Result<(), DriverError> {
        self.lock()?.session.reply_to_offer(&*self.shared.transport, offer_id, tasks, params)
    }

    fn revive_offers(&self) -> Result<(), DriverError> {
        self.lock()?.session.revive_offers(&*self.shared.transport)
    }

    fn send_hints(&self, hints: HashMap<String, String>) -> Result<(), DriverError> {
        self.lock()?.session.send_hints(&*self.shared.transport, hints)
    }
}

impl Drop for MesosSchedulerDriver {
    fn drop(&mut self) {
        if reentrancy::in_callback(self.shared.id) {
            return;
        }
        if let Ok(mut guarded) = self.shared.guarded.lock() {
            if guarded.session.state == DriverState::Running {
                let _ = guarded.session.stop(&*self.shared.transport);
                self.shared.cond.notify_all();
            } else {
                guarded.session.shutdown_dispatcher();
            }
        }
    }
}

/// Driver handle passed to callbacks. The exclusive region is already held
/// by the dispatching thread, so commands operate on the session directly.
struct CallbackDriver<'a> {
    session: RefCell<&'a mut Session>,
    transport: &'a dyn Transport,
    cond: &'a Condvar,
}

impl<'a> SchedulerDriver for CallbackDriver<'a> {
    fn start(&self) -> Result<DriverState, DriverError> {
        Err(DriverError::Reentrant)
    }

    fn stop(&self) -> Result<DriverState, DriverError> {
        let state = self.session.borrow_mut().stop(self.transport)?;
        self.cond.notify_all();
        Ok(state)
    }

    fn join(&self) -> Result<DriverState, DriverError> {
        Err(DriverError::Reentrant)
    }

    fn run(&self) -> Result<DriverState, DriverError> {
        Err(DriverError::Reentrant)
    }

    fn send_framework_message(&self, message: FrameworkMessage) -> Result<(), DriverError> {
        self.session.borrow_mut().send_framework_message(self.transport, message)
    }

    fn kill_task(&self, task_id: TaskID) -> Result<(), DriverError> {
        self.session.borrow_mut().kill_task(self.transport, task_id)
    }

    fn reply_to_offer(&self,
                      offer_id: OfferID,
                      tasks: Vec<TaskDescription>,
                      params: HashMap<String, String>)
                      -> Result<(), DriverError> {
        self.session.borrow_mut().reply_to_offer(self.transport, offer_id, tasks, params)
    }

    fn revive_offers(&self) -> Result<(), DriverError> {
        self.session.borrow_mut().revive_offers(self.transport)
    }

    fn send_hints(&self, hints: HashMap<String, String>) -> Result<(), DriverError> {
        self.session.borrow_mut().send_hints(self.transport, hints)
    }
}

/// Identity a registration announces: the scheduler's answers, falling back
/// to configuration.
pub fn framework_info(guarded: &mut Guarded, shared: &Shared) -> FrameworkInfo {
    let (name, executor) = guarded.invoke(shared, |scheduler, driver| {
        (scheduler.framework_name(driver), scheduler.executor_info(driver))
    });
    let params = &guarded.session.params;

    FrameworkInfo {
        name: if name.is_empty() {
            params.get("framework_name", "")
        } else {
            name
        },
        user: match params.get("user", "") {
            ref user if user.is_empty() => env::var("USER").unwrap_or_default(),
            user => user,
        },
        executor: executor,
    }
}
