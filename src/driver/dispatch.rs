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

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread;

use crate::collaborator::DriverEvent;
use crate::proto::{error_code, FrameworkID, Message, OfferID};
use crate::scheduler::Scheduler;

use super::error::DriverError;
use super::mesos_driver::{framework_info, Guarded, Shared};
use super::state::DriverState;
use super::SchedulerDriver;

/// Starts the thread that turns queued events into callbacks, one at a time
/// and in arrival order.
pub(crate) fn spawn(shared: Arc<Shared>, events: Receiver<DriverEvent>) -> Result<(), DriverError> {
    let name = format!("sched-driver-{}", shared.id);
    thread::Builder::new()
        .name(name)
        .spawn(move || run_dispatcher(&shared, events))
        .map(|_| ())
        .map_err(|err| DriverError::Spawn(err.to_string()))
}

/// Wakes every waiter when the dispatcher ends, including by a panicking
/// callback, so `join()` observes the poisoned region instead of sleeping on.
struct ExitSignal<'a>(&'a Shared);

impl<'a> Drop for ExitSignal<'a> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!("callback of driver {} panicked, dispatcher exiting", self.0.id);
        }
        self.0.cond.notify_all();
    }
}

fn run_dispatcher(shared: &Shared, events: Receiver<DriverEvent>) {
    debug!("dispatcher for driver {} started", shared.id);
    let _exit = ExitSignal(shared);

    loop {
        let event = match events.recv() {
            Ok(DriverEvent::Shutdown) | Err(_) => break,
            Ok(event) => event,
        };

        let mut guarded = match shared.guarded.lock() {
            Ok(guarded) => guarded,
            Err(_) => {
                error!("driver {} lock poisoned, dispatcher exiting", shared.id);
                break;
            }
        };
        handle_event(shared, &mut guarded, event);
    }

    debug!("dispatcher for driver {} exited", shared.id);
}

/// Sends the registration for the current identity to the current master.
/// Fails with `NotRunning`, sending nothing, when the framework callbacks
/// stopped the driver.
pub fn register(shared: &Shared, guarded: &mut Guarded) -> Result<(), DriverError> {
    let framework = framework_info(guarded, shared);
    if guarded.session.state != DriverState::Running {
        return Err(DriverError::NotRunning);
    }
    let message = guarded.session.registration_message(framework);
    guarded.session.send(&*shared.transport, message)
}

fn handle_event(shared: &Shared, guarded: &mut Guarded, event: DriverEvent) {
    match event {
        DriverEvent::NewMaster(address) => new_master(shared, guarded, address),
        DriverEvent::NoMaster => no_master(shared, guarded),
        DriverEvent::LinkLost(reason) => {
            warn!("link to master lost: {}", reason);
            abort(shared, guarded, error_code::MASTER_UNREACHABLE, &reason);
        }
        DriverEvent::Message { from, message } => deliver(shared, guarded, &from, message),
        DriverEvent::Shutdown => {}
    }
}

fn new_master(shared: &Shared, guarded: &mut Guarded, address: String) {
    let session = &mut guarded.session;
    match session.state {
        DriverState::NotStarted if session.connecting => {
            info!("detected master {}", address);
            session.master = Some(address);
            shared.cond.notify_all();
        }
        DriverState::Running => {
            if session.master.as_ref() == Some(&address) {
                return;
            }
            info!("new master detected at {}, re-registering framework {}",
                  address,
                  session.framework_id);
            session.master = Some(address);
            session.registered = false;
            invalidate_offers(shared, guarded);

            if guarded.session.state != DriverState::Running {
                return;
            }
            if let Err(err) = register(shared, guarded) {
                let message = format!("could not register with new master: {}", err);
                abort(shared, guarded, error_code::MASTER_UNREACHABLE, &message);
            }
        }
        _ => debug!("ignoring master {} in state {}", address, session.state.name()),
    }
}

fn no_master(shared: &Shared, guarded: &mut Guarded) {
    if guarded.session.state != DriverState::Running {
        return;
    }
    warn!("lost track of the master, waiting for a new one");
    guarded.session.master = None;
    guarded.session.registered = false;
    invalidate_offers(shared, guarded);
}

fn deliver(shared: &Shared, guarded: &mut Guarded, from: &str, message: Message) {
    if guarded.session.state != DriverState::Running {
        debug!("dropping {} from {}, driver not running", message.name(), from);
        return;
    }
    if guarded.session.master.as_ref().map(|master| master.as_str()) != Some(from) {
        warn!("dropping {} from {}, not the current master", message.name(), from);
        return;
    }

    match message {
        Message::FrameworkRegistered { framework_id } => registered(shared, guarded, framework_id),
        Message::ResourceOffer { offer_id, offers } => {
            if !guarded.session.registered {
                debug!("dropping offer {} received before registration", offer_id);
                return;
            }
            guarded.session.offers.add_offer(offer_id.clone(), offers.clone());
            notify(shared, guarded, |scheduler, driver| scheduler.resource_offer(driver, &offer_id, &offers));
        }
        Message::RescindOffer { offer_id } => {
            if guarded.session.offers.remove_offer(&offer_id) {
                notify(shared, guarded, |scheduler, driver| scheduler.offer_rescinded(driver, &offer_id));
            } else {
                debug!("offer {} already gone", offer_id);
            }
        }
        Message::StatusUpdate { status } => {
            notify(shared, guarded, |scheduler, driver| scheduler.status_update(driver, &status));
        }
        Message::FrameworkMessage { message, .. } => {
            notify(shared, guarded, |scheduler, driver| scheduler.framework_message(driver, &message));
        }
        Message::LostSlave { slave_id } => {
            notify(shared, guarded, |scheduler, driver| scheduler.slave_lost(driver, &slave_id));
        }
        Message::Error { code, message } => {
            error!("master reported error {}: {}", code, message);
            abort(shared, guarded, code, &message);
        }
        other => warn!("unexpected {} from master", other.name()),
    }
}

fn registered(shared: &Shared, guarded: &mut Guarded, framework_id: FrameworkID) {
    let session = &mut guarded.session;
    if !session.framework_id.is_empty() && session.framework_id != framework_id {
        let message = format!("master registered framework {}, expected {}",
                              framework_id,
                              session.framework_id);
        abort(shared, guarded, error_code::PROTOCOL_VIOLATION, &message);
        return;
    }

    info!("registered as framework {}", framework_id);
    session.framework_id = framework_id.clone();
    session.registered = true;
    session.failover = false;
    notify(shared, guarded, |scheduler, driver| scheduler.registered(driver, &framework_id));
}

/// Drops every outstanding offer and tells the scheduler about each one.
fn invalidate_offers(shared: &Shared, guarded: &mut Guarded) {
    let count = guarded.session.offers.len();
    if count > 0 {
        info!("invalidating {} outstanding offers", count);
    }
    let offer_ids: Vec<OfferID> = guarded.session.offers.invalidate_all();
    for offer_id in offer_ids {
        if guarded.session.state != DriverState::Running {
            break;
        }
        notify(shared, guarded, |scheduler, driver| scheduler.offer_rescinded(driver, &offer_id));
    }
}

/// Moves a running driver to `Aborted`, reports the error once, then wakes
/// joiners.
fn abort(shared: &Shared, guarded: &mut Guarded, code: i32, message: &str) {
    if guarded.session.state != DriverState::Running {
        return;
    }
    guarded.session.abort();
    notify(shared, guarded, |scheduler, driver| scheduler.error(driver, code, message));
    shared.cond.notify_all();
}

fn notify<F>(shared: &Shared, guarded: &mut Guarded, callback: F)
    where F: FnOnce(&mut dyn Scheduler, &dyn SchedulerDriver)
{
    guarded.session.events_delivered += 1;
    guarded.invoke(shared, callback);
}
