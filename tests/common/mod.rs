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

#![allow(dead_code)]

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use mesos_sched_driver::collaborator::{Inbox, MasterDetector, MasterListener, Transport};
use mesos_sched_driver::driver::{DriverError, MesosSchedulerDriver, SchedulerDriver};
use mesos_sched_driver::proto::{FrameworkID, FrameworkMessage, Message, OfferID, SlaveID, SlaveOffer, TaskDescription,
                                TaskID, TaskStatus};
use mesos_sched_driver::scheduler::Scheduler;
use mesos_sched_driver::utils::Params;

pub const MASTER: &str = "master@10.0.0.1:5050";
pub const OTHER_MASTER: &str = "master@10.0.0.2:5050";

const WAIT: Duration = Duration::from_secs(5);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Transport that records what the driver sends and lets tests push
/// inbound traffic.
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, Message)>>,
    changed: Condvar,
    inbox: Mutex<Option<Inbox>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<RecordingTransport> {
        Arc::new(RecordingTransport {
            sent: Mutex::new(vec![]),
            changed: Condvar::new(),
            inbox: Mutex::new(None),
        })
    }

    pub fn sent(&self) -> Vec<(String, Message)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_named(&self, name: &str) -> Vec<(String, Message)> {
        self.sent().into_iter().filter(|&(_, ref message)| message.name() == name).collect()
    }

    /// Waits until at least `count` messages called `name` were sent.
    pub fn wait_for(&self, name: &str, count: usize) -> Vec<(String, Message)> {
        let deadline = Instant::now() + WAIT;
        let mut sent = self.sent.lock().unwrap();
        loop {
            let matching: Vec<(String, Message)> =
                sent.iter().filter(|&&(_, ref message)| message.name() == name).cloned().collect();
            if matching.len() >= count {
                return matching;
            }
            let now = Instant::now();
            if now >= deadline {
                panic!("timed out waiting for {} x {}, sent so far: {:?}", count, name, *sent);
            }
            sent = self.changed.wait_timeout(sent, deadline - now).unwrap().0;
        }
    }

    pub fn deliver(&self, from: &str, message: Message) -> bool {
        match *self.inbox.lock().unwrap() {
            Some(ref inbox) => inbox.deliver(from, message),
            None => false,
        }
    }

    pub fn link_lost(&self, reason: &str) -> bool {
        match *self.inbox.lock().unwrap() {
            Some(ref inbox) => inbox.link_lost(reason),
            None => false,
        }
    }
}

impl Transport for RecordingTransport {
    fn send(&self, to: &str, message: Message) -> Result<(), DriverError> {
        self.sent.lock().unwrap().push((to.to_string(), message));
        self.changed.notify_all();
        Ok(())
    }

    fn listen(&self, inbox: Inbox) -> Result<String, DriverError> {
        *self.inbox.lock().unwrap() = Some(inbox);
        Ok("scheduler@10.0.0.9:40000".to_string())
    }
}

/// Detector whose master is appointed by the test.
pub struct ManualDetector {
    state: Mutex<(Option<String>, Vec<MasterListener>)>,
}

impl ManualDetector {
    pub fn new(master: Option<&str>) -> Arc<ManualDetector> {
        Arc::new(ManualDetector { state: Mutex::new((master.map(|master| master.to_string()), vec![])) })
    }

    pub fn appoint(&self, master: &str) {
        let mut state = self.state.lock().unwrap();
        state.0 = Some(master.to_string());
        state.1.retain(|listener| listener.new_master(master));
    }

    pub fn lose(&self) {
        let mut state = self.state.lock().unwrap();
        state.0 = None;
        state.1.retain(|listener| listener.no_master());
    }
}

impl MasterDetector for ManualDetector {
    fn subscribe(&self, listener: MasterListener) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        if let Some(ref master) = state.0 {
            listener.new_master(master);
        }
        state.1.push(listener);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Registered(FrameworkID),
    Offer(OfferID, Vec<SlaveOffer>),
    Rescinded(OfferID),
    Status(TaskStatus),
    Message(FrameworkMessage),
    SlaveLost(SlaveID),
    Error(i32, String),
}

pub type OfferHook = Box<dyn FnMut(&dyn SchedulerDriver, &OfferID, &[SlaveOffer]) + Send>;

/// Scheduler forwarding every callback to a channel.
pub struct RecordingScheduler {
    events: Sender<Event>,
    on_offer: Option<OfferHook>,
}

impl RecordingScheduler {
    pub fn new() -> (RecordingScheduler, Events) {
        let (events, receiver) = channel();
        (RecordingScheduler {
            events: events,
            on_offer: None,
        },
         Events(receiver))
    }

    pub fn with_offer_hook(hook: OfferHook) -> (RecordingScheduler, Events) {
        let (mut scheduler, events) = RecordingScheduler::new();
        scheduler.on_offer = Some(hook);
        (scheduler, events)
    }
}

impl Scheduler for RecordingScheduler {
    fn framework_name(&mut self, _driver: &dyn SchedulerDriver) -> String {
        "recording".to_string()
    }

    fn registered(&mut self, _driver: &dyn SchedulerDriver, framework_id: &FrameworkID) {
        let _ = self.events.send(Event::Registered(framework_id.clone()));
    }

    fn resource_offer(&mut self, driver: &dyn SchedulerDriver, offer_id: &OfferID, offers: &[SlaveOffer]) {
        if let Some(ref mut hook) = self.on_offer {
            hook(driver, offer_id, offers);
        }
        let _ = self.events.send(Event::Offer(offer_id.clone(), offers.to_vec()));
    }

    fn offer_rescinded(&mut self, _driver: &dyn SchedulerDriver, offer_id: &OfferID) {
        let _ = self.events.send(Event::Rescinded(offer_id.clone()));
    }

    fn status_update(&mut self, _driver: &dyn SchedulerDriver, status: &TaskStatus) {
        let _ = self.events.send(Event::Status(status.clone()));
    }

    fn framework_message(&mut self, _driver: &dyn SchedulerDriver, message: &FrameworkMessage) {
        let _ = self.events.send(Event::Message(message.clone()));
    }

    fn slave_lost(&mut self, _driver: &dyn SchedulerDriver, slave_id: &SlaveID) {
        let _ = self.events.send(Event::SlaveLost(slave_id.clone()));
    }

    fn error(&mut self, _driver: &dyn SchedulerDriver, code: i32, message: &str) {
        let _ = self.events.send(Event::Error(code, message.to_string()));
    }
}

pub struct Events(Receiver<Event>);

impl Events {
    pub fn next(&self) -> Event {
        match self.0.recv_timeout(WAIT) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => panic!("no callback within {:?}", WAIT),
            Err(RecvTimeoutError::Disconnected) => panic!("scheduler dropped"),
        }
    }

    /// Asserts nothing else is delivered for a short while.
    pub fn assert_quiet(&self) {
        match self.0.recv_timeout(Duration::from_millis(200)) {
            Ok(event) => panic!("unexpected callback {:?}", event),
            Err(_) => {}
        }
    }
}

pub fn params() -> Params {
    let mut params = Params::from_url(MASTER).unwrap();
    params.set("master_detect_timeout", "1");
    params.set("user", "tester");
    params
}

pub struct Harness {
    pub driver: Arc<MesosSchedulerDriver>,
    pub transport: Arc<RecordingTransport>,
    pub detector: Arc<ManualDetector>,
}

pub fn harness(scheduler: RecordingScheduler, framework_id: Option<FrameworkID>) -> Harness {
    harness_with(Box::new(scheduler), framework_id)
}

pub fn harness_with(scheduler: Box<dyn Scheduler>, framework_id: Option<FrameworkID>) -> Harness {
    init_logging();
    let transport = RecordingTransport::new();
    let detector = ManualDetector::new(Some(MASTER));
    let driver = MesosSchedulerDriver::with_collaborators(scheduler,
                                                          params(),
                                                          framework_id,
                                                          transport.clone(),
                                                          detector.clone())
        .unwrap();
    Harness {
        driver: Arc::new(driver),
        transport: transport,
        detector: detector,
    }
}

pub fn slave_offer(slave: &str) -> SlaveOffer {
    let mut params = std::collections::HashMap::new();
    params.insert("cpus".to_string(), "1".to_string());
    params.insert("mem".to_string(), "512".to_string());
    SlaveOffer {
        slave_id: SlaveID::new(slave),
        host: format!("{}.example.com", slave),
        params: params,
    }
}

pub fn task(task: &str, slave: &str) -> TaskDescription {
    TaskDescription {
        task_id: TaskID::new(task),
        slave_id: SlaveID::new(slave),
        name: task.to_string(),
        ..TaskDescription::default()
    }
}

/// Starts the driver and completes registration as framework `F1`.
pub fn start_registered(harness: &Harness, events: &Events) {
    harness.driver.start().unwrap();
    harness.transport.wait_for("RegisterFramework", 1);
    harness.transport.deliver(MASTER, Message::FrameworkRegistered { framework_id: FrameworkID::new("F1") });
    assert_eq!(events.next(), Event::Registered(FrameworkID::new("F1")));
}

pub fn offer(harness: &Harness, events: &Events, offer_id: &str) {
    harness.transport.deliver(MASTER,
                              Message::ResourceOffer {
                                  offer_id: OfferID::new(offer_id),
                                  offers: vec![slave_offer("S1")],
                              });
    match events.next() {
        Event::Offer(id, _) => assert_eq!(id, OfferID::new(offer_id)),
        other => panic!("expected offer, got {:?}", other),
    }
}
