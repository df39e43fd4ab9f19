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
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Local;
use uuid::Uuid;

use crate::driver::DriverError;
use crate::proto::{error_code, FrameworkID, FrameworkMessage, Message, OfferID, SlaveID, SlaveOffer, TaskDescription,
                   TaskID, TaskState, TaskStatus};
use crate::utils::Params;

use super::{Inbox, MasterDetector, MasterListener, Transport};

const DEFAULT_TASK_CPUS: f64 = 1.0;
const DEFAULT_TASK_MEM: f64 = 32.0;

/// In-process cluster: one simulated master and a handful of nodes whose
/// executors run every task until it is killed.
///
/// Drivers reach it through `transport()` and `detector()`; tests drive
/// failover through `fail_over`, `lose_master` and `disconnect`.
#[derive(Clone)]
pub struct LocalCluster {
    inner: Arc<Mutex<ClusterState>>,
}

pub struct LocalTransport {
    cluster: LocalCluster,
    address: String,
}

pub struct LocalDetector {
    cluster: LocalCluster,
}

struct LocalSlave {
    slave_id: SlaveID,
    host: String,
    free_cpus: f64,
    free_mem: f64,
    offered: bool,
}

struct FrameworkEntry {
    address: String,
    name: String,
}

struct PendingOffer {
    framework_id: FrameworkID,
    slave_ids: Vec<SlaveID>,
}

struct RunningTask {
    slave_id: SlaveID,
    cpus: f64,
    mem: f64,
}

struct ClusterState {
    started: String,
    master: Option<String>,
    frameworks: HashMap<FrameworkID, FrameworkEntry>,
    inboxes: HashMap<String, Inbox>,
    listeners: Vec<MasterListener>,
    slaves: Vec<LocalSlave>,
    offers: HashMap<OfferID, PendingOffer>,
    tasks: HashMap<(FrameworkID, TaskID), RunningTask>,
    next_framework: u32,
    next_offer: u32,
}

fn short_uuid() -> String {
    let id = Uuid::new_v4().to_simple().to_string();
    id[..8].to_string()
}

impl LocalCluster {
    pub fn new(params: &Params) -> Result<LocalCluster, DriverError> {
        let slave_count = params.get_int("local_slaves", 1)?;
        let cpus = params.get_f64("local_cpus", 1.0)?;
        let mem = params.get_f64("local_mem", 1024.0)?;
        if slave_count < 0 {
            return Err(DriverError::Config(format!("local_slaves must not be negative, got {}", slave_count)));
        }

        let started = Local::now().format("%Y%m%d%H%M%S").to_string();
        let slaves = (0..slave_count)
            .map(|index| {
                LocalSlave {
                    slave_id: SlaveID::new(format!("{}-S{}", started, index)),
                    host: format!("slave-{}.local", index),
                    free_cpus: cpus,
                    free_mem: mem,
                    offered: false,
                }
            })
            .collect();

        let master = format!("master@local-{}", short_uuid());
        info!("local cluster started with master {} and {} slaves", master, slave_count);

        Ok(LocalCluster {
            inner: Arc::new(Mutex::new(ClusterState {
                started: started,
                master: Some(master),
                frameworks: HashMap::new(),
                inboxes: HashMap::new(),
                listeners: vec![],
                slaves: slaves,
                offers: HashMap::new(),
                tasks: HashMap::new(),
                next_framework: 0,
                next_offer: 0,
            })),
        })
    }

    pub fn transport(&self) -> LocalTransport {
        LocalTransport {
            cluster: self.clone(),
            address: format!("scheduler-{}@local", short_uuid()),
        }
    }

    pub fn detector(&self) -> LocalDetector {
        LocalDetector { cluster: self.clone() }
    }

    pub fn master(&self) -> Option<String> {
        self.state().master.clone()
    }

    pub fn framework_ids(&self) -> Vec<FrameworkID> {
        self.state().frameworks.keys().cloned().collect()
    }

    pub fn running_tasks(&self) -> usize {
        self.state().tasks.len()
    }

    /// Replaces the master with a fresh one. Outstanding offers die with the
    /// old master; registered frameworks survive only if `retain_frameworks`.
    pub fn fail_over(&self, retain_frameworks: bool) -> String {
        let mut state = self.state();
        let address = format!("master@local-{}", short_uuid());
        info!("local master failing over to {} (retaining frameworks: {})", address, retain_frameworks);

        state.master = Some(address.clone());
        state.clear_offers();
        if !retain_frameworks {
            let framework_ids: Vec<FrameworkID> = state.frameworks.keys().cloned().collect();
            for framework_id in framework_ids {
                state.remove_framework(&framework_id);
            }
        }
        state.listeners.retain(|listener| listener.new_master(&address));
        address
    }

    pub fn lose_master(&self) {
        let mut state = self.state();
        info!("local master lost");
        state.master = None;
        state.clear_offers();
        state.listeners.retain(|listener| listener.no_master());
    }

    pub fn disconnect(&self, reason: &str) {
        let mut state = self.state();
        state.inboxes.retain(|_, inbox| inbox.link_lost(reason));
    }

    fn state(&self) -> MutexGuard<ClusterState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Transport for LocalTransport {
    fn send(&self, to: &str, message: Message) -> Result<(), DriverError> {
        let mut state = self.cluster.state();
        if state.master.as_ref().map(|master| master.as_str()) != Some(to) {
            warn!("dropping {} to {}: not the current master", message.name(), to);
            return Ok(());
        }
        state.handle(&self.address, message);
        Ok(())
    }

    fn listen(&self, inbox: Inbox) -> Result<String, DriverError> {
        self.cluster.state().inboxes.insert(self.address.clone(), inbox);
        Ok(self.address.clone())
    }
}

impl MasterDetector for LocalDetector {
    fn subscribe(&self, listener: MasterListener) -> Result<(), DriverError> {
        let mut state = self.cluster.state();
        if let Some(master) = state.master.clone() {
            listener.new_master(&master);
        }
        state.listeners.push(listener);
        Ok(())
    }
}

impl ClusterState {
    fn handle(&mut self, from: &str, message: Message) {
        debug!("master received {} from {}", message.name(), from);

        match message {
            Message::RegisterFramework { framework } => {
                let framework_id = FrameworkID::new(format!("{}-{:04}", self.started, self.next_framework));
                self.next_framework += 1;
                info!("registered framework {} ({}) at {}", framework_id, framework.name, from);
                self.frameworks.insert(framework_id.clone(), FrameworkEntry {
                    address: from.to_string(),
                    name: framework.name,
                });
                self.send_to_framework(&framework_id, Message::FrameworkRegistered { framework_id: framework_id.clone() });
                self.offer_resources(&framework_id);
            }
            Message::ReregisterFramework { framework_id, framework, failover } => {
                match self.frameworks.get_mut(&framework_id) {
                    Some(entry) => {
                        info!("re-registered framework {} at {} (failover: {})", framework_id, from, failover);
                        entry.address = from.to_string();
                        entry.name = framework.name;
                    }
                    None => {
                        self.reply(from,
                                   Message::Error {
                                       code: error_code::FRAMEWORK_NOT_FOUND,
                                       message: format!("framework {} is unknown to this master", framework_id),
                                   });
                        return;
                    }
                }
                self.send_to_framework(&framework_id, Message::FrameworkRegistered { framework_id: framework_id.clone() });
                self.offer_resources(&framework_id);
            }
            Message::UnregisterFramework { framework_id } => {
                info!("unregistering framework {}", framework_id);
                self.remove_framework(&framework_id);
            }
            Message::ReplyToOffer { framework_id, offer_id, tasks, .. } => {
                if self.frameworks.contains_key(&framework_id) {
                    self.launch_tasks(&framework_id, &offer_id, tasks);
                }
            }
            Message::KillTask { framework_id, task_id } => {
                if self.frameworks.contains_key(&framework_id) {
                    self.kill_task(&framework_id, task_id);
                }
            }
            Message::FrameworkMessage { framework_id, message } => self.echo(&framework_id, message),
            Message::ReviveOffers { framework_id } => {
                if self.frameworks.contains_key(&framework_id) {
                    self.offer_resources(&framework_id);
                }
            }
            Message::SendHints { framework_id, hints } => {
                debug!("framework {} sent {} hints", framework_id, hints.len());
            }
            other => warn!("master ignoring unexpected {} from {}", other.name(), from),
        }
    }

    fn reply(&self, to: &str, message: Message) {
        if let (Some(master), Some(inbox)) = (self.master.as_ref(), self.inboxes.get(to)) {
            inbox.deliver(master, message);
        }
    }

    fn send_to_framework(&self, framework_id: &FrameworkID, message: Message) {
        match self.frameworks.get(framework_id) {
            Some(entry) => self.reply(&entry.address, message),
            None => debug!("no framework {} to send {} to", framework_id, message.name()),
        }
    }

    fn send_status(&self, framework_id: &FrameworkID, task_id: TaskID, state: TaskState) {
        self.send_to_framework(framework_id,
                               Message::StatusUpdate { status: TaskStatus::new(task_id, state) });
    }

    /// Offers every free node not already in an outstanding offer. A
    /// framework holds at most one outstanding offer at a time.
    fn offer_resources(&mut self, framework_id: &FrameworkID) {
        if self.master.is_none() || self.offers.values().any(|offer| offer.framework_id == *framework_id) {
            return;
        }

        let mut slave_offers = vec![];
        for slave in self.slaves.iter_mut().filter(|slave| !slave.offered && slave.free_cpus > 0.0 && slave.free_mem > 0.0) {
            slave.offered = true;
            let mut params = HashMap::new();
            params.insert("cpus".to_string(), slave.free_cpus.to_string());
            params.insert("mem".to_string(), slave.free_mem.to_string());
            slave_offers.push(SlaveOffer {
                slave_id: slave.slave_id.clone(),
                host: slave.host.clone(),
                params: params,
            });
        }
        if slave_offers.is_empty() {
            return;
        }

        let offer_id = OfferID::new(format!("{}-O{}", self.started, self.next_offer));
        self.next_offer += 1;
        self.offers.insert(offer_id.clone(), PendingOffer {
            framework_id: framework_id.clone(),
            slave_ids: slave_offers.iter().map(|offer| offer.slave_id.clone()).collect(),
        });
        self.send_to_framework(framework_id,
                               Message::ResourceOffer {
                                   offer_id: offer_id,
                                   offers: slave_offers,
                               });
    }

    fn launch_tasks(&mut self, framework_id: &FrameworkID, offer_id: &OfferID, tasks: Vec<TaskDescription>) {
        let owned = self.offers
            .get(offer_id)
            .map(|pending| pending.framework_id == *framework_id)
            .unwrap_or(false);
        let pending = match if owned { self.offers.remove(offer_id) } else { None } {
            Some(pending) => pending,
            None => {
                warn!("framework {} replied to unknown offer {}", framework_id, offer_id);
                for task in tasks {
                    self.send_status(framework_id, task.task_id, TaskState::Lost);
                }
                return;
            }
        };

        for slave in self.slaves.iter_mut().filter(|slave| pending.slave_ids.contains(&slave.slave_id)) {
            slave.offered = false;
        }

        for task in tasks {
            let cpus = task_resource(&task, "cpus", DEFAULT_TASK_CPUS);
            let mem = task_resource(&task, "mem", DEFAULT_TASK_MEM);
            let key = (framework_id.clone(), task.task_id.clone());
            let duplicate = self.tasks.contains_key(&key);

            let launched = match self.slaves.iter_mut().find(|slave| slave.slave_id == task.slave_id) {
                Some(slave) if !duplicate && pending.slave_ids.contains(&slave.slave_id) &&
                                       slave.free_cpus >= cpus &&
                                       slave.free_mem >= mem => {
                    slave.free_cpus -= cpus;
                    slave.free_mem -= mem;
                    true
                }
                _ => false,
            };

            if launched {
                info!("launching task {} of framework {} on {}", task.task_id, framework_id, task.slave_id);
                self.tasks.insert(key,
                                  RunningTask {
                                      slave_id: task.slave_id.clone(),
                                      cpus: cpus,
                                      mem: mem,
                                  });
                self.send_status(framework_id, task.task_id, TaskState::Running);
            } else {
                warn!("task {} of framework {} does not fit on {}", task.task_id, framework_id, task.slave_id);
                self.send_status(framework_id, task.task_id, TaskState::Lost);
            }
        }
    }

    fn kill_task(&mut self, framework_id: &FrameworkID, task_id: TaskID) {
        match self.tasks.remove(&(framework_id.clone(), task_id.clone())) {
            Some(task) => {
                self.release(&task);
                self.send_status(framework_id, task_id, TaskState::Killed);
                self.offer_resources(framework_id);
            }
            None => self.send_status(framework_id, task_id, TaskState::Lost),
        }
    }

    fn echo(&self, framework_id: &FrameworkID, message: FrameworkMessage) {
        if self.tasks.contains_key(&(framework_id.clone(), message.task_id.clone())) {
            self.send_to_framework(framework_id,
                                   Message::FrameworkMessage {
                                       framework_id: framework_id.clone(),
                                       message: message,
                                   });
        } else {
            debug!("dropping framework message for unknown task {}", message.task_id);
        }
    }

    fn remove_framework(&mut self, framework_id: &FrameworkID) {
        if let Some(entry) = self.frameworks.remove(framework_id) {
            debug!("removing framework {} ({})", framework_id, entry.name);
        }

        let offer_ids: Vec<OfferID> = self.offers
            .iter()
            .filter(|&(_, offer)| offer.framework_id == *framework_id)
            .map(|(offer_id, _)| offer_id.clone())
            .collect();
        for offer_id in offer_ids {
            if let Some(offer) = self.offers.remove(&offer_id) {
                for slave in self.slaves.iter_mut().filter(|slave| offer.slave_ids.contains(&slave.slave_id)) {
                    slave.offered = false;
                }
            }
        }

        let task_keys: Vec<(FrameworkID, TaskID)> = self.tasks
            .keys()
            .filter(|&&(ref owner, _)| owner == framework_id)
            .cloned()
            .collect();
        for key in task_keys {
            if let Some(task) = self.tasks.remove(&key) {
                self.release(&task);
            }
        }
    }

    fn release(&mut self, task: &RunningTask) {
        if let Some(slave) = self.slaves.iter_mut().find(|slave| slave.slave_id == task.slave_id) {
            slave.free_cpus += task.cpus;
            slave.free_mem += task.mem;
        }
    }

    fn clear_offers(&mut self) {
        self.offers.clear();
        for slave in self.slaves.iter_mut() {
            slave.offered = false;
        }
    }
}

fn task_resource(task: &TaskDescription, key: &str, default: f64) -> f64 {
    task.params.get(key).and_then(|value| value.parse().ok()).unwrap_or(default)
}
