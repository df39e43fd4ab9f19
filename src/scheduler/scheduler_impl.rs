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

use crate::driver::SchedulerDriver;
use crate::proto::{FrameworkID, FrameworkMessage, OfferID, SlaveID, SlaveOffer, TaskDescription, TaskID, TaskState,
                   TaskStatus};

const PING: &[u8] = b"ping";

/// Runs a fixed number of tasks to completion: each launched task is pinged
/// through a framework message and killed once its executor answers. The
/// driver is stopped when every task has ended.
pub struct TaskRunnerScheduler {
    total: usize,
    cpus: f64,
    mem: f64,
    launched: usize,
    next_task: usize,
    finished: usize,
    running: HashMap<TaskID, SlaveID>,
}

impl TaskRunnerScheduler {
    pub fn new(total: usize, cpus: f64, mem: f64) -> TaskRunnerScheduler {
        TaskRunnerScheduler {
            total: total,
            cpus: cpus,
            mem: mem,
            launched: 0,
            next_task: 0,
            finished: 0,
            running: HashMap::new(),
        }
    }

    pub fn finished(&self) -> usize {
        self.finished
    }

    fn stop_when_done(&self, driver: &dyn SchedulerDriver) {
        if self.finished < self.total {
            return;
        }
        info!("all {} tasks done, stopping", self.total);
        if let Err(err) = driver.stop() {
            warn!("could not stop driver: {}", err);
        }
    }
}

impl super::Scheduler for TaskRunnerScheduler {
    fn framework_name(&mut self, _driver: &dyn SchedulerDriver) -> String {
        "task-runner".to_string()
    }

    fn registered(&mut self, driver: &dyn SchedulerDriver, framework_id: &FrameworkID) {
        info!("registered with framework id {}", framework_id);
        self.stop_when_done(driver);
    }

    fn resource_offer(&mut self, driver: &dyn SchedulerDriver, offer_id: &OfferID, offers: &[SlaveOffer]) {
        let mut tasks: Vec<TaskDescription> = vec![];

        for offer in offers {
            let mut offer_cpus = offer.param_f64("cpus").unwrap_or(0.0);
            let mut offer_mem = offer.param_f64("mem").unwrap_or(0.0);
            debug!("received offer from host: {}, cpus: {}, mem: {}", offer.host, offer_cpus, offer_mem);

            while self.launched < self.total && offer_cpus >= self.cpus && offer_mem >= self.mem {
                let name = format!("task-{}", self.next_task);
                self.next_task += 1;
                self.launched += 1;
                offer_cpus -= self.cpus;
                offer_mem -= self.mem;

                let mut params = HashMap::new();
                params.insert("cpus".to_string(), self.cpus.to_string());
                params.insert("mem".to_string(), self.mem.to_string());

                info!("starting {} on {}", name, offer.host);
                let task_id = TaskID::new(name.clone());
                self.running.insert(task_id.clone(), offer.slave_id.clone());
                tasks.push(TaskDescription {
                    task_id: task_id,
                    slave_id: offer.slave_id.clone(),
                    name: name,
                    params: params,
                    data: vec![],
                });
            }
        }

        // An empty reply hands the offer back.
        if let Err(err) = driver.reply_to_offer(offer_id.clone(), tasks, HashMap::new()) {
            warn!("could not reply to offer {}: {}", offer_id, err);
        }
    }

    fn offer_rescinded(&mut self, _driver: &dyn SchedulerDriver, offer_id: &OfferID) {
        debug!("offer {} rescinded", offer_id);
    }

    fn status_update(&mut self, driver: &dyn SchedulerDriver, status: &TaskStatus) {
        info!("received update {:?} from {}", status.state, status.task_id);

        match status.state {
            TaskState::Running => {
                let slave_id = match self.running.get(&status.task_id) {
                    Some(slave_id) => slave_id.clone(),
                    None => SlaveID::default(),
                };
                let message = FrameworkMessage {
                    slave_id: slave_id,
                    task_id: status.task_id.clone(),
                    data: PING.to_vec(),
                };
                if let Err(err) = driver.send_framework_message(message) {
                    warn!("could not ping {}: {}", status.task_id, err);
                }
            }
            TaskState::Finished | TaskState::Killed => {
                self.running.remove(&status.task_id);
                self.finished += 1;
                self.stop_when_done(driver);
            }
            TaskState::Failed | TaskState::Lost => {
                self.running.remove(&status.task_id);
                self.launched = self.launched.saturating_sub(1);
                if let Err(err) = driver.revive_offers() {
                    warn!("could not revive offers: {}", err);
                }
            }
            TaskState::Starting => {}
        }
    }

    fn framework_message(&mut self, driver: &dyn SchedulerDriver, message: &FrameworkMessage) {
        if message.data.as_slice() != PING {
            debug!("ignoring message from {}", message.task_id);
            return;
        }
        if let Err(err) = driver.kill_task(message.task_id.clone()) {
            warn!("could not kill {}: {}", message.task_id, err);
        }
    }

    fn slave_lost(&mut self, _driver: &dyn SchedulerDriver, slave_id: &SlaveID) {
        warn!("lost node {}", slave_id);
    }

    fn error(&mut self, _driver: &dyn SchedulerDriver, code: i32, message: &str) {
        error!("driver aborted ({}): {}", code, message);
    }
}
