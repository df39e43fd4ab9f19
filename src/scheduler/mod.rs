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

mod run_scheduler;
mod scheduler_impl;

pub use self::run_scheduler::run_scheduler;
pub use self::scheduler_impl::TaskRunnerScheduler;

use crate::driver::SchedulerDriver;
use crate::proto::{ExecutorInfo, FrameworkID, FrameworkMessage, OfferID, SlaveID, SlaveOffer, TaskStatus};

/// Callback interface implemented by a framework's scheduler.
///
/// Callbacks of one driver run one at a time, in the order the driver
/// received the underlying events, while the driver's exclusive region is
/// held. The `driver` argument is scoped to the callback: its commands and
/// `stop()` apply immediately, while `start()`, `join()` and `run()` fail
/// with `DriverError::Reentrant`.
#[allow(unused_variables)]
pub trait Scheduler: Send {
    /// Name sent with every registration. Empty falls back to the
    /// `framework_name` configuration value.
    fn framework_name(&mut self, driver: &dyn SchedulerDriver) -> String {
        String::new()
    }

    fn executor_info(&mut self, driver: &dyn SchedulerDriver) -> ExecutorInfo {
        ExecutorInfo::default()
    }

    fn registered(&mut self, driver: &dyn SchedulerDriver, framework_id: &FrameworkID) {}

    fn resource_offer(&mut self, driver: &dyn SchedulerDriver, offer_id: &OfferID, offers: &[SlaveOffer]) {}

    fn offer_rescinded(&mut self, driver: &dyn SchedulerDriver, offer_id: &OfferID) {}

    fn status_update(&mut self, driver: &dyn SchedulerDriver, status: &TaskStatus) {}

    fn framework_message(&mut self, driver: &dyn SchedulerDriver, message: &FrameworkMessage) {}

    fn slave_lost(&mut self, driver: &dyn SchedulerDriver, slave_id: &SlaveID) {}

    /// The driver has aborted; invoked at most once per driver.
    fn error(&mut self, driver: &dyn SchedulerDriver, code: i32, message: &str) {
        error!("scheduler driver aborted with error {}: {}", code, message);
    }
}
