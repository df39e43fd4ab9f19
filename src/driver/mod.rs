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

//! The scheduler driver: lifecycle, command dispatch and event delivery
//! for one framework session with a master.

mod dispatch;
mod error;
mod mesos_driver;
mod offer_list;
mod reentrancy;
mod session;
mod state;

pub use self::error::DriverError;
pub use self::mesos_driver::{DriverSnapshot, MesosSchedulerDriver};
pub use self::state::DriverState;

use std::collections::HashMap;

use crate::proto::{FrameworkMessage, OfferID, TaskDescription, TaskID};

/// Lifecycle and command surface a `Scheduler` is handed.
///
/// Commands are fire-and-forget: they return once the message is handed to
/// the transport, never after the master acknowledges it. Every method
/// defaults to `NotImplemented` so partial drivers stay usable.
pub trait SchedulerDriver {
    fn start(&self) -> Result<DriverState, DriverError> {
        Err(DriverError::NotImplemented)
    }

    fn stop(&self) -> Result<DriverState, DriverError> {
        Err(DriverError::NotImplemented)
    }

    /// Blocks until the driver is stopped or aborted.
    fn join(&self) -> Result<DriverState, DriverError> {
        Err(DriverError::NotImplemented)
    }

    /// `start` followed by `join`.
    fn run(&self) -> Result<DriverState, DriverError> {
        Err(DriverError::NotImplemented)
    }

    fn send_framework_message(&self, _message: FrameworkMessage) -> Result<(), DriverError> {
        Err(DriverError::NotImplemented)
    }

    fn kill_task(&self, _task_id: TaskID) -> Result<(), DriverError> {
        Err(DriverError::NotImplemented)
    }

    fn reply_to_offer(&self,
                      _offer_id: OfferID,
                      _tasks: Vec<TaskDescription>,
                      _params: HashMap<String, String>)
                      -> Result<(), DriverError> {
        Err(DriverError::NotImplemented)
    }

    fn revive_offers(&self) -> Result<(), DriverError> {
        Err(DriverError::NotImplemented)
    }

    fn send_hints(&self, _hints: HashMap<String, String>) -> Result<(), DriverError> {
        Err(DriverError::NotImplemented)
    }
}
