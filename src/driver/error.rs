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

use std::sync::PoisonError;
use std::time::Duration;

use thiserror::Error;

use crate::proto::{OfferID, TaskID};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DriverError {
    #[error("operation not implemented by this driver")]
    NotImplemented,
    #[error("driver has already been started")]
    AlreadyStarted,
    #[error("driver is not running")]
    NotRunning,
    #[error("framework is not registered with a master")]
    NotRegistered,
    #[error("offer {0} is not outstanding")]
    UnknownOffer(OfferID),
    #[error("invalid task {task_id}: {reason}")]
    InvalidTask { task_id: TaskID, reason: String },
    #[error("no master detected within {0:?}")]
    MasterDetectTimeout(Duration),
    #[error("blocking driver call from within one of its own callbacks")]
    Reentrant,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("driver state lock poisoned by a panicking callback")]
    Poisoned,
    #[error("cannot spawn event dispatcher: {0}")]
    Spawn(String),
}

impl DriverError {
    /// Integer status for callers that speak status codes; always negative.
    pub fn code(&self) -> i32 {
        match *self {
            DriverError::NotImplemented => -1,
            DriverError::AlreadyStarted => -2,
            DriverError::NotRunning => -3,
            DriverError::NotRegistered => -4,
            DriverError::UnknownOffer(_) => -5,
            DriverError::InvalidTask { .. } => -6,
            DriverError::MasterDetectTimeout(_) => -7,
            DriverError::Reentrant => -8,
            DriverError::Transport(_) => -9,
            DriverError::Config(_) => -10,
            DriverError::Poisoned => -11,
            DriverError::Spawn(_) => -12,
        }
    }
}

impl<T> From<PoisonError<T>> for DriverError {
    fn from(_: PoisonError<T>) -> Self {
        DriverError::Poisoned
    }
}
