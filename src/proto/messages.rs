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

use super::ids::{FrameworkID, OfferID, SlaveID, TaskID};
use super::types::{FrameworkInfo, FrameworkMessage, SlaveOffer, TaskDescription, TaskStatus};

/// Codes carried by `Message::Error`.
pub mod error_code {
    /// Re-registration named an identity the master does not know.
    pub const FRAMEWORK_NOT_FOUND: i32 = 1;
    /// The master refused a registration for policy reasons.
    pub const REGISTRATION_REFUSED: i32 = 2;
    /// The link to the master was lost beyond the transport's retry policy.
    pub const MASTER_UNREACHABLE: i32 = 3;
    /// The master answered in a way the driver cannot reconcile.
    pub const PROTOCOL_VIOLATION: i32 = 4;
}

/// Every message a framework and a master exchange.
///
/// Variants prefixed by the framework's identity travel from the framework
/// to the master; the others travel the opposite way. `FrameworkMessage`
/// is used in both directions.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    RegisterFramework {
        framework: FrameworkInfo,
    },
    ReregisterFramework {
        framework_id: FrameworkID,
        framework: FrameworkInfo,
        failover: bool,
    },
    UnregisterFramework {
        framework_id: FrameworkID,
    },
    ReplyToOffer {
        framework_id: FrameworkID,
        offer_id: OfferID,
        tasks: Vec<TaskDescription>,
        params: HashMap<String, String>,
    },
    KillTask {
        framework_id: FrameworkID,
        task_id: TaskID,
    },
    FrameworkMessage {
        framework_id: FrameworkID,
        message: FrameworkMessage,
    },
    ReviveOffers {
        framework_id: FrameworkID,
    },
    SendHints {
        framework_id: FrameworkID,
        hints: HashMap<String, String>,
    },

    FrameworkRegistered {
        framework_id: FrameworkID,
    },
    ResourceOffer {
        offer_id: OfferID,
        offers: Vec<SlaveOffer>,
    },
    RescindOffer {
        offer_id: OfferID,
    },
    StatusUpdate {
        status: TaskStatus,
    },
    LostSlave {
        slave_id: SlaveID,
    },
    Error {
        code: i32,
        message: String,
    },
}

impl Message {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match *self {
            Message::RegisterFramework { .. } => "RegisterFramework",
            Message::ReregisterFramework { .. } => "ReregisterFramework",
            Message::UnregisterFramework { .. } => "UnregisterFramework",
            Message::ReplyToOffer { .. } => "ReplyToOffer",
            Message::KillTask { .. } => "KillTask",
            Message::FrameworkMessage { .. } => "FrameworkMessage",
            Message::ReviveOffers { .. } => "ReviveOffers",
            Message::SendHints { .. } => "SendHints",
            Message::FrameworkRegistered { .. } => "FrameworkRegistered",
            Message::ResourceOffer { .. } => "ResourceOffer",
            Message::RescindOffer { .. } => "RescindOffer",
            Message::StatusUpdate { .. } => "StatusUpdate",
            Message::LostSlave { .. } => "LostSlave",
            Message::Error { .. } => "Error",
        }
    }
}
