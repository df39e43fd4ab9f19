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

use super::ids::{SlaveID, TaskID};

/// Resources of a single node inside an offer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlaveOffer {
    pub slave_id: SlaveID,
    pub host: String,
    pub params: HashMap<String, String>,
}

impl SlaveOffer {
    pub fn param_f64(&self, key: &str) -> Option<f64> {
        self.params.get(key).and_then(|value| value.parse().ok())
    }
}

/// A task the framework wants launched on a node of an offer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskDescription {
    pub task_id: TaskID,
    pub slave_id: SlaveID,
    pub name: String,
    pub params: HashMap<String, String>,
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskState {
    Starting,
    Running,
    Finished,
    Failed,
    Killed,
    Lost,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        match *self {
            TaskState::Starting | TaskState::Running => false,
            TaskState::Finished | TaskState::Failed | TaskState::Killed | TaskState::Lost => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TaskStatus {
    pub task_id: TaskID,
    pub state: TaskState,
    pub data: Vec<u8>,
}

impl TaskStatus {
    pub fn new(task_id: TaskID, state: TaskState) -> TaskStatus {
        TaskStatus {
            task_id: task_id,
            state: state,
            data: vec![],
        }
    }
}

/// Opaque payload routed between a framework and one of its executors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameworkMessage {
    pub slave_id: SlaveID,
    pub task_id: TaskID,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutorInfo {
    pub uri: String,
    pub data: Vec<u8>,
}

/// What the master is told about a framework when it registers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameworkInfo {
    pub name: String,
    pub user: String,
    pub executor: ExecutorInfo,
}
