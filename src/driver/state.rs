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

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DriverState {
    NotStarted,
    Running,
    Stopped,
    Aborted,
}

impl DriverState {
    pub fn is_terminal(&self) -> bool {
        match *self {
            DriverState::Stopped | DriverState::Aborted => true,
            DriverState::NotStarted | DriverState::Running => false,
        }
    }

    /// Integer status for callers that speak status codes; never negative.
    pub fn code(&self) -> i32 {
        match *self {
            DriverState::NotStarted => 0,
            DriverState::Running => 1,
            DriverState::Stopped => 2,
            DriverState::Aborted => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            DriverState::NotStarted => "not_started",
            DriverState::Running => "running",
            DriverState::Stopped => "stopped",
            DriverState::Aborted => "aborted",
        }
    }
}
